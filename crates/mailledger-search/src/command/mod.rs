//! SEARCH command builder.
//!
//! This module provides the criteria tree and its serialization to the
//! IMAP wire format.

mod criteria;
mod serialize;
mod tag_generator;

pub use criteria::{HeaderField, ReturnOption, SearchCriteria, SearchOptions};
pub use tag_generator::TagGenerator;

use crate::search::CommandKind;

use serialize::write_search_key;

/// A SEARCH or UID SEARCH command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCommand {
    /// Search criteria.
    pub criteria: SearchCriteria,
    /// Search options.
    pub options: SearchOptions,
    /// Use UIDs.
    pub uid: bool,
}

impl SearchCommand {
    /// Creates a command.
    #[must_use]
    pub const fn new(criteria: SearchCriteria, options: SearchOptions, uid: bool) -> Self {
        Self {
            criteria,
            options,
            uid,
        }
    }

    /// Returns the command kind.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        CommandKind::from_uid(self.uid)
    }

    /// Serializes the command to bytes, CRLF included.
    #[must_use]
    pub fn serialize(&self, tag: &str) -> Vec<u8> {
        let mut buf = Vec::new();

        buf.extend_from_slice(tag.as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(self.kind().as_str().as_bytes());

        if !self.options.return_options.is_empty() {
            buf.extend_from_slice(b" RETURN (");
            for (i, option) in self.options.return_options.iter().enumerate() {
                if i > 0 {
                    buf.push(b' ');
                }
                buf.extend_from_slice(option.as_str().as_bytes());
            }
            buf.push(b')');
        }

        buf.push(b' ');
        write_search_key(&mut buf, &self.criteria);
        buf.extend_from_slice(b"\r\n");
        buf
    }
}
