//! Response data types.

use crate::search::SearchData;
use crate::types::{Capability, Tag};

/// Decoded `* ESEARCH` response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ESearchResponse {
    /// Tag from the `(TAG "...")` correlator, if the server sent one.
    pub tag: Option<Tag>,
    /// Result fields carried by the response.
    pub data: SearchData,
}

impl ESearchResponse {
    /// Returns the correlator tag, treating an empty tag as absent.
    #[must_use]
    pub fn correlator(&self) -> Option<&Tag> {
        self.tag.as_ref().filter(|t| !t.as_str().is_empty())
    }
}

/// Untagged response data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UntaggedResponse {
    /// OK response (greeting or informational).
    Ok {
        /// Human-readable text, including any response code.
        text: String,
    },
    /// NO response.
    No {
        /// Human-readable text.
        text: String,
    },
    /// BAD response.
    Bad {
        /// Human-readable text.
        text: String,
    },
    /// PREAUTH greeting.
    PreAuth {
        /// Human-readable text.
        text: String,
    },
    /// BYE response.
    Bye {
        /// Human-readable text.
        text: String,
    },
    /// CAPABILITY response.
    Capability(Vec<Capability>),
    /// Legacy SEARCH response: a flat list of numbers.
    Search(Vec<u32>),
    /// Extended ESEARCH response.
    ESearch(ESearchResponse),
    /// Message data such as `* 23 EXISTS`; the rest of the line is ignored.
    Numbered {
        /// Leading number.
        number: u32,
        /// Upper-cased keyword following the number.
        keyword: String,
    },
    /// Any other untagged data, identified by its upper-cased keyword.
    Other(String),
}
