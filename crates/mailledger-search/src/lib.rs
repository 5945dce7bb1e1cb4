//! # mailledger-search
//!
//! Client side of the IMAP `SEARCH` and `UID SEARCH` commands, including
//! the extended result forms of ESEARCH (RFC 4731, part of `IMAP4rev2`).
//!
//! ## Features
//!
//! - **Structured criteria**: a [`SearchCriteria`] tree with nested `NOT` /
//!   `OR`, encoded canonically (one-day ranges collapse to `ON` / `SENTON`)
//! - **Both result forms**: legacy `* SEARCH n n n` lines and
//!   `* ESEARCH (TAG "..") [UID] MIN/MAX/COUNT/ALL`, unknown fields skipped
//! - **Pipelining**: any number of searches in flight on one connection,
//!   results routed by tag
//! - **Sans-I/O core**: [`protocol::Protocol`] can be driven without a socket
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailledger_search::{Client, Config, Flag, ReturnOption, SearchCriteria, SearchOptions};
//!
//! #[tokio::main]
//! async fn main() -> mailledger_search::Result<()> {
//!     // `stream` is an authenticated connection with a mailbox selected.
//!     let client = Client::new(stream, &Config::default());
//!
//!     let unseen = SearchCriteria {
//!         not_flag: vec![Flag::Seen],
//!         ..SearchCriteria::default()
//!     };
//!     let options = SearchOptions::new().with_return(ReturnOption::Count);
//!
//!     let data = client.uid_search(unseen, options).wait().await?;
//!     println!("{} unread", data.count.unwrap_or(0));
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`command`]: Search criteria and command serialization
//! - [`connection`]: Framing and the background-task client
//! - [`parser`]: Sans-I/O response parser
//! - [`protocol`]: Pending-command ledger and response correlation
//! - [`types`]: Core IMAP types (flags, sequence sets, capabilities)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod protocol;
mod search;
pub mod types;

pub use command::{
    HeaderField, ReturnOption, SearchCommand, SearchCriteria, SearchOptions, TagGenerator,
};
pub use connection::{Client, Config, ConfigBuilder, FramedStream};
pub use error::{Error, Result};
pub use parser::{ESearchResponse, Response, ResponseParser, UntaggedResponse};
pub use search::{CommandKind, SearchData, SearchHandle};
pub use types::{Capability, Flag, SeqRange, SequenceSet, Status, Tag};
