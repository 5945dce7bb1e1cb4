//! IMAP protocol parser.
//!
//! A sans-I/O parser for the server responses a search client receives.
//!
//! - **Lexer**: tokenizes raw bytes into IMAP tokens (atoms, strings, numbers, etc.)
//! - **Response Parser**: builds structured responses, including the legacy
//!   `SEARCH` and extended `ESEARCH` forms, from tokens
//!
//! # Example
//!
//! ```
//! use mailledger_search::parser::{Response, ResponseParser, UntaggedResponse};
//!
//! let response = ResponseParser::parse(b"* ESEARCH (TAG \"A1\") UID COUNT 5\r\n").unwrap();
//!
//! match response {
//!     Response::Untagged(UntaggedResponse::ESearch(esearch)) => {
//!         assert_eq!(esearch.data.count, Some(5));
//!         assert!(esearch.data.uid);
//!     }
//!     _ => panic!("Expected ESEARCH"),
//! }
//! ```

pub mod lexer;
pub mod response;

pub use lexer::{Lexer, Token};
pub use response::{ESearchResponse, Response, ResponseParser, UntaggedResponse};
