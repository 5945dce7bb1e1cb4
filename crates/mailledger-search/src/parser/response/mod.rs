//! IMAP response parser.
//!
//! Decodes one complete server response (as delimited by the framing layer)
//! into a [`Response`]. Only the responses that matter to a search client
//! are decoded in full; other untagged data is recognised by keyword and
//! otherwise ignored.

#![allow(clippy::missing_errors_doc)]

mod esearch;
mod helpers;
mod types;

pub use types::{ESearchResponse, UntaggedResponse};

use crate::parser::lexer::{Lexer, Token};
use crate::types::{Status, Tag};
use crate::{Error, Result};

use esearch::parse_esearch_response;
use helpers::{parse_capability_data, parse_search_response, read_text_until_crlf};

/// A parsed IMAP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Tagged response (command completion).
    Tagged {
        /// The command tag.
        tag: Tag,
        /// Response status.
        status: Status,
        /// Human-readable text, including any response code.
        text: String,
    },
    /// Untagged response (server data).
    Untagged(UntaggedResponse),
    /// Continuation request.
    Continuation {
        /// Optional text/data.
        text: Option<String>,
    },
}

/// Response parser.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses a complete response.
    pub fn parse(input: &[u8]) -> Result<Response> {
        let mut lexer = Lexer::new(input);

        match lexer.next_token()? {
            Token::Untagged => Self::parse_untagged(&mut lexer),
            Token::Continuation => Ok(Self::parse_continuation(&mut lexer)),
            Token::Atom(tag) => Self::parse_tagged(&mut lexer, tag),
            token => Err(Error::Parse {
                position: 0,
                message: format!("Expected *, +, or tag, got {token:?}"),
            }),
        }
    }

    fn parse_tagged(lexer: &mut Lexer<'_>, tag: &str) -> Result<Response> {
        lexer.expect_space()?;

        let status = Self::parse_status(lexer)?;
        lexer.space();
        let text = read_text_until_crlf(lexer);

        Ok(Response::Tagged {
            tag: Tag::new(tag),
            status,
            text,
        })
    }

    fn parse_untagged(lexer: &mut Lexer<'_>) -> Result<Response> {
        lexer.expect_space()?;

        let untagged = match lexer.next_token()? {
            Token::Atom(keyword) => {
                let upper = keyword.to_uppercase();
                match upper.as_str() {
                    "OK" | "NO" | "BAD" | "PREAUTH" | "BYE" => {
                        lexer.space();
                        let text = read_text_until_crlf(lexer);
                        match Status::parse(&upper) {
                            Some(Status::Ok) => UntaggedResponse::Ok { text },
                            Some(Status::No) => UntaggedResponse::No { text },
                            Some(Status::Bad) => UntaggedResponse::Bad { text },
                            Some(Status::PreAuth) => UntaggedResponse::PreAuth { text },
                            Some(Status::Bye) | None => UntaggedResponse::Bye { text },
                        }
                    }
                    "CAPABILITY" => UntaggedResponse::Capability(parse_capability_data(lexer)?),
                    "SEARCH" => UntaggedResponse::Search(parse_search_response(lexer)?),
                    "ESEARCH" => UntaggedResponse::ESearch(parse_esearch_response(lexer)?),
                    _ => {
                        read_text_until_crlf(lexer);
                        UntaggedResponse::Other(upper)
                    }
                }
            }
            Token::Number(number) => {
                lexer.expect_space()?;
                let keyword = lexer.read_atom_string()?.to_uppercase();
                read_text_until_crlf(lexer);
                UntaggedResponse::Numbered { number, keyword }
            }
            token => {
                return Err(lexer.error(&format!(
                    "Unexpected token in untagged response: {token:?}"
                )));
            }
        };

        Ok(Response::Untagged(untagged))
    }

    fn parse_continuation(lexer: &mut Lexer<'_>) -> Response {
        lexer.space();
        let text = read_text_until_crlf(lexer);

        Response::Continuation {
            text: if text.is_empty() { None } else { Some(text) },
        }
    }

    fn parse_status(lexer: &mut Lexer<'_>) -> Result<Status> {
        let s = lexer.read_atom_string()?;
        Status::parse(s).ok_or_else(|| lexer.error(&format!("Invalid status: {s}")))
    }
}
