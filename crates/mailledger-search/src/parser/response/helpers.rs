//! Parser helper functions.

use crate::parser::lexer::{Lexer, Token};
use crate::types::{Capability, SequenceSet};
use crate::Result;

/// Parses capability data.
pub fn parse_capability_data(lexer: &mut Lexer<'_>) -> Result<Vec<Capability>> {
    let mut caps = Vec::new();

    while lexer.space() {
        match lexer.next_token()? {
            Token::Atom(s) => caps.push(Capability::parse(s)),
            Token::Number(n) => caps.push(Capability::parse(&n.to_string())),
            token => return Err(lexer.error(&format!("Unexpected token in CAPABILITY: {token:?}"))),
        }
    }

    Ok(caps)
}

/// Parses the body of a legacy `* SEARCH` response: zero or more numbers,
/// each preceded by a space.
pub fn parse_search_response(lexer: &mut Lexer<'_>) -> Result<Vec<u32>> {
    let mut nums = Vec::new();

    while lexer.space() {
        // Some servers put a trailing space before CRLF.
        if lexer.at_line_end() {
            break;
        }
        nums.push(lexer.read_number()?);
    }

    expect_line_end(lexer, "SEARCH")?;
    Ok(nums)
}

/// Reads a sequence set value (`5`, `1:3,7`, ...).
pub fn read_sequence_set(lexer: &mut Lexer<'_>) -> Result<SequenceSet> {
    match lexer.next_token()? {
        Token::Number(n) => {
            SequenceSet::single(n).ok_or_else(|| lexer.error("Invalid message number 0"))
        }
        Token::Atom(s) => s.parse(),
        token => Err(lexer.error(&format!("Expected sequence set, got {token:?}"))),
    }
}

/// Fails unless only the line terminator is left.
pub fn expect_line_end(lexer: &Lexer<'_>, what: &str) -> Result<()> {
    if lexer.at_line_end() {
        Ok(())
    } else {
        Err(lexer.error(&format!("Unexpected data after {what} response")))
    }
}

/// Reads text until CRLF.
pub fn read_text_until_crlf(lexer: &mut Lexer<'_>) -> String {
    let remaining = lexer.remaining();

    let end = remaining
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(remaining.len());

    lexer.skip(end);
    if lexer.peek() == Some(b'\r') {
        lexer.skip(2);
    }

    String::from_utf8_lossy(&remaining[..end]).to_string()
}
