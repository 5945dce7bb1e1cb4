//! Tokenizer for server responses.
//!
//! Works on one complete response as delimited by the framing layer
//! (literal data included). The response parser pulls tokens one at a time
//! and uses the `read_*` / `expect*` helpers for the common shapes.

#![allow(clippy::missing_errors_doc)]

mod token;

pub use token::Token;

use crate::{Error, Result};

/// Cursor over the bytes of one response.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer positioned at the start of `input`.
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        self.input.get(self.pos..).unwrap_or_default()
    }

    /// Returns `true` once every byte has been consumed.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Returns `true` if only the line terminator (or nothing) is left.
    #[must_use]
    pub fn at_line_end(&self) -> bool {
        matches!(self.peek(), None | Some(b'\r'))
    }

    /// Next byte, without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Skips up to `n` bytes.
    pub fn skip(&mut self, n: usize) {
        self.pos = self.input.len().min(self.pos + n);
    }

    /// Consumes bytes while `pred` holds and returns them.
    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a [u8] {
        let rest = self.remaining();
        let len = rest.iter().position(|&b| !pred(b)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// Consumes `expected` if it is the next byte.
    fn eat(&mut self, expected: u8) -> bool {
        let found = self.peek() == Some(expected);
        if found {
            self.pos += 1;
        }
        found
    }

    /// Reads the next token.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        let Some(byte) = self.peek() else {
            return Ok(Token::End);
        };

        let punct = match byte {
            b' ' => Some(Token::Sp),
            b'(' => Some(Token::ListStart),
            b')' => Some(Token::ListEnd),
            b'[' => Some(Token::CodeStart),
            b']' => Some(Token::CodeEnd),
            b'*' => Some(Token::Untagged),
            b'+' => Some(Token::Continuation),
            _ => None,
        };
        if let Some(token) = punct {
            self.pos += 1;
            return Ok(token);
        }

        match byte {
            b'\r' if self.remaining().starts_with(b"\r\n") => {
                self.pos += 2;
                Ok(Token::LineEnd)
            }
            b'"' => self.quoted(),
            b'{' => self.literal(),
            _ if is_atom_char(byte) => self.atom(),
            _ => Err(self.error(&format!("Unexpected character: {byte:#04x}"))),
        }
    }

    fn atom(&mut self) -> Result<Token<'a>> {
        let raw = self.take_while(is_atom_char);
        let text = std::str::from_utf8(raw).map_err(|_| self.error("Invalid UTF-8 in atom"))?;

        if raw.iter().all(u8::is_ascii_digit) {
            return text
                .parse()
                .map(Token::Number)
                .map_err(|_| self.error("Number too large"));
        }
        if text.eq_ignore_ascii_case("NIL") {
            return Ok(Token::Nil);
        }
        Ok(Token::Atom(text))
    }

    fn quoted(&mut self) -> Result<Token<'a>> {
        self.pos += 1;

        let mut out = Vec::new();
        loop {
            let run = self.take_while(|b| !matches!(b, b'"' | b'\\' | b'\r' | b'\n'));
            out.extend_from_slice(run);

            match self.peek() {
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(c @ (b'"' | b'\\')) => {
                            self.pos += 1;
                            out.push(c);
                        }
                        _ => return Err(self.error("Invalid escape in quoted string")),
                    }
                }
                _ => return Err(self.error("Unterminated quoted string")),
            }
        }

        String::from_utf8(out)
            .map(Token::Quoted)
            .map_err(|_| self.error("Invalid UTF-8 in quoted string"))
    }

    /// Reads `{n}` or `{n+}`, the CRLF after it, and `n` bytes of data.
    fn literal(&mut self) -> Result<Token<'a>> {
        self.pos += 1;

        let size = std::str::from_utf8(self.take_while(|b| b.is_ascii_digit()))
            .ok()
            .and_then(|digits| digits.parse::<usize>().ok())
            .ok_or_else(|| self.error("Invalid literal size"))?;
        self.eat(b'+');
        if !self.eat(b'}') {
            return Err(self.error("Expected } after literal size"));
        }
        if !(self.eat(b'\r') && self.eat(b'\n')) {
            return Err(self.error("Expected CRLF after literal size"));
        }

        let data = self
            .remaining()
            .get(..size)
            .ok_or_else(|| self.error("Incomplete literal data"))?
            .to_vec();
        self.pos += size;
        Ok(Token::Literal(data))
    }

    /// Creates a parse error at the current position.
    pub(crate) fn error(&self, message: &str) -> Error {
        Error::Parse {
            position: self.pos,
            message: message.to_string(),
        }
    }

    /// Consumes a token of the same kind as `expected`.
    #[allow(clippy::needless_pass_by_value)]
    pub fn expect(&mut self, expected: Token<'_>) -> Result<()> {
        let token = self.next_token()?;
        if std::mem::discriminant(&token) == std::mem::discriminant(&expected) {
            Ok(())
        } else {
            Err(self.error(&format!("Expected {expected:?}, got {token:?}")))
        }
    }

    /// Consumes a single space.
    pub fn expect_space(&mut self) -> Result<()> {
        if self.eat(b' ') {
            Ok(())
        } else {
            Err(self.error("Expected space"))
        }
    }

    /// Consumes a space if one follows. Returns whether it did.
    pub fn space(&mut self) -> bool {
        self.eat(b' ')
    }

    /// Reads an astring: atom, number, `NIL`, quoted string or literal.
    pub fn read_astring(&mut self) -> Result<String> {
        let value = match self.next_token()? {
            Token::Atom(s) => s.to_string(),
            Token::Number(n) => n.to_string(),
            Token::Nil => "NIL".to_string(),
            Token::Quoted(s) => s,
            Token::Literal(data) => {
                String::from_utf8(data).map_err(|_| self.error("Invalid UTF-8 in literal"))?
            }
            token => return Err(self.error(&format!("Expected astring, got {token:?}"))),
        };
        Ok(value)
    }

    /// Reads a 32-bit number.
    pub fn read_number(&mut self) -> Result<u32> {
        match self.next_token()? {
            Token::Number(n) => Ok(n),
            token => Err(self.error(&format!("Expected number, got {token:?}"))),
        }
    }

    /// Reads an atom (`NIL` counts as one).
    pub fn read_atom_string(&mut self) -> Result<&'a str> {
        match self.next_token()? {
            Token::Atom(s) => Ok(s),
            Token::Nil => Ok("NIL"),
            token => Err(self.error(&format!("Expected atom, got {token:?}"))),
        }
    }

    /// Consumes exactly one value without interpreting it.
    ///
    /// A value is a scalar (atom, number, NIL, string, literal) or a
    /// parenthesised list of values nested to any depth.
    pub fn discard_value(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            let token = self.next_token()?;
            match token {
                Token::ListStart => depth += 1,
                Token::ListEnd if depth > 0 => depth -= 1,
                Token::Sp | Token::CodeStart | Token::CodeEnd | Token::Untagged
                    if depth > 0 => {}
                _ if token.is_scalar() => {}
                _ => return Err(self.error(&format!("Expected value, got {token:?}"))),
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }
}

/// Returns true if the byte may appear in an atom.
///
/// `\` is accepted so that flags like `\Seen` lex as one atom, and `:` /
/// `,` so that sequence sets do.
#[must_use]
pub const fn is_atom_char(b: u8) -> bool {
    b > b' '
        && b < 0x7F
        && !matches!(b, b'(' | b')' | b'{' | b'"' | b'%' | b'*' | b']')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tokens(input: &[u8]) -> Vec<Token<'_>> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            match lexer.next_token().unwrap() {
                Token::End => return out,
                token => out.push(token),
            }
        }
    }

    #[test]
    fn search_line() {
        assert_eq!(
            tokens(b"* SEARCH 2 4\r\n"),
            vec![
                Token::Untagged,
                Token::Sp,
                Token::Atom("SEARCH"),
                Token::Sp,
                Token::Number(2),
                Token::Sp,
                Token::Number(4),
                Token::LineEnd,
            ]
        );
    }

    #[test]
    fn sequence_set_is_one_atom() {
        let mut lexer = Lexer::new(b"1:3,7\r\n");

        assert_eq!(lexer.next_token().unwrap(), Token::Atom("1:3,7"));
        assert!(lexer.at_line_end());
        assert_eq!(lexer.next_token().unwrap(), Token::LineEnd);
        assert!(lexer.is_eof());
    }

    #[test]
    fn correlator_tokens() {
        assert_eq!(
            tokens(b"(TAG \"A1\")"),
            vec![
                Token::ListStart,
                Token::Atom("TAG"),
                Token::Sp,
                Token::Quoted("A1".to_string()),
                Token::ListEnd,
            ]
        );
    }

    #[test]
    fn nil_any_case() {
        assert_eq!(tokens(b"nil NIL Nil"), vec![
            Token::Nil,
            Token::Sp,
            Token::Nil,
            Token::Sp,
            Token::Nil
        ]);
    }

    #[test]
    fn number_overflow() {
        let mut lexer = Lexer::new(b"4294967296");
        assert!(lexer.next_token().is_err());

        let mut lexer = Lexer::new(b"4294967295");
        assert_eq!(lexer.next_token().unwrap(), Token::Number(u32::MAX));
    }

    #[test]
    fn quoted_string_escapes() {
        let mut lexer = Lexer::new(br#""say \"hi\" \\o/""#);
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::Quoted(r#"say "hi" \o/"#.to_string())
        );

        assert!(Lexer::new(br#""bad \n""#).next_token().is_err());
        assert!(Lexer::new(b"\"open\r\n").next_token().is_err());
    }

    #[test]
    fn literals() {
        let mut lexer = Lexer::new(b"{5}\r\nhello{2+}\r\nab");
        assert_eq!(lexer.next_token().unwrap(), Token::Literal(b"hello".to_vec()));
        assert_eq!(lexer.next_token().unwrap(), Token::Literal(b"ab".to_vec()));

        assert!(Lexer::new(b"{5}\r\nhel").next_token().is_err());
        assert!(Lexer::new(b"{x}\r\n").next_token().is_err());
        assert!(Lexer::new(b"{3}abc").next_token().is_err());
    }

    #[test]
    fn read_astring_forms() {
        let mut lexer = Lexer::new(b"A1 \"A 2\" {2}\r\nA3 7");
        assert_eq!(lexer.read_astring().unwrap(), "A1");
        lexer.expect_space().unwrap();
        assert_eq!(lexer.read_astring().unwrap(), "A 2");
        lexer.expect_space().unwrap();
        assert_eq!(lexer.read_astring().unwrap(), "A3");
        lexer.expect_space().unwrap();
        assert_eq!(lexer.read_astring().unwrap(), "7");
    }

    #[test]
    fn discard_nested_list() {
        let mut lexer = Lexer::new(b"(1 (\"a\" b) NIL) NEXT");

        lexer.discard_value().unwrap();
        assert!(lexer.space());
        assert_eq!(lexer.read_atom_string().unwrap(), "NEXT");
    }

    #[test]
    fn discard_scalars() {
        let mut lexer = Lexer::new(b"123 \"x y\" {2}\r\nab");

        lexer.discard_value().unwrap();
        lexer.expect_space().unwrap();
        lexer.discard_value().unwrap();
        lexer.expect_space().unwrap();
        lexer.discard_value().unwrap();
        assert!(lexer.is_eof());
    }

    #[test]
    fn discard_rejects_broken_values() {
        assert!(Lexer::new(b"(1 2\r\n").discard_value().is_err());
        assert!(Lexer::new(b")").discard_value().is_err());
        assert!(Lexer::new(b"\r\n").discard_value().is_err());
    }

    #[test]
    fn atom_chars() {
        for b in [b'A', b':', b',', b'\\', b'$', b'['] {
            assert!(is_atom_char(b), "{} should be an atom char", b as char);
        }
        for b in [b' ', b'(', b')', b'"', b'*', b'%', b'{', b']', b'\r', 0x7F, 0x80] {
            assert!(!is_atom_char(b), "{b:#04x} should not be an atom char");
        }
    }
}
