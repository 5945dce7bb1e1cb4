//! Framed reading of IMAP responses.
//!
//! IMAP uses CRLF-terminated lines with support for literals. This module
//! splits the server's byte stream into complete responses, literals
//! included, so that each one can be handed to the parser in one piece.

#![allow(clippy::missing_errors_doc)]

use std::io;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

use super::config::Config;
use crate::{Error, Result};

/// Default buffer size for reading.
const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Response reader over the receiving half of a connection.
pub struct FramedStream<S> {
    reader: BufReader<S>,
    max_line_length: usize,
    max_literal_size: usize,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + Unpin,
{
    /// Creates a new framed stream with the limits from `config`.
    pub fn new(stream: S, config: &Config) -> Self {
        Self {
            reader: BufReader::with_capacity(DEFAULT_BUFFER_SIZE, stream),
            max_line_length: config.max_line_length,
            max_literal_size: config.max_literal_size,
        }
    }

    /// Reads a complete IMAP response, handling literals.
    ///
    /// A line ending in `{n}` or `{n+}` is followed by `n` bytes of literal
    /// data and then the rest of the response; all of it is returned as one
    /// buffer.
    pub async fn read_response(&mut self) -> Result<Bytes> {
        let mut response = BytesMut::new();

        loop {
            let start = response.len();
            self.read_line(&mut response).await?;

            let Some(literal_len) = parse_literal_length(&response[start..]) else {
                break;
            };
            if literal_len > self.max_literal_size {
                return Err(Error::Protocol(format!(
                    "literal too large: {literal_len} bytes (max {})",
                    self.max_literal_size
                )));
            }

            let mut literal = vec![0u8; literal_len];
            self.reader.read_exact(&mut literal).await?;
            response.extend_from_slice(&literal);
        }

        Ok(response.freeze())
    }

    /// Appends a single CRLF-terminated line to `out`.
    async fn read_line(&mut self, out: &mut BytesMut) -> Result<()> {
        let mut len = 0;

        loop {
            let buf = self.reader.fill_buf().await?;
            if buf.is_empty() {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed",
                )));
            }

            // A CR at the end of the previous chunk pairs with a LF here.
            if out.last() == Some(&b'\r') && len > 0 && buf[0] == b'\n' {
                out.extend_from_slice(b"\n");
                self.reader.consume(1);
                return Ok(());
            }

            if let Some(pos) = find_crlf(buf) {
                if len + pos > self.max_line_length {
                    return Err(Error::Protocol("line too long".to_string()));
                }
                out.extend_from_slice(&buf[..pos + 2]);
                self.reader.consume(pos + 2);
                return Ok(());
            }

            let chunk = buf.len();
            out.extend_from_slice(buf);
            self.reader.consume(chunk);
            len += chunk;

            if len > self.max_line_length {
                return Err(Error::Protocol("line too long".to_string()));
            }
        }
    }
}

/// Finds the position of CRLF in a buffer.
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Parses a literal length from the end of a line.
///
/// Matches patterns like `{123}\r\n` or `{123+}\r\n` (non-synchronizing).
fn parse_literal_length(line: &[u8]) -> Option<usize> {
    let line = line.strip_suffix(b"\r\n")?;
    let line = line.strip_suffix(b"}")?;
    let line = line.strip_suffix(b"+").unwrap_or(line);

    let open = line.iter().rposition(|&b| b == b'{')?;
    let digits = &line[open + 1..];
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio_test::io::Builder;

    use super::*;

    fn framed<S: AsyncRead + Unpin>(stream: S) -> FramedStream<S> {
        FramedStream::new(stream, &Config::default())
    }

    #[test]
    fn test_find_crlf() {
        assert_eq!(find_crlf(b"hello\r\n"), Some(5));
        assert_eq!(find_crlf(b"\r\n"), Some(0));
        assert_eq!(find_crlf(b"no newline"), None);
        assert_eq!(find_crlf(b"just\n"), None);
    }

    #[test]
    fn test_parse_literal_length() {
        assert_eq!(parse_literal_length(b"* ESEARCH (TAG {3}\r\n"), Some(3));
        assert_eq!(parse_literal_length(b"X {123+}\r\n"), Some(123));
        assert_eq!(parse_literal_length(b"{0}\r\n"), Some(0));
        assert_eq!(parse_literal_length(b"no literal\r\n"), None);
        assert_eq!(parse_literal_length(b"incomplete {123"), None);
        assert_eq!(parse_literal_length(b"wrong {abc}\r\n"), None);
        assert_eq!(parse_literal_length(b"empty {}\r\n"), None);
    }

    #[tokio::test]
    async fn test_read_simple_lines() {
        let mock = Builder::new()
            .read(b"* SEARCH 2 4 9\r\nA0000 OK done\r\n")
            .build();
        let mut framed = framed(mock);

        assert_eq!(&framed.read_response().await.unwrap()[..], b"* SEARCH 2 4 9\r\n");
        assert_eq!(&framed.read_response().await.unwrap()[..], b"A0000 OK done\r\n");
    }

    #[tokio::test]
    async fn test_read_line_split_across_reads() {
        let mock = Builder::new()
            .read(b"* SEARCH 1")
            .read(b"0 11\r")
            .read(b"\n")
            .build();
        let mut framed = framed(mock);

        assert_eq!(&framed.read_response().await.unwrap()[..], b"* SEARCH 10 11\r\n");
    }

    #[tokio::test]
    async fn test_read_with_literal() {
        let mock = Builder::new()
            .read(b"* ESEARCH (TAG {5}\r\n")
            .read(b"A0001) COUNT 2\r\n")
            .build();
        let mut framed = framed(mock);

        let response = framed.read_response().await.unwrap();
        assert_eq!(&response[..], b"* ESEARCH (TAG {5}\r\nA0001) COUNT 2\r\n");
    }

    #[tokio::test]
    async fn test_eof_is_io_error() {
        let mock = Builder::new().read(b"* SEARCH 1").build();
        let mut framed = framed(mock);

        assert!(matches!(framed.read_response().await, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_literal_size_validation() {
        let config = Config::builder().max_literal_size(16).build();
        let mock = Builder::new().read(b"* X {17}\r\n").build();
        let mut framed = FramedStream::new(mock, &config);

        let err = framed.read_response().await.unwrap_err();
        assert!(err.to_string().contains("literal too large"));
    }

    #[tokio::test]
    async fn test_line_length_limit() {
        let config = Config::builder().max_line_length(64).build();
        let long_line = "A".repeat(100);
        let mock = Builder::new().read(long_line.as_bytes()).build();
        let mut framed = FramedStream::new(mock, &config);

        let err = framed.read_response().await.unwrap_err();
        assert!(err.to_string().contains("line too long"));
    }

    #[tokio::test]
    async fn test_complete_line_over_limit() {
        let config = Config::builder().max_line_length(16).build();
        let mock = Builder::new().read(b"* SEARCH 1 2 3 4 5 6 7\r\n").build();
        let mut framed = FramedStream::new(mock, &config);

        assert!(matches!(
            framed.read_response().await,
            Err(Error::Protocol(_))
        ));
    }
}
