//! ESEARCH response parsing (RFC 4731, RFC 9051 section 7.3.4).
//!
//! ```text
//! esearch-response = "ESEARCH" [search-correlator] [SP "UID"]
//!                    *(SP search-return-data)
//! search-correlator = SP "(" "TAG" SP tag-string ")"
//! ```
//!
//! Return data is a list of `name SP value` pairs. Names this client does
//! not know are skipped one value at a time so that server extensions
//! (e.g. `MODSEQ`) never break parsing of the fields that follow.

use tracing::trace;

use crate::parser::lexer::{Lexer, Token};
use crate::search::SearchData;
use crate::types::Tag;
use crate::Result;

use super::helpers::{expect_line_end, read_sequence_set};
use super::types::ESearchResponse;

/// Parses everything after the `ESEARCH` keyword.
pub fn parse_esearch_response(lexer: &mut Lexer<'_>) -> Result<ESearchResponse> {
    let mut response = ESearchResponse::default();

    if !lexer.space() {
        expect_line_end(lexer, "ESEARCH")?;
        return Ok(response);
    }

    if lexer.peek() == Some(b'(') {
        response.tag = Some(parse_correlator(lexer)?);
        if !lexer.space() {
            expect_line_end(lexer, "ESEARCH")?;
            return Ok(response);
        }
    }

    let mut name = lexer.read_atom_string()?;
    if name.eq_ignore_ascii_case("UID") {
        response.data.uid = true;
        if !lexer.space() {
            expect_line_end(lexer, "ESEARCH")?;
            return Ok(response);
        }
        name = lexer.read_atom_string()?;
    }

    loop {
        lexer.expect_space()?;
        parse_return_data(lexer, name, &mut response.data)?;

        if !lexer.space() {
            break;
        }
        name = lexer.read_atom_string()?;
    }

    expect_line_end(lexer, "ESEARCH")?;
    Ok(response)
}

fn parse_correlator(lexer: &mut Lexer<'_>) -> Result<Tag> {
    lexer.expect(Token::ListStart)?;
    let correlator = lexer.read_atom_string()?;
    if !correlator.eq_ignore_ascii_case("TAG") {
        return Err(lexer.error(&format!(
            "in search-correlator: name must be TAG, but got {correlator:?}"
        )));
    }
    lexer.expect_space()?;
    let tag = lexer.read_astring()?;
    lexer.expect(Token::ListEnd)?;
    Ok(Tag::new(tag))
}

fn parse_return_data(lexer: &mut Lexer<'_>, name: &str, data: &mut SearchData) -> Result<()> {
    match name.to_uppercase().as_str() {
        "MIN" => data.min = Some(lexer.read_number()?),
        "MAX" => data.max = Some(lexer.read_number()?),
        "COUNT" => data.count = Some(lexer.read_number()?),
        "ALL" => data.all = read_sequence_set(lexer)?,
        _ => {
            trace!(field = name, "skipping unknown ESEARCH return data");
            lexer.discard_value()?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::SequenceSet;
    use crate::Error;

    fn parse(input: &str) -> Result<ESearchResponse> {
        parse_esearch_response(&mut Lexer::new(input.as_bytes()))
    }

    #[test]
    fn uid_count() {
        let response = parse(" (TAG \"A1\") UID COUNT 5\r\n").unwrap();

        assert_eq!(response.tag, Some(Tag::new("A1")));
        assert!(response.data.uid);
        assert_eq!(response.data.count, Some(5));
        assert_eq!(response.data.min, None);
        assert_eq!(response.data.max, None);
        assert!(response.data.all.is_empty());
    }

    #[test]
    fn all_is_a_sequence_set() {
        let response = parse(" (TAG \"A1\") ALL 1:3,7\r\n").unwrap();

        assert!(!response.data.uid);
        assert_eq!(response.data.all_nums(), vec![1, 2, 3, 7]);
    }

    #[test]
    fn all_single_number() {
        let response = parse(" ALL 4\r\n").unwrap();
        assert_eq!(response.data.all, SequenceSet::single(4).unwrap());
    }

    #[test]
    fn min_max_count_in_any_order() {
        let response = parse(" (TAG \"A7\") UID MAX 900 COUNT 3 MIN 17").unwrap();

        assert_eq!(response.data.min, Some(17));
        assert_eq!(response.data.max, Some(900));
        assert_eq!(response.data.count, Some(3));
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let response =
            parse(" (TAG \"A2\") MODSEQ 123 COUNT 2 X-LIST (1 (2 \"z\")) ALL 5:6\r\n").unwrap();

        assert_eq!(response.data.count, Some(2));
        assert_eq!(response.data.all_nums(), vec![5, 6]);
    }

    #[test]
    fn no_correlator() {
        let response = parse(" UID ALL 10\r\n").unwrap();

        assert_eq!(response.tag, None);
        assert!(response.data.uid);
    }

    #[test]
    fn empty_result_sets() {
        assert_eq!(parse("\r\n").unwrap(), ESearchResponse::default());

        let response = parse(" (TAG \"A3\")\r\n").unwrap();
        assert_eq!(response.tag, Some(Tag::new("A3")));
        assert_eq!(response.data, SearchData::default());

        let response = parse(" (TAG \"A4\") UID\r\n").unwrap();
        assert!(response.data.uid);
    }

    #[test]
    fn empty_tag_is_no_correlator() {
        let response = parse(" (TAG \"\") COUNT 1").unwrap();
        assert_eq!(response.tag, Some(Tag::new("")));
        assert_eq!(response.correlator(), None);
    }

    #[test]
    fn lowercase_names() {
        let response = parse(" (tag \"A5\") uid count 9").unwrap();
        assert!(response.data.uid);
        assert_eq!(response.data.count, Some(9));
    }

    #[test]
    fn wrong_correlator_name() {
        let err = parse(" (MSG \"A1\") COUNT 5").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn malformed_values() {
        assert!(parse(" COUNT five").is_err());
        assert!(parse(" MIN").is_err());
        assert!(parse(" ALL 3:0").is_err());
        assert!(parse(" COUNT 1 (").is_err());
        assert!(parse(" (TAG \"A1\" COUNT 1").is_err());
    }
}
