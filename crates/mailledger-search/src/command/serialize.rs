//! Command serialization helpers.

use chrono::NaiveDate;

use crate::types::Flag;

use super::criteria::SearchCriteria;

/// Writes a string argument.
///
/// Strings are always sent quoted. Values that cannot appear inside a
/// quoted string (CR, LF, NUL or 8-bit bytes) are sent as a non-synchronizing
/// literal instead.
pub fn write_string(buf: &mut Vec<u8>, s: &str) {
    if s.bytes().any(needs_literal) {
        buf.extend_from_slice(format!("{{{}+}}\r\n", s.len()).as_bytes());
        buf.extend_from_slice(s.as_bytes());
        return;
    }

    buf.push(b'"');
    for b in s.bytes() {
        if b == b'"' || b == b'\\' {
            buf.push(b'\\');
        }
        buf.push(b);
    }
    buf.push(b'"');
}

/// Returns true if the byte cannot be carried by a quoted string.
const fn needs_literal(b: u8) -> bool {
    matches!(b, b'\r' | b'\n' | 0) || b > 0x7F
}

/// Returns the length of the longest string in `criteria` that
/// [`write_string`] sends as a literal, or `None` if every string fits in
/// quotes.
pub fn largest_literal(criteria: &SearchCriteria) -> Option<usize> {
    let strings = criteria
        .header
        .iter()
        .flat_map(|field| [&field.key, &field.value])
        .chain(&criteria.body)
        .chain(&criteria.text);

    let own = strings
        .filter(|s| s.bytes().any(needs_literal))
        .map(String::len)
        .max();

    let nested = criteria
        .not
        .iter()
        .chain(criteria.or.iter().flat_map(|(left, right)| [left, right]))
        .filter_map(largest_literal)
        .max();

    own.max(nested)
}

/// Writes a search date, e.g. `"1-Jan-2025"`.
pub fn write_date(buf: &mut Vec<u8>, date: NaiveDate) {
    buf.extend_from_slice(format!("\"{}\"", date.format("%-d-%b-%Y")).as_bytes());
}

/// Writes a flag as an atom.
fn write_flag(buf: &mut Vec<u8>, flag: &Flag) {
    buf.extend_from_slice(flag.as_str().as_bytes());
}

/// Item separator for one parenthesised search-key group.
struct Items<'a> {
    buf: &'a mut Vec<u8>,
    first: bool,
}

impl<'a> Items<'a> {
    fn open(buf: &'a mut Vec<u8>) -> Self {
        buf.push(b'(');
        Self { buf, first: true }
    }

    /// Starts a new item with `keyword` and returns the buffer for its
    /// arguments.
    fn item(&mut self, keyword: &str) -> &mut Vec<u8> {
        if !self.first {
            self.buf.push(b' ');
        }
        self.first = false;
        self.buf.extend_from_slice(keyword.as_bytes());
        &mut *self.buf
    }

    fn close(self) {
        if self.first {
            self.buf.extend_from_slice(b"ALL");
        }
        self.buf.push(b')');
    }
}

/// Returns the day if `before` is exactly the day after `since`.
fn is_single_day(since: Option<NaiveDate>, before: Option<NaiveDate>) -> Option<NaiveDate> {
    match (since, before) {
        (Some(since), Some(before)) if since.succ_opt() == Some(before) => Some(since),
        _ => None,
    }
}

fn write_date_range(
    items: &mut Items<'_>,
    since: Option<NaiveDate>,
    before: Option<NaiveDate>,
    keywords: [&str; 3],
) {
    let [on_key, since_key, before_key] = keywords;

    if let Some(day) = is_single_day(since, before) {
        let buf = items.item(on_key);
        buf.push(b' ');
        write_date(buf, day);
        return;
    }
    if let Some(since) = since {
        let buf = items.item(since_key);
        buf.push(b' ');
        write_date(buf, since);
    }
    if let Some(before) = before {
        let buf = items.item(before_key);
        buf.push(b' ');
        write_date(buf, before);
    }
}

/// Writes SEARCH criteria as one parenthesised search key.
///
/// Items are emitted in a fixed order so that the same criteria always
/// produce the same bytes. An empty criteria becomes `(ALL)`.
pub fn write_search_key(buf: &mut Vec<u8>, criteria: &SearchCriteria) {
    let mut items = Items::open(buf);

    if !criteria.seq_num.is_empty() {
        let set = criteria.seq_num.to_string();
        items.item(&set);
    }
    if !criteria.uid.is_empty() {
        let buf = items.item("UID");
        buf.push(b' ');
        buf.extend_from_slice(criteria.uid.to_string().as_bytes());
    }

    write_date_range(
        &mut items,
        criteria.since,
        criteria.before,
        ["ON", "SINCE", "BEFORE"],
    );
    write_date_range(
        &mut items,
        criteria.sent_since,
        criteria.sent_before,
        ["SENTON", "SENTSINCE", "SENTBEFORE"],
    );

    for field in &criteria.header {
        let key = field.key.to_ascii_uppercase();
        let buf = match key.as_str() {
            "BCC" | "CC" | "FROM" | "SUBJECT" | "TO" => items.item(&key),
            _ => {
                let buf = items.item("HEADER");
                buf.push(b' ');
                write_string(buf, &field.key);
                buf
            }
        };
        buf.push(b' ');
        write_string(buf, &field.value);
    }

    for s in &criteria.body {
        let buf = items.item("BODY");
        buf.push(b' ');
        write_string(buf, s);
    }
    for s in &criteria.text {
        let buf = items.item("TEXT");
        buf.push(b' ');
        write_string(buf, s);
    }

    for flag in &criteria.flag {
        if let Some(key) = flag.search_key() {
            items.item(key);
        } else {
            let buf = items.item("KEYWORD");
            buf.push(b' ');
            write_flag(buf, flag);
        }
    }
    for flag in &criteria.not_flag {
        if let Some(key) = flag.unset_search_key() {
            items.item(key);
        } else {
            let buf = items.item("UNKEYWORD");
            buf.push(b' ');
            write_flag(buf, flag);
        }
    }

    if criteria.larger > 0 {
        let buf = items.item("LARGER");
        buf.extend_from_slice(format!(" {}", criteria.larger).as_bytes());
    }
    if criteria.smaller > 0 {
        let buf = items.item("SMALLER");
        buf.extend_from_slice(format!(" {}", criteria.smaller).as_bytes());
    }

    for not in &criteria.not {
        let buf = items.item("NOT");
        buf.push(b' ');
        write_search_key(buf, not);
    }
    for (left, right) in &criteria.or {
        let buf = items.item("OR");
        buf.push(b' ');
        write_search_key(buf, left);
        buf.push(b' ');
        write_search_key(buf, right);
    }

    items.close();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::command::HeaderField;
    use crate::types::SequenceSet;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn key(criteria: &SearchCriteria) -> String {
        let mut buf = Vec::new();
        write_search_key(&mut buf, criteria);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn empty_criteria_is_all() {
        assert_eq!(key(&SearchCriteria::default()), "(ALL)");
    }

    #[test]
    fn since_and_before_one_day_apart_collapse_to_on() {
        let criteria = SearchCriteria {
            since: Some(day(2025, 1, 1)),
            before: Some(day(2025, 1, 2)),
            ..SearchCriteria::default()
        };
        assert_eq!(key(&criteria), "(ON \"1-Jan-2025\")");
        assert_eq!(key(&SearchCriteria::on(day(2025, 1, 1))), "(ON \"1-Jan-2025\")");
    }

    #[test]
    fn wider_date_range_is_not_collapsed() {
        let criteria = SearchCriteria {
            since: Some(day(2024, 12, 31)),
            before: Some(day(2025, 1, 2)),
            sent_before: Some(day(2025, 3, 15)),
            ..SearchCriteria::default()
        };
        assert_eq!(
            key(&criteria),
            "(SINCE \"31-Dec-2024\" BEFORE \"2-Jan-2025\" SENTBEFORE \"15-Mar-2025\")"
        );
    }

    #[test]
    fn sent_dates_collapse_independently() {
        let criteria = SearchCriteria {
            since: Some(day(2025, 2, 1)),
            sent_since: Some(day(2025, 2, 28)),
            sent_before: Some(day(2025, 3, 1)),
            ..SearchCriteria::default()
        };
        assert_eq!(
            key(&criteria),
            "(SINCE \"1-Feb-2025\" SENTON \"28-Feb-2025\")"
        );
    }

    #[test]
    fn flags_and_size() {
        let criteria = SearchCriteria {
            flag: vec![Flag::Flagged, Flag::Keyword("$Important".into())],
            not_flag: vec![Flag::Seen, Flag::Keyword("Junk".into())],
            larger: 1024,
            ..SearchCriteria::default()
        };
        assert_eq!(
            key(&criteria),
            "(FLAGGED KEYWORD $Important UNSEEN UNKEYWORD Junk LARGER 1024)"
        );
    }

    #[test]
    fn recent_uses_recent_and_old() {
        assert_eq!(key(&SearchCriteria::flag(Flag::Recent)), "(RECENT)");

        let criteria = SearchCriteria {
            not_flag: vec![Flag::Recent, Flag::Deleted],
            ..SearchCriteria::default()
        };
        assert_eq!(key(&criteria), "(OLD UNDELETED)");
    }

    #[test]
    fn headers_with_and_without_dedicated_keyword() {
        let criteria = SearchCriteria {
            header: vec![
                HeaderField::new("subject", "hi"),
                HeaderField::new("Bcc", "x@y"),
                HeaderField::new("List-Id", "dev"),
            ],
            ..SearchCriteria::default()
        };
        assert_eq!(
            key(&criteria),
            r#"(SUBJECT "hi" BCC "x@y" HEADER "List-Id" "dev")"#
        );
    }

    #[test]
    fn sets_come_first() {
        let criteria = SearchCriteria {
            seq_num: "1:10".parse().unwrap(),
            uid: SequenceSet::range_from(500).unwrap(),
            text: vec!["invoice".into()],
            ..SearchCriteria::default()
        };
        assert_eq!(key(&criteria), r#"(1:10 UID 500:* TEXT "invoice")"#);
    }

    #[test]
    fn not_and_or_nest() {
        let criteria = SearchCriteria {
            body: vec!["x".into()],
            not: vec![SearchCriteria::flag(Flag::Deleted)],
            or: vec![(
                SearchCriteria::header("From", "a"),
                SearchCriteria::default(),
            )],
            ..SearchCriteria::default()
        };
        assert_eq!(
            key(&criteria),
            r#"(BODY "x" NOT (DELETED) OR (FROM "a") (ALL))"#
        );
    }

    #[test]
    fn string_escaping() {
        let mut buf = Vec::new();
        write_string(&mut buf, r#"say "hi" \o/"#);
        assert_eq!(buf, br#""say \"hi\" \\o/""#);

        let mut buf = Vec::new();
        write_string(&mut buf, "");
        assert_eq!(buf, b"\"\"");
    }

    #[test]
    fn unquotable_string_becomes_literal() {
        let mut buf = Vec::new();
        write_string(&mut buf, "caf\u{e9}");
        assert_eq!(buf, b"{5+}\r\ncaf\xc3\xa9");

        let mut buf = Vec::new();
        write_string(&mut buf, "a\r\nb");
        assert_eq!(buf, b"{4+}\r\na\r\nb");
    }

    #[test]
    fn date_has_no_zero_padding() {
        let mut buf = Vec::new();
        write_date(&mut buf, day(2025, 7, 4));
        assert_eq!(buf, b"\"4-Jul-2025\"");
    }

    fn arb_criteria() -> impl Strategy<Value = SearchCriteria> {
        let leaf = (
            proptest::collection::vec("[a-z]{1,8}", 0..3),
            proptest::collection::vec(prop_oneof![Just(Flag::Seen), Just(Flag::Draft)], 0..2),
            0u64..10_000,
        )
            .prop_map(|(text, flag, larger)| SearchCriteria {
                text,
                flag,
                larger,
                ..SearchCriteria::default()
            });

        leaf.prop_recursive(3, 16, 2, |inner| {
            (
                proptest::collection::vec(inner.clone(), 0..2),
                proptest::collection::vec((inner.clone(), inner), 0..2),
            )
                .prop_map(|(not, or)| SearchCriteria {
                    not,
                    or,
                    ..SearchCriteria::default()
                })
        })
    }

    proptest! {
        #[test]
        fn parentheses_balance(criteria in arb_criteria()) {
            let out = key(&criteria);
            let mut depth = 0i32;
            for c in out.chars() {
                match c {
                    '(' => depth += 1,
                    ')' => depth -= 1,
                    _ => {}
                }
                prop_assert!(depth >= 0);
            }
            prop_assert_eq!(depth, 0);
            prop_assert!(out.starts_with('(') && out.ends_with(')'));
            prop_assert!(!out.contains("()"));
            prop_assert!(!out.contains("  "));
        }

        #[test]
        fn encoding_is_deterministic(criteria in arb_criteria()) {
            prop_assert_eq!(key(&criteria), key(&criteria.clone()));
        }
    }
}
