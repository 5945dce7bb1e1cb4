//! Search criteria and options.

use chrono::NaiveDate;

use crate::types::{Flag, SequenceSet};

/// A predicate for the SEARCH command.
///
/// Every populated field must hold for a message to match (the fields are
/// ANDed). `not` and `or` embed whole criteria trees, so arbitrary boolean
/// expressions can be built. An empty criteria matches every message.
///
/// ```
/// use mailledger_search::{Flag, SearchCriteria};
///
/// let criteria = SearchCriteria {
///     not_flag: vec![Flag::Seen],
///     or: vec![(
///         SearchCriteria::header("From", "alice"),
///         SearchCriteria::header("From", "bob"),
///     )],
///     ..SearchCriteria::default()
/// };
/// assert_eq!(criteria.to_search_key(), r#"(UNSEEN OR (FROM "alice") (FROM "bob"))"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Message sequence numbers.
    pub seq_num: SequenceSet,
    /// Message UIDs.
    pub uid: SequenceSet,

    /// Internal date on or after this day.
    pub since: Option<NaiveDate>,
    /// Internal date before this day.
    pub before: Option<NaiveDate>,
    /// `Date:` header on or after this day.
    pub sent_since: Option<NaiveDate>,
    /// `Date:` header before this day.
    pub sent_before: Option<NaiveDate>,

    /// Header fields containing a substring.
    pub header: Vec<HeaderField>,
    /// Substrings of the message body.
    pub body: Vec<String>,
    /// Substrings of the header or body.
    pub text: Vec<String>,

    /// Flags that must be set.
    pub flag: Vec<Flag>,
    /// Flags that must not be set.
    pub not_flag: Vec<Flag>,

    /// Size in octets strictly larger than this (0 = no bound).
    pub larger: u64,
    /// Size in octets strictly smaller than this (0 = no bound).
    pub smaller: u64,

    /// Criteria that must each not match.
    pub not: Vec<SearchCriteria>,
    /// Pairs of criteria of which at least one must match.
    pub or: Vec<(SearchCriteria, SearchCriteria)>,
}

impl SearchCriteria {
    /// Creates criteria matching every message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Criteria matching a single header substring.
    #[must_use]
    pub fn header(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            header: vec![HeaderField::new(key, value)],
            ..Self::default()
        }
    }

    /// Criteria matching a set flag.
    #[must_use]
    pub fn flag(flag: Flag) -> Self {
        Self {
            flag: vec![flag],
            ..Self::default()
        }
    }

    /// Criteria matching messages received on `day`.
    #[must_use]
    pub fn on(day: NaiveDate) -> Self {
        Self {
            since: Some(day),
            before: day.succ_opt(),
            ..Self::default()
        }
    }

    /// Returns `true` if no field is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Renders the criteria as a parenthesised search key.
    #[must_use]
    pub fn to_search_key(&self) -> String {
        let mut buf = Vec::new();
        super::serialize::write_search_key(&mut buf, self);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Length of the longest value that has to be sent as a literal.
    pub(crate) fn largest_literal(&self) -> Option<usize> {
        super::serialize::largest_literal(self)
    }
}

/// A `(header-name, substring)` constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    /// Header field name, e.g. `Subject` or `List-Id`.
    pub key: String,
    /// Substring to look for in the field value.
    pub value: String,
}

impl HeaderField {
    /// Creates a header constraint.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Result shape requested with `RETURN (...)`.
///
/// Requires the ESEARCH extension or `IMAP4rev2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnOption {
    /// Lowest matching number.
    Min,
    /// Highest matching number.
    Max,
    /// Every matching number, as a sequence set.
    All,
    /// Number of matches.
    Count,
}

impl ReturnOption {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::All => "ALL",
            Self::Count => "COUNT",
        }
    }
}

impl std::fmt::Display for ReturnOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for the SEARCH command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Requested result shapes; empty means a plain SEARCH.
    pub return_options: Vec<ReturnOption>,
}

impl SearchOptions {
    /// Creates options for a plain SEARCH.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `RETURN` option.
    #[must_use]
    pub fn with_return(mut self, option: ReturnOption) -> Self {
        self.return_options.push(option);
        self
    }
}
