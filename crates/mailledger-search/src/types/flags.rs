//! Message flags.

/// Message flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Message has been read.
    Seen,
    /// Message has been answered.
    Answered,
    /// Message is flagged for special attention.
    Flagged,
    /// Message is marked for deletion.
    Deleted,
    /// Message is a draft.
    Draft,
    /// Message is recent (first session to see it).
    Recent,
    /// Custom keyword flag.
    Keyword(String),
}

impl Flag {
    /// Parses a flag string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "\\SEEN" => Self::Seen,
            "\\ANSWERED" => Self::Answered,
            "\\FLAGGED" => Self::Flagged,
            "\\DELETED" => Self::Deleted,
            "\\DRAFT" => Self::Draft,
            "\\RECENT" => Self::Recent,
            _ => Self::Keyword(s.to_string()),
        }
    }

    /// Returns the flag as an IMAP string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Seen => "\\Seen",
            Self::Answered => "\\Answered",
            Self::Flagged => "\\Flagged",
            Self::Deleted => "\\Deleted",
            Self::Draft => "\\Draft",
            Self::Recent => "\\Recent",
            Self::Keyword(s) => s,
        }
    }

    /// Returns the dedicated SEARCH keyword matching messages with this
    /// flag set.
    ///
    /// Keywords have none and go through `KEYWORD`.
    #[must_use]
    pub const fn search_key(&self) -> Option<&'static str> {
        match self {
            Self::Answered => Some("ANSWERED"),
            Self::Deleted => Some("DELETED"),
            Self::Draft => Some("DRAFT"),
            Self::Flagged => Some("FLAGGED"),
            Self::Seen => Some("SEEN"),
            Self::Recent => Some("RECENT"),
            Self::Keyword(_) => None,
        }
    }

    /// Returns the dedicated SEARCH keyword matching messages without this
    /// flag.
    ///
    /// `\Recent` has no `UNRECENT`; its negation is `OLD`. Keywords go
    /// through `UNKEYWORD`.
    #[must_use]
    pub const fn unset_search_key(&self) -> Option<&'static str> {
        match self {
            Self::Answered => Some("UNANSWERED"),
            Self::Deleted => Some("UNDELETED"),
            Self::Draft => Some("UNDRAFT"),
            Self::Flagged => Some("UNFLAGGED"),
            Self::Seen => Some("UNSEEN"),
            Self::Recent => Some("OLD"),
            Self::Keyword(_) => None,
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
