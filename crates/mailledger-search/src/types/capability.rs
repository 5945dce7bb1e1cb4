//! Server capabilities and response status.

/// Response status from a tagged or untagged status response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Command completed successfully.
    Ok,
    /// Command failed (operational error).
    No,
    /// Command failed (protocol/syntax error).
    Bad,
    /// Server greeting (pre-authenticated).
    PreAuth,
    /// Server is closing connection.
    Bye,
}

impl Status {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "OK" => Some(Self::Ok),
            "NO" => Some(Self::No),
            "BAD" => Some(Self::Bad),
            "PREAUTH" => Some(Self::PreAuth),
            "BYE" => Some(Self::Bye),
            _ => None,
        }
    }
}

/// Server capability.
///
/// Only the capabilities that change how searches are issued get their own
/// variant; everything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `IMAP4rev1` (RFC 3501)
    Imap4Rev1,
    /// `IMAP4rev2` (RFC 9051), which includes ESEARCH
    Imap4Rev2,
    /// ESEARCH extension (RFC 4731)
    ESearch,
    /// LITERAL+ extension (RFC 7888)
    LiteralPlus,
    /// LITERAL- extension (RFC 7888)
    LiteralMinus,
    /// Unknown capability
    Unknown(String),
}

impl Capability {
    /// Parses a capability string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "IMAP4REV1" => Self::Imap4Rev1,
            "IMAP4REV2" => Self::Imap4Rev2,
            "ESEARCH" => Self::ESearch,
            "LITERAL+" => Self::LiteralPlus,
            "LITERAL-" => Self::LiteralMinus,
            _ => Self::Unknown(s.to_string()),
        }
    }

    /// Returns `true` if `caps` allows `RETURN (...)` search options.
    #[must_use]
    pub fn supports_esearch(caps: &[Self]) -> bool {
        caps.iter()
            .any(|c| matches!(c, Self::ESearch | Self::Imap4Rev2))
    }

    /// Returns `true` if `caps` allows a non-synchronizing literal of `len`
    /// bytes.
    ///
    /// LITERAL+ allows any size. LITERAL- (implied by `IMAP4rev2`) caps it
    /// at [`LITERAL_MINUS_MAX`](Self::LITERAL_MINUS_MAX) bytes.
    #[must_use]
    pub fn supports_literal(caps: &[Self], len: usize) -> bool {
        caps.iter().any(|c| match c {
            Self::LiteralPlus => true,
            Self::LiteralMinus | Self::Imap4Rev2 => len <= Self::LITERAL_MINUS_MAX,
            _ => false,
        })
    }

    /// Largest non-synchronizing literal LITERAL- allows.
    pub const LITERAL_MINUS_MAX: usize = 4096;
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Imap4Rev1 => write!(f, "IMAP4rev1"),
            Self::Imap4Rev2 => write!(f, "IMAP4rev2"),
            Self::ESearch => write!(f, "ESEARCH"),
            Self::LiteralPlus => write!(f, "LITERAL+"),
            Self::LiteralMinus => write!(f, "LITERAL-"),
            Self::Unknown(s) => write!(f, "{s}"),
        }
    }
}
