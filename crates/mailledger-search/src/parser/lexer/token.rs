//! Lexical tokens of a server response.

/// One token of a server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Run of atom characters that is not a plain number, e.g. `ESEARCH`,
    /// `\Seen` or the sequence set `1:3,7`.
    Atom(&'a str),
    /// All-digit atom that fits in 32 bits.
    Number(u32),
    /// `NIL`, in any letter case.
    Nil,
    /// Decoded content of a `"..."` string.
    Quoted(String),
    /// Content of a `{n}` or `{n+}` literal.
    Literal(Vec<u8>),
    /// `(`
    ListStart,
    /// `)`
    ListEnd,
    /// `[`, opening a response code.
    CodeStart,
    /// `]`
    CodeEnd,
    /// A single space.
    Sp,
    /// `*` introducing untagged data.
    Untagged,
    /// `+` introducing a continuation request.
    Continuation,
    /// CRLF.
    LineEnd,
    /// No input left.
    End,
}

impl Token<'_> {
    /// Returns `true` for tokens that form a complete value on their own.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Atom(_) | Self::Number(_) | Self::Nil | Self::Quoted(_) | Self::Literal(_)
        )
    }
}
