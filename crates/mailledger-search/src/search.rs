//! Search results and the handle used to wait for them.

use tokio::sync::oneshot;

use crate::types::{SequenceSet, Tag};
use crate::{Error, Result};

/// Data returned by a SEARCH or UID SEARCH command.
///
/// A legacy `* SEARCH` response only fills `all`. `min`, `max` and `count`
/// are only present when requested with `RETURN` and answered through
/// ESEARCH.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchData {
    /// Every matching number.
    pub all: SequenceSet,
    /// `true` if the numbers are UIDs rather than sequence numbers.
    pub uid: bool,
    /// Lowest matching number.
    pub min: Option<u32>,
    /// Highest matching number.
    pub max: Option<u32>,
    /// Number of matches.
    pub count: Option<u32>,
}

impl SearchData {
    /// Returns `all` as individual numbers in ascending order.
    ///
    /// A set containing `*` is a server bug in this position; it yields an
    /// empty list.
    #[must_use]
    pub fn all_nums(&self) -> Vec<u32> {
        self.all.nums().unwrap_or_default()
    }
}

/// Which search command a pending entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// `SEARCH`, results are sequence numbers.
    Search,
    /// `UID SEARCH`, results are UIDs.
    UidSearch,
}

impl CommandKind {
    /// Returns the kind for a `uid` flag.
    #[must_use]
    pub const fn from_uid(uid: bool) -> Self {
        if uid { Self::UidSearch } else { Self::Search }
    }

    /// Returns `true` for `UID SEARCH`.
    #[must_use]
    pub const fn is_uid(self) -> bool {
        matches!(self, Self::UidSearch)
    }

    /// Command name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "SEARCH",
            Self::UidSearch => "UID SEARCH",
        }
    }
}

/// Handle to an issued search.
///
/// Resolves once the server sends the tagged completion for the command,
/// or the connection goes away.
#[derive(Debug)]
pub struct SearchHandle {
    tag: Tag,
    kind: CommandKind,
    rx: oneshot::Receiver<Result<SearchData>>,
}

impl SearchHandle {
    pub(crate) const fn new(
        tag: Tag,
        kind: CommandKind,
        rx: oneshot::Receiver<Result<SearchData>>,
    ) -> Self {
        Self { tag, kind, rx }
    }

    /// Tag the command was sent with.
    #[must_use]
    pub const fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Returns the command kind.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Returns `true` if this is a `UID SEARCH`.
    #[must_use]
    pub const fn is_uid(&self) -> bool {
        self.kind.is_uid()
    }

    /// Waits for the command to complete.
    ///
    /// # Errors
    ///
    /// Returns [`Error::No`] or [`Error::Bad`] if the server rejected the
    /// search, [`Error::Bye`] if it closed the connection first, and
    /// [`Error::ConnectionLost`] if the connection was torn down.
    pub async fn wait(self) -> Result<SearchData> {
        self.rx.await.unwrap_or(Err(Error::ConnectionLost))
    }

    /// Blocking variant of [`wait`](Self::wait) for synchronous callers.
    ///
    /// # Errors
    ///
    /// Same as [`wait`](Self::wait).
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    pub fn wait_blocking(self) -> Result<SearchData> {
        self.rx.blocking_recv().unwrap_or(Err(Error::ConnectionLost))
    }
}
