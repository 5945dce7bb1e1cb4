//! Ledger of searches awaiting their tagged completion.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::debug;

use crate::search::{CommandKind, SearchData};
use crate::types::{Status, Tag};
use crate::{Error, Result};

#[derive(Debug)]
struct PendingCommand {
    tag: Tag,
    kind: CommandKind,
    data: SearchData,
    done: oneshot::Sender<Result<SearchData>>,
}

impl PendingCommand {
    fn finish(self, result: Result<SearchData>) {
        // The receiver may have been dropped by a caller that lost interest.
        let _ = self.done.send(result);
    }
}

#[derive(Debug, Default)]
struct Ledger {
    entries: Vec<PendingCommand>,
    closed: bool,
}

/// Searches in flight, oldest first.
///
/// Shared between the caller issuing commands and the task reading
/// responses; every operation takes the lock once.
#[derive(Debug, Default)]
pub struct PendingCommands {
    inner: Mutex<Ledger>,
}

impl PendingCommands {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a search and returns the receiving end of its completion.
    ///
    /// Once the ledger is closed the returned receiver resolves to
    /// [`Error::ConnectionLost`] straight away.
    pub fn register(&self, tag: Tag, kind: CommandKind) -> oneshot::Receiver<Result<SearchData>> {
        let (done, rx) = oneshot::channel();
        let mut ledger = self.lock();

        if ledger.closed {
            let _ = done.send(Err(Error::ConnectionLost));
            return rx;
        }

        ledger.entries.push(PendingCommand {
            tag,
            kind,
            data: SearchData {
                uid: kind.is_uid(),
                ..SearchData::default()
            },
            done,
        });
        rx
    }

    /// Adds legacy `* SEARCH` numbers to the oldest pending search.
    ///
    /// Returns `false` if no search is pending.
    pub fn accumulate(&self, nums: &[u32]) -> bool {
        let mut ledger = self.lock();
        let Some(entry) = ledger.entries.first_mut() else {
            return false;
        };
        for &n in nums {
            entry.data.all.add_num(n);
        }
        true
    }

    /// Replaces the result of the search an ESEARCH response belongs to.
    ///
    /// With a correlator only the search sent under that tag matches;
    /// without one the oldest pending search does. Returns `false` if
    /// nothing matched.
    pub fn replace(&self, correlator: Option<&Tag>, data: SearchData) -> bool {
        let mut ledger = self.lock();
        let entry = ledger
            .entries
            .iter_mut()
            .find(|entry| correlator.is_none_or(|tag| entry.tag == *tag));

        match entry {
            Some(entry) => {
                entry.data = data;
                true
            }
            None => false,
        }
    }

    /// Resolves the search sent under `tag` from its tagged status.
    ///
    /// Returns `false` if no search with that tag is pending.
    pub fn complete(&self, tag: &Tag, status: Status, text: String) -> bool {
        let entry = {
            let mut ledger = self.lock();
            match ledger.entries.iter().position(|entry| entry.tag == *tag) {
                Some(index) => ledger.entries.remove(index),
                None => return false,
            }
        };

        debug!(tag = %entry.tag, command = entry.kind.as_str(), ?status, "search completed");

        let result = match status {
            Status::Ok | Status::PreAuth => Ok(entry.data.clone()),
            Status::No => Err(Error::No(text)),
            Status::Bad => Err(Error::Bad(text)),
            Status::Bye => Err(Error::Bye(text)),
        };
        entry.finish(result);
        true
    }

    /// Fails every pending search with the error built by `error`.
    pub fn fail_all(&self, error: impl Fn() -> Error) {
        let entries = std::mem::take(&mut self.lock().entries);
        for entry in entries {
            entry.finish(Err(error()));
        }
    }

    /// Fails every pending search with [`Error::ConnectionLost`] and
    /// rejects later registrations.
    pub fn close(&self) {
        let entries = {
            let mut ledger = self.lock();
            ledger.closed = true;
            std::mem::take(&mut ledger.entries)
        };
        for entry in entries {
            entry.finish(Err(Error::ConnectionLost));
        }
    }

    /// Returns `true` once [`close`](Self::close) has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of searches in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns `true` if no search is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}
