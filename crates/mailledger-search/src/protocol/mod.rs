//! Sans-I/O search protocol.
//!
//! [`Protocol`] owns the tag generator, the ledger of searches in flight
//! and the capabilities the server last advertised. It turns search
//! requests into bytes to send, and server responses into updates of the
//! ledger, without touching a socket. The connection driver feeds it; tests
//! can drive it directly.
//!
//! # Example
//!
//! ```
//! use mailledger_search::protocol::Protocol;
//! use mailledger_search::{SearchCriteria, SearchOptions};
//!
//! let protocol = Protocol::new();
//! let (handle, bytes) = protocol.issue_search(SearchCriteria::default(), SearchOptions::default(), false);
//! assert_eq!(bytes, b"A0000 SEARCH (ALL)\r\n");
//!
//! protocol.handle_response(b"* SEARCH 2 4 9\r\n").unwrap();
//! protocol.handle_response(b"A0000 OK SEARCH completed\r\n").unwrap();
//!
//! let data = handle.wait_blocking().unwrap();
//! assert_eq!(data.all_nums(), vec![2, 4, 9]);
//! ```

mod pending;

use std::sync::{Mutex, PoisonError};

pub use pending::PendingCommands;

use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::command::{SearchCommand, SearchCriteria, SearchOptions, TagGenerator};
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::search::SearchHandle;
use crate::types::Capability;
use crate::{Error, Result};

/// Search protocol state shared by the caller and the response reader.
#[derive(Debug, Default)]
pub struct Protocol {
    tags: TagGenerator,
    pending: PendingCommands,
    capabilities: Mutex<Vec<Capability>>,
    issuing: Mutex<()>,
}

impl Protocol {
    /// Creates a protocol using the default tag prefix `A`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a protocol whose tags start with `prefix`.
    #[must_use]
    pub fn with_tag_prefix(prefix: char) -> Self {
        Self {
            tags: TagGenerator::new(prefix),
            ..Self::default()
        }
    }

    /// Registers a search and returns its handle with the bytes to send.
    ///
    /// Callers issuing from several threads must send the bytes in the
    /// order this returns them; [`issue_search_with`](Self::issue_search_with)
    /// does that for them. If the search is refused the bytes are empty.
    pub fn issue_search(
        &self,
        criteria: SearchCriteria,
        options: SearchOptions,
        uid: bool,
    ) -> (SearchHandle, Vec<u8>) {
        let mut out = Vec::new();
        let handle = self.issue_search_with(criteria, options, uid, |bytes| out = bytes);
        (handle, out)
    }

    /// Registers a search and hands its bytes to `send`.
    ///
    /// Tag allocation, registration and `send` happen under one lock, so
    /// the ledger lists searches in the order `send` saw them. `send` must
    /// not block on the network.
    ///
    /// A search whose values need a non-synchronizing literal the server
    /// has not advertised support for is never sent; its handle resolves
    /// to [`Error::Protocol`]. With no capabilities known the search is
    /// sent as is.
    pub fn issue_search_with<F>(
        &self,
        criteria: SearchCriteria,
        options: SearchOptions,
        uid: bool,
        send: F,
    ) -> SearchHandle
    where
        F: FnOnce(Vec<u8>),
    {
        let command = SearchCommand::new(criteria, options, uid);
        let kind = command.kind();
        let caps = self.capabilities();

        if !caps.is_empty()
            && !command.options.return_options.is_empty()
            && !Capability::supports_esearch(&caps)
        {
            warn!("RETURN options sent to a server without ESEARCH");
        }
        let refused_literal = command
            .criteria
            .largest_literal()
            .filter(|&len| !caps.is_empty() && !Capability::supports_literal(&caps, len));

        let _order = self.issuing.lock().unwrap_or_else(PoisonError::into_inner);
        let tag = self.tags.next();

        if let Some(len) = refused_literal {
            warn!(%tag, len, "search needs a literal the server does not accept");
            let (done, rx) = oneshot::channel();
            let _ = done.send(Err(Error::Protocol(format!(
                "search needs a {len}-byte non-synchronizing literal, server lacks LITERAL+"
            ))));
            return SearchHandle::new(tag, kind, rx);
        }

        let bytes = command.serialize(tag.as_str());
        let rx = self.pending.register(tag.clone(), kind);
        send(bytes);
        debug!(%tag, command = kind.as_str(), "search issued");

        SearchHandle::new(tag, kind, rx)
    }

    /// Decodes one complete response and applies it.
    ///
    /// Returns the decoded response so the caller can react to it (e.g.
    /// stop reading after `BYE`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the response is malformed. The ledger is
    /// left untouched in that case.
    pub fn handle_response(&self, input: &[u8]) -> Result<Response> {
        let response = ResponseParser::parse(input)?;
        trace!(?response, "response received");

        match &response {
            Response::Tagged { tag, status, text } => {
                if !self.pending.complete(tag, *status, text.clone()) {
                    trace!(%tag, "completion for a command that is not a search");
                }
            }
            Response::Untagged(untagged) => self.handle_untagged(untagged),
            Response::Continuation { .. } => {}
        }

        Ok(response)
    }

    fn handle_untagged(&self, untagged: &UntaggedResponse) {
        match untagged {
            UntaggedResponse::Search(nums) => {
                if !self.pending.accumulate(nums) {
                    warn!(count = nums.len(), "SEARCH response with no pending search");
                }
            }
            UntaggedResponse::ESearch(esearch) => {
                let correlator = esearch.correlator();
                if !self.pending.replace(correlator, esearch.data.clone()) {
                    warn!(tag = ?correlator, "ESEARCH response matches no pending search");
                }
            }
            UntaggedResponse::Capability(caps) => self.set_capabilities(caps.clone()),
            UntaggedResponse::Ok { text } | UntaggedResponse::PreAuth { text } => {
                if let Some(caps) = capability_code(text) {
                    self.set_capabilities(caps);
                }
            }
            UntaggedResponse::Bye { text } => {
                debug!(%text, "server sent BYE");
                self.pending.fail_all(|| Error::Bye(text.clone()));
            }
            UntaggedResponse::No { .. }
            | UntaggedResponse::Bad { .. }
            | UntaggedResponse::Numbered { .. }
            | UntaggedResponse::Other(_) => {}
        }
    }

    fn set_capabilities(&self, caps: Vec<Capability>) {
        *self
            .capabilities
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = caps;
    }

    /// Returns the capabilities the server last advertised.
    #[must_use]
    pub fn capabilities(&self) -> Vec<Capability> {
        self.capabilities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the ledger of searches in flight.
    #[must_use]
    pub const fn pending(&self) -> &PendingCommands {
        &self.pending
    }

    /// Fails every pending search with [`Error::ConnectionLost`]; searches
    /// issued afterwards fail immediately.
    pub fn close(&self) {
        self.pending.close();
    }
}

/// Extracts the list from a `[CAPABILITY ...]` response code.
fn capability_code(text: &str) -> Option<Vec<Capability>> {
    let rest = text.strip_prefix('[')?;
    let (code, _) = rest.split_once(']')?;
    let mut words = code.split_ascii_whitespace();
    if !words.next()?.eq_ignore_ascii_case("CAPABILITY") {
        return None;
    }
    Some(words.map(Capability::parse).collect())
}
