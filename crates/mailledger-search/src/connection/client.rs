//! Search client over a live connection.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::config::Config;
use super::framed::FramedStream;
use crate::command::{SearchCriteria, SearchOptions};
use crate::parser::{Response, UntaggedResponse};
use crate::protocol::Protocol;
use crate::search::SearchHandle;
use crate::types::Capability;
use crate::{Error, Result};

/// IMAP search client.
///
/// Owns two background tasks: one writes commands in the order they were
/// issued, the other reads and applies responses in the order they arrive.
/// Issuing a search never waits on the network; the returned
/// [`SearchHandle`] resolves when the server completes it.
///
/// Dropping the client (or calling [`close`](Self::close)) tears the
/// connection down, and every outstanding handle resolves to
/// [`Error::ConnectionLost`].
#[derive(Debug)]
pub struct Client {
    protocol: Arc<Protocol>,
    commands: mpsc::UnboundedSender<Vec<u8>>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl Client {
    /// Starts a client on an established (and, if needed, authenticated
    /// and selected) connection.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new<S>(stream: S, config: &Config) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let protocol = Arc::new(Protocol::with_tag_prefix(config.tag_prefix));
        let (read_half, write_half) = tokio::io::split(stream);
        let (commands, queue) = mpsc::unbounded_channel();

        let reader = tokio::spawn(read_loop(
            FramedStream::new(read_half, config),
            Arc::clone(&protocol),
        ));
        let writer = tokio::spawn(write_loop(write_half, queue, Arc::clone(&protocol)));

        Self {
            protocol,
            commands,
            reader,
            writer,
        }
    }

    /// Sends a SEARCH command. Results are message sequence numbers.
    pub fn search(&self, criteria: SearchCriteria, options: SearchOptions) -> SearchHandle {
        self.issue(criteria, options, false)
    }

    /// Sends a UID SEARCH command. Results are UIDs.
    pub fn uid_search(&self, criteria: SearchCriteria, options: SearchOptions) -> SearchHandle {
        self.issue(criteria, options, true)
    }

    fn issue(&self, criteria: SearchCriteria, options: SearchOptions, uid: bool) -> SearchHandle {
        self.protocol
            .issue_search_with(criteria, options, uid, |bytes| {
                if self.commands.send(bytes).is_err() {
                    // The writer only stops after closing the ledger, so the
                    // handle has already been failed.
                    trace!("writer gone, command dropped");
                }
            })
    }

    /// Returns the capabilities the server last advertised, either in a
    /// `CAPABILITY` response or a `[CAPABILITY ...]` response code.
    #[must_use]
    pub fn capabilities(&self) -> Vec<Capability> {
        self.protocol.capabilities()
    }

    /// Returns `true` once the connection has been torn down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.protocol.pending().is_closed()
    }

    /// Tears the connection down.
    ///
    /// Outstanding searches resolve to [`Error::ConnectionLost`]; searches
    /// issued afterwards resolve to it immediately.
    pub fn close(&self) {
        self.protocol.close();
        self.reader.abort();
        self.writer.abort();
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}

async fn read_loop<R>(mut framed: FramedStream<R>, protocol: Arc<Protocol>)
where
    R: AsyncRead + Unpin,
{
    loop {
        let response = match framed.read_response().await {
            Ok(response) => response,
            Err(Error::Io(e)) => {
                debug!(error = %e, "connection closed by server");
                break;
            }
            Err(e) => {
                warn!(error = %e, "unrecoverable framing error");
                break;
            }
        };

        match protocol.handle_response(&response) {
            Ok(Response::Untagged(UntaggedResponse::Bye { .. })) => {
                debug!("server said BYE, waiting for close");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(
                    error = %e,
                    response = %String::from_utf8_lossy(&response).trim_end(),
                    "skipping malformed response"
                );
            }
        }
    }

    protocol.close();
}

async fn write_loop<W>(
    mut writer: W,
    mut queue: mpsc::UnboundedReceiver<Vec<u8>>,
    protocol: Arc<Protocol>,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(bytes) = queue.recv().await {
        if let Err(e) = write_command(&mut writer, &bytes).await {
            warn!(error = %e, "failed to send command");
            break;
        }
    }

    protocol.close();
}

async fn write_command<W>(writer: &mut W, bytes: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(bytes).await?;
    writer.flush().await?;
    Ok(())
}
