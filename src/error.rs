//! Unified error handling for troutbot.
//!
//! The taxonomy is small: two errors fatal to a session, one recoverable
//! parse failure, and one router-local condition that never escapes as a
//! fault.

use thiserror::Error;
use trout_proto::ProtocolError;

/// Errors raised by a connection session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Opening the transport, or the registration burst sent immediately
    /// after, failed. The session never became usable.
    #[error("connection failed: {0}")]
    Connect(#[source] ProtocolError),

    /// The transport failed, the server closed the connection, or the read
    /// deadline expired after a successful connect. Fatal to the session;
    /// there is no automatic reconnect.
    #[error("disconnected: {0}")]
    Disconnected(#[source] ProtocolError),

    /// A line arrived that does not parse as an IRC message. Recoverable:
    /// callers skip the line and keep reading.
    #[error("malformed line: {0}")]
    Malformed(#[source] ProtocolError),
}

impl SessionError {
    /// Whether this error ends the session.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Malformed(_))
    }
}

/// Victim resolution ran against an empty candidate set.
///
/// Converted by the router into an informational reply; never propagated.
#[derive(Debug, Error)]
#[error("no slap target available")]
pub struct NoTargetAvailable;
