//! Framed IRC transport over a stream.
//!
//! The transport owns the stream and the codec. It is generic over the
//! underlying stream so tests can drive it with in-memory pipes; production
//! code wraps a [`TcpStream`] via [`Transport::tcp`].

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::warn;

use crate::error::ProtocolError;
use crate::irc::IrcCodec;
use crate::message::Message;

/// Errors produced while reading from a [`Transport`].
#[derive(Debug, Error)]
pub enum TransportReadError {
    /// The underlying stream failed or produced undecodable framing.
    /// The transport is no longer usable.
    #[error("transport error: {0}")]
    Stream(#[source] ProtocolError),

    /// A decoded line failed to parse as an IRC message. The stream itself
    /// is still usable; callers may skip the line and keep reading.
    #[error("{0}")]
    Parse(#[source] ProtocolError),
}

/// IRC transport over a stream-oriented connection.
pub struct Transport<S> {
    framed: Framed<S, IrcCodec>,
}

impl Transport<TcpStream> {
    /// Create a new transport from a connected TCP stream.
    ///
    /// Enables TCP keepalive so a dead peer is eventually detected at the
    /// socket layer as well.
    pub fn tcp(stream: TcpStream) -> Self {
        if let Err(e) = Self::enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }
        Self::new(stream)
    }

    fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
        use socket2::{SockRef, TcpKeepalive};
        use std::time::Duration;

        let sock = SockRef::from(stream);
        let keepalive = TcpKeepalive::new()
            .with_time(Duration::from_secs(120))
            .with_interval(Duration::from_secs(30));

        sock.set_tcp_keepalive(&keepalive)?;
        Ok(())
    }
}

impl<S> Transport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create a new transport from any stream.
    pub fn new(stream: S) -> Self {
        Self {
            framed: Framed::new(stream, IrcCodec::new()),
        }
    }

    /// Read the next IRC message from the transport.
    ///
    /// Returns `Ok(None)` when the connection is closed.
    pub async fn read_message(&mut self) -> Result<Option<Message>, TransportReadError> {
        match self.framed.next().await {
            Some(Ok(line)) => line
                .parse::<Message>()
                .map(Some)
                .map_err(TransportReadError::Parse),
            Some(Err(e)) => Err(TransportReadError::Stream(e)),
            None => Ok(None),
        }
    }

    /// Write an IRC message to the transport.
    pub async fn write_message(&mut self, message: &Message) -> Result<(), ProtocolError> {
        self.framed.send(message.clone()).await
    }

    /// Flush any buffered output and shut the stream down.
    pub async fn close(&mut self) -> Result<(), ProtocolError> {
        self.framed.close().await
    }
}
