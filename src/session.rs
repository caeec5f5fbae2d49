//! The connection session: transport ownership, registration, channel join.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};
use trout_proto::{Message, ProtocolError, Transport, TransportReadError};

use crate::config::Config;
use crate::error::SessionError;

/// A registered connection to one server, joined to at most one channel.
///
/// The transport is either present (connected) or absent (closed), never
/// half-initialized: the registration burst goes out before `connect`
/// returns. A session is opened once and closed once; it is not reusable
/// after close.
pub struct Session<S> {
    nick: String,
    channel: String,
    read_timeout: Duration,
    transport: Option<Transport<S>>,
}

impl Session<TcpStream> {
    /// Open the transport and immediately send the identity announcement.
    ///
    /// Registration is not optional and not retried; any failure here is
    /// fatal to the session.
    pub async fn connect(config: &Config) -> Result<Self, SessionError> {
        let stream = TcpStream::connect((config.host.as_str(), config.port))
            .await
            .map_err(|e| SessionError::Connect(ProtocolError::Io(e)))?;
        info!(host = %config.host, port = config.port, "connected");

        let mut session = Session::with_transport(
            Transport::tcp(stream),
            &config.nickname,
            &config.channel,
            config.read_timeout,
        );
        session.register().await?;
        Ok(session)
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Build a session over an already-open transport.
    ///
    /// Callers must still send the registration burst via [`Self::register`].
    pub fn with_transport(
        transport: Transport<S>,
        nick: &str,
        channel: &str,
        read_timeout: Duration,
    ) -> Self {
        Self {
            nick: nick.to_owned(),
            channel: channel.to_owned(),
            read_timeout,
            transport: Some(transport),
        }
    }

    /// Nickname this session registered with.
    pub fn nickname(&self) -> &str {
        &self.nick
    }

    /// Send the identity announcement: NICK, then USER.
    pub async fn register(&mut self) -> Result<(), SessionError> {
        self.send_message(&Message::nick(self.nick.as_str()))
            .await
            .map_err(registration_fatal)?;
        self.send_message(&Message::user(self.nick.as_str(), self.nick.as_str()))
            .await
            .map_err(registration_fatal)?;
        info!(nick = %self.nick, "registration sent");
        Ok(())
    }

    /// Fire-and-forget join of the configured channel.
    ///
    /// The server's acknowledgment arrives asynchronously in the read loop;
    /// nothing waits for it.
    pub async fn join(&mut self) -> Result<(), SessionError> {
        let channel = self.channel.clone();
        info!(channel = %channel, "joining");
        self.send_message(&Message::join(channel)).await
    }

    /// Send one message.
    pub async fn send_message(&mut self, message: &Message) -> Result<(), SessionError> {
        let transport = self.transport.as_mut().ok_or_else(closed)?;
        transport
            .write_message(message)
            .await
            .map_err(SessionError::Disconnected)
    }

    /// Read the next message, waiting at most the configured deadline.
    ///
    /// A stalled or closed connection yields [`SessionError::Disconnected`];
    /// a line that does not parse yields [`SessionError::Malformed`], which
    /// callers skip.
    pub async fn read_message(&mut self) -> Result<Message, SessionError> {
        let deadline = self.read_timeout;
        let transport = self.transport.as_mut().ok_or_else(closed)?;
        match timeout(deadline, transport.read_message()).await {
            Ok(Ok(Some(msg))) => Ok(msg),
            Ok(Ok(None)) => Err(SessionError::Disconnected(eof())),
            Ok(Err(TransportReadError::Stream(e))) => Err(SessionError::Disconnected(e)),
            Ok(Err(TransportReadError::Parse(e))) => Err(SessionError::Malformed(e)),
            Err(_) => Err(SessionError::Disconnected(ProtocolError::Io(
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("no data from server within {:?}", deadline),
                ),
            ))),
        }
    }

    /// Close the session. Idempotent: closing an already-closed session is
    /// a no-op.
    pub async fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                debug!(error = %e, "error while closing transport");
            }
            info!("session closed");
        }
    }
}

fn closed() -> SessionError {
    SessionError::Disconnected(ProtocolError::Io(io::Error::new(
        io::ErrorKind::NotConnected,
        "session is closed",
    )))
}

fn eof() -> ProtocolError {
    ProtocolError::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "server closed the connection",
    ))
}

fn registration_fatal(err: SessionError) -> SessionError {
    match err {
        SessionError::Disconnected(e) => SessionError::Connect(e),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
    use trout_proto::Command;

    fn pair() -> (Session<DuplexStream>, DuplexStream) {
        let (client, server) = tokio::io::duplex(4096);
        let session = Session::with_transport(
            Transport::new(client),
            "troutbot",
            "#trout",
            Duration::from_secs(5),
        );
        (session, server)
    }

    async fn read_line(reader: &mut BufReader<tokio::io::ReadHalf<DuplexStream>>) -> String {
        let mut line = String::new();
        reader.read_line(&mut line).await.expect("read line");
        line
    }

    #[tokio::test]
    async fn test_register_sends_nick_then_user() {
        let (mut session, server) = pair();
        let (read_half, _write_half) = tokio::io::split(server);
        let mut reader = BufReader::new(read_half);

        session.register().await.expect("register");

        assert_eq!(read_line(&mut reader).await, "NICK troutbot\r\n");
        assert_eq!(read_line(&mut reader).await, "USER troutbot 0 * :troutbot\r\n");
    }

    #[tokio::test]
    async fn test_join_is_fire_and_forget() {
        let (mut session, server) = pair();
        let (read_half, _write_half) = tokio::io::split(server);
        let mut reader = BufReader::new(read_half);

        // No server traffic at all; join must not block on an acknowledgment.
        session.join().await.expect("join");
        assert_eq!(read_line(&mut reader).await, "JOIN #trout\r\n");
    }

    #[tokio::test]
    async fn test_read_message_parses() {
        let (mut session, server) = pair();
        let (_read_half, mut write_half) = tokio::io::split(server);

        write_half.write_all(b"PING :abc\r\n").await.unwrap();

        let msg = session.read_message().await.expect("read");
        assert_eq!(msg.command, Command::PING("abc".into(), None));
    }

    #[tokio::test]
    async fn test_malformed_line_is_recoverable() {
        let (mut session, server) = pair();
        let (_read_half, mut write_half) = tokio::io::split(server);

        write_half.write_all(b"\r\nPING :abc\r\n").await.unwrap();

        let err = session.read_message().await.unwrap_err();
        assert!(matches!(err, SessionError::Malformed(_)));
        assert!(!err.is_fatal());

        // The stream survives; the next line reads normally.
        let msg = session.read_message().await.expect("read after skip");
        assert_eq!(msg.command, Command::PING("abc".into(), None));
    }

    #[tokio::test]
    async fn test_eof_is_disconnected() {
        let (mut session, server) = pair();
        drop(server);

        let err = session.read_message().await.unwrap_err();
        assert!(matches!(err, SessionError::Disconnected(_)));
    }

    #[tokio::test]
    async fn test_silent_server_hits_read_deadline() {
        let (client, _server) = tokio::io::duplex(4096);
        let mut session = Session::with_transport(
            Transport::new(client),
            "troutbot",
            "#trout",
            Duration::from_millis(50),
        );

        let err = session.read_message().await.unwrap_err();
        match err {
            SessionError::Disconnected(ProtocolError::Io(e)) => {
                assert_eq!(e.kind(), io::ErrorKind::TimedOut);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (mut session, _server) = pair();
        session.close().await;
        session.close().await;

        // Operations after close fail with a disconnect, not a panic.
        let err = session.read_message().await.unwrap_err();
        assert!(matches!(err, SessionError::Disconnected(_)));
    }
}
