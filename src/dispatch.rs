//! The main read loop.
//!
//! One suspension point (the session read); every inbound line is fully
//! handled - keep-alive answered, routed, replies sent - before the next
//! line is read.

use std::io;

use rand::Rng;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};
use trout_proto::{Command, Message, ProtocolError};

use crate::error::SessionError;
use crate::router::Router;
use crate::session::Session;

/// Join the configured channel, then read and handle lines until the
/// session fails.
///
/// Never returns under normal operation; the `Ok` arm exists only to
/// satisfy the signature.
pub async fn run<S, R>(
    session: &mut Session<S>,
    router: &mut Router<R>,
) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    R: Rng,
{
    session.join().await?;

    loop {
        let msg = match session.read_message().await {
            Ok(msg) => msg,
            Err(err) if !err.is_fatal() => {
                warn!(error = %err, "skipping unparsable line");
                continue;
            }
            Err(err) => return Err(err),
        };

        // The liveness probe is answered before any other processing of
        // the line; missing the server's window ends the connection.
        match &msg.command {
            Command::PING(token, _) => {
                session.send_message(&Message::pong(token.as_str())).await?;
                continue;
            }
            Command::ERROR(reason) => {
                info!(reason = %reason, "server terminated the session");
                return Err(SessionError::Disconnected(ProtocolError::Io(
                    io::Error::new(io::ErrorKind::ConnectionReset, reason.clone()),
                )));
            }
            Command::Response(1, _) => {
                info!("registration confirmed by server");
            }
            _ => {}
        }

        for outbound in router.route(&msg) {
            debug!(target = %outbound.target, "sending reply");
            session.send_message(&outbound.into_message()).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ResponseCatalog;
    use crate::roster::ChannelRoster;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
    use trout_proto::Transport;

    fn spawn_bot(
        users: &[&str],
    ) -> (
        tokio::task::JoinHandle<Result<(), SessionError>>,
        DuplexStream,
    ) {
        let (client, server) = tokio::io::duplex(4096);
        let mut session = Session::with_transport(
            Transport::new(client),
            "troutbot",
            "#test",
            Duration::from_secs(5),
        );
        let mut router = Router::new(
            "troutbot".to_string(),
            "Hello there!".to_string(),
            ResponseCatalog::new(vec!["fixed reply".to_string()]),
            ChannelRoster::new(users.iter().map(|s| s.to_string()).collect()),
            StdRng::seed_from_u64(42),
        );
        let handle = tokio::spawn(async move { run(&mut session, &mut router).await });
        (handle, server)
    }

    async fn read_line(reader: &mut BufReader<tokio::io::ReadHalf<DuplexStream>>) -> String {
        let mut line = String::new();
        reader.read_line(&mut line).await.expect("read line");
        line
    }

    #[tokio::test]
    async fn test_joins_then_greets() {
        let (handle, server) = spawn_bot(&[]);
        let (read_half, mut write_half) = tokio::io::split(server);
        let mut reader = BufReader::new(read_half);

        assert_eq!(read_line(&mut reader).await, "JOIN #test\r\n");

        write_half
            .write_all(b":bob!b@h PRIVMSG #test :!hello\r\n")
            .await
            .unwrap();
        assert_eq!(
            read_line(&mut reader).await,
            "PRIVMSG #test :Hello there!\r\n"
        );

        drop(write_half);
        drop(reader);
        let result = handle.await.expect("task");
        assert!(matches!(result, Err(SessionError::Disconnected(_))));
    }

    #[tokio::test]
    async fn test_pong_precedes_other_replies() {
        let (handle, server) = spawn_bot(&[]);
        let (read_half, mut write_half) = tokio::io::split(server);
        let mut reader = BufReader::new(read_half);

        assert_eq!(read_line(&mut reader).await, "JOIN #test\r\n");

        // Both lines arrive in one read; the keep-alive answer must come
        // out before the greeting for the following line.
        write_half
            .write_all(b"PING :abc\r\n:bob!b@h PRIVMSG #test :!hello\r\n")
            .await
            .unwrap();

        assert_eq!(read_line(&mut reader).await, "PONG abc\r\n");
        assert_eq!(
            read_line(&mut reader).await,
            "PRIVMSG #test :Hello there!\r\n"
        );

        drop(write_half);
        drop(reader);
        let _ = handle.await.expect("task");
    }

    #[tokio::test]
    async fn test_malformed_line_skipped_loop_continues() {
        let (handle, server) = spawn_bot(&[]);
        let (read_half, mut write_half) = tokio::io::split(server);
        let mut reader = BufReader::new(read_half);

        assert_eq!(read_line(&mut reader).await, "JOIN #test\r\n");

        write_half
            .write_all(b"\r\n:bob!b@h PRIVMSG #test :!hello\r\n")
            .await
            .unwrap();
        assert_eq!(
            read_line(&mut reader).await,
            "PRIVMSG #test :Hello there!\r\n"
        );

        drop(write_half);
        drop(reader);
        let _ = handle.await.expect("task");
    }

    #[tokio::test]
    async fn test_server_error_line_ends_loop() {
        let (handle, server) = spawn_bot(&[]);
        let (read_half, mut write_half) = tokio::io::split(server);
        let mut reader = BufReader::new(read_half);

        assert_eq!(read_line(&mut reader).await, "JOIN #test\r\n");

        write_half
            .write_all(b"ERROR :Closing Link\r\n")
            .await
            .unwrap();

        let result = handle.await.expect("task");
        assert!(matches!(result, Err(SessionError::Disconnected(_))));
    }

    #[tokio::test]
    async fn test_slap_flow_end_to_end() {
        let (handle, server) = spawn_bot(&["alice"]);
        let (read_half, mut write_half) = tokio::io::split(server);
        let mut reader = BufReader::new(read_half);

        assert_eq!(read_line(&mut reader).await, "JOIN #test\r\n");

        write_half
            .write_all(b":bob!b@h PRIVMSG #test :!slap\r\n")
            .await
            .unwrap();
        assert_eq!(
            read_line(&mut reader).await,
            "PRIVMSG #test :@alice just got slapped with a trout!\r\n"
        );

        drop(write_half);
        drop(reader);
        let _ = handle.await.expect("task");
    }
}
