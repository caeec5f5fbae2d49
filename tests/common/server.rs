//! Fake server management.
//!
//! Binds an in-process listener playing the server side of the protocol
//! and spawns the compiled bot binary against it.

use std::process::{Child, Command, ExitStatus};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::time::{sleep, timeout};

/// An in-process endpoint standing in for the IRC server.
pub struct FakeServer {
    listener: TcpListener,
}

impl FakeServer {
    /// Bind to an ephemeral port on the loopback interface.
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener })
    }

    /// The port the server listens on.
    pub fn port(&self) -> u16 {
        self.listener
            .local_addr()
            .expect("listener has a local addr")
            .port()
    }

    /// Wait for the bot to connect.
    pub async fn accept(&self) -> anyhow::Result<BotConn> {
        let (stream, _addr) = timeout(Duration::from_secs(10), self.listener.accept()).await??;
        let (read_half, write_half) = stream.into_split();
        Ok(BotConn {
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }
}

/// The server side of one accepted bot connection.
pub struct BotConn {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl BotConn {
    /// Receive one line from the bot, stripped of its terminator.
    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(Duration::from_secs(5), self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("bot closed the connection");
        }
        Ok(line.trim_end().to_string())
    }

    /// Send one raw protocol line to the bot.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }
}

/// A spawned bot process.
pub struct BotProcess {
    child: Child,
}

impl BotProcess {
    /// Spawn the compiled bot binary with the given arguments.
    pub fn spawn(args: &[&str]) -> anyhow::Result<Self> {
        let child = Command::new(env!("CARGO_BIN_EXE_troutbot"))
            .args(args)
            .spawn()?;
        Ok(Self { child })
    }

    /// Wait for the process to exit, polling up to the given duration.
    pub async fn wait(mut self, max: Duration) -> anyhow::Result<ExitStatus> {
        let deadline = tokio::time::Instant::now() + max;
        loop {
            if let Some(status) = self.child.try_wait()? {
                return Ok(status);
            }
            if tokio::time::Instant::now() >= deadline {
                anyhow::bail!("bot did not exit within {:?}", max);
            }
            sleep(Duration::from_millis(50)).await;
        }
    }
}

impl Drop for BotProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
