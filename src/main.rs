//! troutbot - a small IRC channel bot.
//!
//! Connects to one server, joins one channel, and answers a handful of
//! text triggers with canned replies and the occasional trout.

mod catalog;
mod config;
mod dispatch;
mod error;
mod roster;
mod router;
mod session;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use trout_proto::Message;

use crate::catalog::ResponseCatalog;
use crate::config::{Cli, Config};
use crate::roster::ChannelRoster;
use crate::router::Router;
use crate::session::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli).map_err(|e| {
        error!(error = %e, "failed to load config");
        e
    })?;

    info!(
        host = %config.host,
        port = config.port,
        nick = %config.nickname,
        channel = %config.channel,
        "starting troutbot"
    );

    let catalog = match config.responses.clone() {
        Some(responses) => ResponseCatalog::new(responses),
        None => ResponseCatalog::default(),
    };
    if catalog.is_empty() {
        warn!("response catalog is empty; direct messages will get no reply");
    }
    let roster = ChannelRoster::new(config.users.clone());
    if roster.is_empty() {
        warn!("channel roster is empty; slaps without a target will find no one");
    } else {
        info!(
            users = roster.len(),
            replies = catalog.len(),
            "collaborators loaded"
        );
    }

    let mut router = Router::new(
        config.nickname.clone(),
        config.greeting.clone(),
        catalog,
        roster,
        StdRng::from_entropy(),
    );

    let mut session = Session::connect(&config).await?;

    let outcome = tokio::select! {
        res = dispatch::run(&mut session, &mut router) => Some(res),
        _ = tokio::signal::ctrl_c() => None,
    };

    match outcome {
        Some(result) => {
            // Fatal session failure; release the transport before exiting.
            session.close().await;
            result?;
        }
        None => {
            info!(nick = %session.nickname(), "interrupt received, shutting down");
            let _ = session
                .send_message(&Message::quit_with_message("caught interrupt"))
                .await;
            session.close().await;
        }
    }

    Ok(())
}
