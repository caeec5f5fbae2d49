//! Configuration loading and management.
//!
//! Settings come from an optional TOML file merged with command-line
//! flags; flags win. The server host is the only setting without a
//! default - a missing host is reported before any connection attempt.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

/// The protocol's conventional plaintext port.
pub const DEFAULT_PORT: u16 = 6667;
/// Default nickname when neither file nor flags set one.
pub const DEFAULT_NICKNAME: &str = "troutbot";
/// Default channel to join.
pub const DEFAULT_CHANNEL: &str = "#trout";
/// Default greeting reply.
pub const DEFAULT_GREETING: &str = "Hello there!";
/// Default read deadline in seconds before a silent server counts as gone.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 300;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no server host configured (pass --host or set `host` in the config file)")]
    MissingHost,
}

/// Command-line arguments.
#[derive(Debug, Default, Parser)]
#[command(name = "troutbot", version, about = "A small IRC channel bot")]
pub struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Server hostname or address.
    #[arg(long)]
    pub host: Option<String>,
    /// Server port.
    #[arg(long)]
    pub port: Option<u16>,
    /// Nickname to register with.
    #[arg(long = "name")]
    pub nickname: Option<String>,
    /// Channel to join after registering.
    #[arg(long)]
    pub channel: Option<String>,
}

/// Raw shape of the TOML configuration file. All fields optional;
/// defaults are applied during the merge.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    nickname: Option<String>,
    channel: Option<String>,
    greeting: Option<String>,
    responses: Option<Vec<String>>,
    users: Option<Vec<String>>,
    read_timeout_secs: Option<u64>,
}

impl FileConfig {
    fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Resolved bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server hostname or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Nickname to register with.
    pub nickname: String,
    /// Channel to join after registering.
    pub channel: String,
    /// Fixed greeting reply text.
    pub greeting: String,
    /// Canned replies for direct messages; `None` keeps the built-in set.
    pub responses: Option<Vec<String>>,
    /// Nicknames seeding the placeholder channel roster.
    pub users: Vec<String>,
    /// Read deadline before a silent server counts as disconnected.
    pub read_timeout: Duration,
}

impl Config {
    /// Load the config file named on the command line (if any) and merge
    /// it with the flags. Flags beat file values beat defaults.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let host = cli
            .host
            .clone()
            .or(file.host)
            .ok_or(ConfigError::MissingHost)?;

        Ok(Config {
            host,
            port: cli.port.or(file.port).unwrap_or(DEFAULT_PORT),
            nickname: cli
                .nickname
                .clone()
                .or(file.nickname)
                .unwrap_or_else(|| DEFAULT_NICKNAME.to_string()),
            channel: cli
                .channel
                .clone()
                .or(file.channel)
                .unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
            greeting: file
                .greeting
                .unwrap_or_else(|| DEFAULT_GREETING.to_string()),
            responses: file.responses,
            users: file.users.unwrap_or_default(),
            read_timeout: Duration::from_secs(
                file.read_timeout_secs.unwrap_or(DEFAULT_READ_TIMEOUT_SECS),
            ),
        })
    }
}
