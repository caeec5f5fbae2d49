//! # trout-proto
//!
//! The IRC protocol subset spoken by troutbot: message parsing and
//! serialization plus an optional Tokio framed transport.
//!
//! This is a client-side library and deliberately small. It models the
//! commands the bot sends or reacts to; everything else still parses,
//! as a numeric [`Command::Response`] or a [`Command::Raw`] line.
//!
//! ## Quick Start
//!
//! ### Creating IRC messages
//!
//! ```rust
//! use trout_proto::Message;
//!
//! let privmsg = Message::privmsg("#rust", "Hello, world!");
//! let join = Message::join("#channel");
//!
//! println!("{}", privmsg); // Serializes to IRC protocol format
//! ```
//!
//! ### Parsing IRC messages
//!
//! ```rust
//! use trout_proto::Message;
//!
//! let raw = ":nick!user@host PRIVMSG #channel :Hello!";
//! let message: Message = raw.parse().expect("Valid IRC message");
//!
//! assert_eq!(message.source_nickname(), Some("nick"));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

/// Maximum length of an IRC line, per RFC 2812.
pub const MAX_IRC_LINE_LEN: usize = 512;

pub mod chan;
pub mod command;
pub mod error;
#[cfg(feature = "tokio")]
pub mod irc;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod prefix;

pub use self::chan::ChannelExt;
pub use self::command::Command;
pub use self::error::{MessageParseError, ProtocolError};
pub use self::message::Message;
pub use self::prefix::Prefix;

#[cfg(feature = "tokio")]
pub use self::irc::IrcCodec;
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;

#[cfg(feature = "tokio")]
pub mod transport;
#[cfg(feature = "tokio")]
pub use self::transport::{Transport, TransportReadError};
