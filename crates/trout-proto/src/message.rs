//! The owned IRC message type and its parser.
//!
//! A message is one protocol line: an optional prefix identifying the
//! origin, a command, and its parameters. Parsing follows RFC 2812: a
//! leading `:`-token is the prefix, the next token the command, and the
//! remaining whitespace-delimited tokens are parameters until one starts
//! with `:` - that token, colon stripped, plus everything after it verbatim
//! is the trailing parameter.

use std::fmt;
use std::str::FromStr;

use crate::chan::ChannelExt;
use crate::command::Command;
use crate::error::{MessageParseError, ProtocolError};
use crate::prefix::Prefix;

/// An owned IRC message.
///
/// # Example
///
/// ```
/// use trout_proto::Message;
///
/// // Parse a message
/// let msg: Message = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
///
/// // Construct a message
/// let msg = Message::privmsg("#channel", "Hello!");
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct Message {
    /// Message prefix/source (e.g., `nick!user@host`).
    pub prefix: Option<Prefix>,
    /// The IRC command and its parameters.
    pub command: Command,
}

impl Message {
    /// Get the nickname from the message prefix, if present.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }

    /// Get the appropriate target for a response.
    ///
    /// For channel messages, returns the channel name.
    /// For private messages, returns the sender's nickname.
    pub fn response_target(&self) -> Option<&str> {
        match self.command {
            Command::PRIVMSG(ref target, _) if target.is_channel_name() => Some(target),
            Command::NOTICE(ref target, _) if target.is_channel_name() => Some(target),
            _ => self.source_nickname(),
        }
    }

    /// Create a PRIVMSG message to a target with text
    #[must_use]
    pub fn privmsg<T, M>(target: T, text: M) -> Self
    where
        T: Into<String>,
        M: Into<String>,
    {
        Command::PRIVMSG(target.into(), text.into()).into()
    }

    /// Create a NOTICE message to a target with text
    #[must_use]
    pub fn notice<T, M>(target: T, text: M) -> Self
    where
        T: Into<String>,
        M: Into<String>,
    {
        Command::NOTICE(target.into(), text.into()).into()
    }

    /// Create a JOIN message for a channel
    #[must_use]
    pub fn join<C>(channel: C) -> Self
    where
        C: Into<String>,
    {
        Command::JOIN(channel.into()).into()
    }

    /// Create a NICK message to set the nickname
    #[must_use]
    pub fn nick<N>(nickname: N) -> Self
    where
        N: Into<String>,
    {
        Command::NICK(nickname.into()).into()
    }

    /// Create a USER message for registration
    #[must_use]
    pub fn user<U, R>(username: U, realname: R) -> Self
    where
        U: Into<String>,
        R: Into<String>,
    {
        Command::USER(username.into(), "0".into(), realname.into()).into()
    }

    /// Create a PING message to a server
    #[must_use]
    pub fn ping<S>(server: S) -> Self
    where
        S: Into<String>,
    {
        Command::PING(server.into(), None).into()
    }

    /// Create a PONG message in response to a PING, echoing its token
    #[must_use]
    pub fn pong<S>(token: S) -> Self
    where
        S: Into<String>,
    {
        Command::PONG(token.into(), None).into()
    }

    /// Create a QUIT message
    #[must_use]
    pub fn quit() -> Self {
        Command::QUIT(None).into()
    }

    /// Create a QUIT message with a quit message
    #[must_use]
    pub fn quit_with_message<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Command::QUIT(Some(message.into())).into()
    }

    /// Set the prefix/source of this message
    #[must_use]
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }
}

impl From<Command> for Message {
    fn from(cmd: Command) -> Message {
        Message {
            prefix: None,
            command: cmd,
        }
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let line = s.trim_end_matches(&['\r', '\n'][..]);

        let invalid = |cause: MessageParseError| ProtocolError::InvalidMessage {
            string: line.to_owned(),
            cause,
        };

        let mut rest = line.trim_start();
        if rest.is_empty() {
            return Err(invalid(MessageParseError::EmptyMessage));
        }

        // Skip IRCv3 tags if a server sends them; the bot ignores tags.
        if rest.starts_with('@') {
            let (_, r) = rest
                .split_once(' ')
                .ok_or_else(|| invalid(MessageParseError::InvalidCommand))?;
            rest = r.trim_start();
        }

        let prefix = if let Some(stripped) = rest.strip_prefix(':') {
            let (p, r) = stripped
                .split_once(' ')
                .ok_or_else(|| invalid(MessageParseError::InvalidCommand))?;
            rest = r.trim_start();
            Some(Prefix::new_from_str(p))
        } else {
            None
        };

        let (cmd, mut rest) = match rest.split_once(' ') {
            Some((c, r)) => (c, r),
            None => (rest, ""),
        };

        let mut args: Vec<String> = Vec::new();
        while !rest.is_empty() {
            if let Some(trailing) = rest.strip_prefix(':') {
                args.push(trailing.to_owned());
                break;
            }
            match rest.split_once(' ') {
                Some((token, r)) => {
                    if !token.is_empty() {
                        args.push(token.to_owned());
                    }
                    rest = r;
                }
                None => {
                    args.push(rest.to_owned());
                    rest = "";
                }
            }
        }

        let command = Command::new(cmd, args).map_err(invalid)?;
        Ok(Message { prefix, command })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write!(f, "{}\r\n", self.command)
    }
}
