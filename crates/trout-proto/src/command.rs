//! IRC command types.
//!
//! This module provides type-safe representations of the IRC commands the
//! bot sends or reacts to, as defined in RFC 2812. Anything else is captured
//! verbatim in the `Raw` variant so unknown server traffic still parses.

use std::fmt;

use crate::error::MessageParseError;

/// IRC command with its parameters.
///
/// Numeric replies are captured as [`Command::Response`]; unknown commands
/// as [`Command::Raw`].
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Command {
    /// `NICK nickname`
    NICK(String),
    /// `USER username mode realname`
    USER(String, String, String),
    /// `JOIN channel`
    JOIN(String),
    /// `PART channel [message]`
    PART(String, Option<String>),
    /// `PRIVMSG target text`
    PRIVMSG(String, String),
    /// `NOTICE target text`
    NOTICE(String, String),
    /// `PING token [server2]`
    PING(String, Option<String>),
    /// `PONG token [server2]`
    PONG(String, Option<String>),
    /// `QUIT [message]`
    QUIT(Option<String>),
    /// `ERROR message` - the server is terminating the connection
    ERROR(String),
    /// Numeric reply (e.g. `001`) with its arguments
    Response(u16, Vec<String>),
    /// Any other command, kept verbatim
    Raw(String, Vec<String>),
}

impl Command {
    /// Classify a tokenized line into a typed command.
    ///
    /// `cmd` is the command token; `args` are the parameters, with any
    /// trailing parameter already joined as the final element.
    pub fn new(cmd: &str, mut args: Vec<String>) -> Result<Command, MessageParseError> {
        if cmd.is_empty() {
            return Err(MessageParseError::InvalidCommand);
        }

        if cmd.len() == 3 && cmd.bytes().all(|b| b.is_ascii_digit()) {
            // Numeric replies always parse; their arity varies by server.
            let code = cmd.parse::<u16>().map_err(|_| MessageParseError::InvalidCommand)?;
            return Ok(Command::Response(code, args));
        }

        let command = match cmd.to_ascii_uppercase().as_str() {
            "NICK" => {
                check_arity(&args, 1)?;
                Command::NICK(args.swap_remove(0))
            }
            "USER" => {
                // `USER guest 0 * :Real Name` - the unused `*` is dropped.
                check_arity(&args, 4)?;
                let realname = args.swap_remove(3);
                let mode = args.swap_remove(1);
                Command::USER(args.swap_remove(0), mode, realname)
            }
            "JOIN" => {
                check_arity(&args, 1)?;
                Command::JOIN(args.swap_remove(0))
            }
            "PART" => {
                check_arity(&args, 1)?;
                let channel = args.remove(0);
                Command::PART(channel, args.into_iter().next())
            }
            "PRIVMSG" => {
                check_arity(&args, 2)?;
                let target = args.remove(0);
                Command::PRIVMSG(target, args.remove(0))
            }
            "NOTICE" => {
                check_arity(&args, 2)?;
                let target = args.remove(0);
                Command::NOTICE(target, args.remove(0))
            }
            "PING" => {
                check_arity(&args, 1)?;
                let token = args.remove(0);
                Command::PING(token, args.into_iter().next())
            }
            "PONG" => {
                check_arity(&args, 1)?;
                let token = args.remove(0);
                Command::PONG(token, args.into_iter().next())
            }
            "QUIT" => Command::QUIT(args.into_iter().next()),
            "ERROR" => {
                check_arity(&args, 1)?;
                Command::ERROR(args.swap_remove(0))
            }
            _ => Command::Raw(cmd.to_owned(), args),
        };
        Ok(command)
    }

    /// The wire name of this command.
    pub fn name(&self) -> &str {
        match self {
            Command::NICK(_) => "NICK",
            Command::USER(..) => "USER",
            Command::JOIN(_) => "JOIN",
            Command::PART(..) => "PART",
            Command::PRIVMSG(..) => "PRIVMSG",
            Command::NOTICE(..) => "NOTICE",
            Command::PING(..) => "PING",
            Command::PONG(..) => "PONG",
            Command::QUIT(_) => "QUIT",
            Command::ERROR(_) => "ERROR",
            Command::Response(..) => "Response",
            Command::Raw(cmd, _) => cmd,
        }
    }
}

/// Fail with the expected arity when too few arguments are present.
fn check_arity(args: &[String], expected: usize) -> Result<(), MessageParseError> {
    if args.len() < expected {
        Err(MessageParseError::NotEnoughArguments {
            expected,
            got: args.len(),
        })
    } else {
        Ok(())
    }
}

/// Add colon prefix if trailing is empty, contains a space, or starts with ':'
fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.starts_with(':')
}

/// Write a command whose trailing argument is colon-prefixed only when needed.
fn write_cmd(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    let Some((trailing, middle)) = args.split_last() else {
        return f.write_str(cmd);
    };

    f.write_str(cmd)?;
    for param in middle {
        write!(f, " {}", param)?;
    }
    if needs_colon_prefix(trailing) {
        write!(f, " :{}", trailing)
    } else {
        write!(f, " {}", trailing)
    }
}

/// Write a command with a freeform (always colon-prefixed) trailing argument.
fn write_cmd_freeform(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    match args.split_last() {
        Some((trailing, middle)) => {
            f.write_str(cmd)?;
            for param in middle {
                write!(f, " {}", param)?;
            }
            write!(f, " :{}", trailing)
        }
        None => f.write_str(cmd),
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::NICK(n) => write_cmd(f, "NICK", &[n]),
            Command::USER(u, m, r) => write_cmd_freeform(f, "USER", &[u, m, "*", r]),
            Command::JOIN(c) => write_cmd(f, "JOIN", &[c]),
            Command::PART(c, Some(m)) => write_cmd_freeform(f, "PART", &[c, m]),
            Command::PART(c, None) => write_cmd(f, "PART", &[c]),
            Command::PRIVMSG(t, m) => write_cmd_freeform(f, "PRIVMSG", &[t, m]),
            Command::NOTICE(t, m) => write_cmd_freeform(f, "NOTICE", &[t, m]),
            Command::PING(t, Some(s)) => write_cmd(f, "PING", &[t, s]),
            Command::PING(t, None) => write_cmd(f, "PING", &[t]),
            Command::PONG(t, Some(s)) => write_cmd(f, "PONG", &[t, s]),
            Command::PONG(t, None) => write_cmd(f, "PONG", &[t]),
            Command::QUIT(Some(m)) => write_cmd_freeform(f, "QUIT", &[m]),
            Command::QUIT(None) => f.write_str("QUIT"),
            Command::ERROR(m) => write_cmd_freeform(f, "ERROR", &[m]),
            Command::Response(code, args) => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                write_cmd(f, &format!("{:03}", code), &args)
            }
            Command::Raw(cmd, args) => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                write_cmd(f, cmd, &args)
            }
        }
    }
}
