//! Message routing: classify incoming lines and produce replies.
//!
//! The router owns an ordered trigger table. Matching is substring-based
//! over the message body and the first matching trigger wins, so table
//! order is the priority order: greeting before help before slap, with the
//! direct-address catalog reply as the fallback when nothing matched.

use rand::Rng;
use tracing::debug;
use trout_proto::{Command, Message};

use crate::catalog::ResponseCatalog;
use crate::error::NoTargetAvailable;
use crate::roster::ChannelRoster;

/// One reply produced by the router, consumed immediately by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    /// Channel or nickname the reply goes to.
    pub target: String,
    /// Reply text.
    pub text: String,
}

impl Outbound {
    /// Render as a PRIVMSG wire message.
    pub fn into_message(self) -> Message {
        Message::privmsg(self.target, self.text)
    }
}

/// A decoded incoming channel or direct message.
struct Incoming<'a> {
    sender: Option<&'a str>,
    reply_to: &'a str,
    body: &'a str,
}

/// One row of the trigger table.
struct Entry<R: Rng> {
    token: &'static str,
    respond: fn(&mut Router<R>, &Incoming<'_>) -> Option<Outbound>,
}

impl<R: Rng> Clone for Entry<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Rng> Copy for Entry<R> {}

/// Routes parsed messages to responders.
pub struct Router<R: Rng> {
    nick: String,
    greeting: String,
    catalog: ResponseCatalog,
    roster: ChannelRoster,
    rng: R,
    entries: Vec<Entry<R>>,
}

impl<R: Rng> Router<R> {
    /// Build a router for the given bot identity and collaborators.
    pub fn new(
        nick: String,
        greeting: String,
        catalog: ResponseCatalog,
        roster: ChannelRoster,
        rng: R,
    ) -> Self {
        Self {
            nick,
            greeting,
            catalog,
            roster,
            rng,
            entries: vec![
                Entry {
                    token: "!hello",
                    respond: Self::greet,
                },
                Entry {
                    token: "!help",
                    respond: Self::help,
                },
                Entry {
                    token: "!slap",
                    respond: Self::slap,
                },
            ],
        }
    }

    /// Route one message; returns the replies to send, in order.
    ///
    /// Only PRIVMSG lines produce replies. Exactly one outcome applies:
    /// the first trigger whose token occurs in the body, the catalog
    /// fallback for messages addressed directly to the bot, or nothing.
    pub fn route(&mut self, msg: &Message) -> Vec<Outbound> {
        let Command::PRIVMSG(ref target, ref body) = msg.command else {
            return Vec::new();
        };
        let Some(reply_to) = msg.response_target() else {
            debug!("dropping message with no viable reply target");
            return Vec::new();
        };
        let incoming = Incoming {
            sender: msg.source_nickname(),
            reply_to,
            body: body.as_str(),
        };

        for i in 0..self.entries.len() {
            let entry = self.entries[i];
            if incoming.body.contains(entry.token) {
                return (entry.respond)(self, &incoming).into_iter().collect();
            }
        }

        if *target == self.nick {
            return self.fallback(&incoming).into_iter().collect();
        }

        Vec::new()
    }

    /// Fixed greeting, back to where the message came from.
    fn greet(&mut self, msg: &Incoming<'_>) -> Option<Outbound> {
        Some(Outbound {
            target: msg.reply_to.to_owned(),
            text: self.greeting.clone(),
        })
    }

    fn help(&mut self, msg: &Incoming<'_>) -> Option<Outbound> {
        Some(Outbound {
            target: msg.reply_to.to_owned(),
            text: "Available commands: !hello, !help, !slap [target]".to_owned(),
        })
    }

    fn slap(&mut self, msg: &Incoming<'_>) -> Option<Outbound> {
        let text = match self.resolve_victim(msg) {
            Ok(victim) => format!("@{} just got slapped with a trout!", victim),
            Err(NoTargetAvailable) => {
                format!("{} looks around, but there is no one to slap.", self.nick)
            }
        };
        Some(Outbound {
            target: msg.reply_to.to_owned(),
            text,
        })
    }

    /// Resolve the slap victim.
    ///
    /// An explicit target naming the bot is redirected onto some other
    /// roster member. With no explicit target, the roster pick is re-rolled
    /// exactly once if it lands on the bot or the sender; the second pick
    /// stands either way.
    fn resolve_victim(&mut self, msg: &Incoming<'_>) -> Result<String, NoTargetAvailable> {
        let explicit = msg
            .body
            .split_whitespace()
            .skip_while(|token| !token.contains("!slap"))
            .nth(1);

        match explicit {
            Some(target) if target == self.nick => self
                .roster
                .choose_other(&mut self.rng, &[self.nick.as_str()])
                .map(str::to_owned)
                .ok_or(NoTargetAvailable),
            Some(target) => Ok(target.to_owned()),
            None => {
                let first = self
                    .roster
                    .choose(&mut self.rng)
                    .ok_or(NoTargetAvailable)?;
                if first == self.nick || Some(first) == msg.sender {
                    let second = self
                        .roster
                        .choose(&mut self.rng)
                        .ok_or(NoTargetAvailable)?;
                    return Ok(second.to_owned());
                }
                Ok(first.to_owned())
            }
        }
    }

    /// Catalog reply for messages addressed directly to the bot.
    fn fallback(&mut self, msg: &Incoming<'_>) -> Option<Outbound> {
        let sender = msg.sender?;
        let text = self.catalog.pick(&mut self.rng)?.to_owned();
        Some(Outbound {
            target: sender.to_owned(),
            text,
        })
    }
}
