//! IRC message codec for tokio.
//!
//! This module provides the codec used by [`crate::transport::Transport`]:
//! inbound traffic decodes to raw line strings (message parsing happens a
//! layer up, so one unparsable line does not poison the framed stream),
//! outbound [`Message`]s are sanitized and encoded to wire form.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;
use crate::line::LineCodec;
use crate::message::Message;

/// Tokio codec for IRC traffic.
///
/// Wraps [`LineCodec`]; encodes [`Message`] values after sanitizing them.
pub struct IrcCodec {
    inner: LineCodec,
}

impl IrcCodec {
    /// Create a new codec.
    pub fn new() -> Self {
        Self {
            inner: LineCodec::new(),
        }
    }

    /// Sanitize outgoing message data.
    ///
    /// - Truncates at the first line ending, so message text can never
    ///   smuggle a second protocol line
    /// - Rejects NUL characters
    pub fn sanitize(mut data: String) -> error::Result<String> {
        // Truncate at first line ending
        if let Some((pos, len)) = ["\r\n", "\r", "\n"]
            .iter()
            .flat_map(|needle| data.find(needle).map(|pos| (pos, needle.len())))
            .min_by_key(|&(pos, _)| pos)
        {
            data.truncate(pos + len);
        }

        if let Some(ch) = data.chars().find(|&c| c == '\0') {
            return Err(error::ProtocolError::IllegalControlChar(ch));
        }

        Ok(data)
    }
}

impl Default for IrcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for IrcCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        self.inner.decode(src)
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> error::Result<()> {
        let sanitized = Self::sanitize(msg.to_string())?;
        self.inner.encode(sanitized, dst)
    }
}
