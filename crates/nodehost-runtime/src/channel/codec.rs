//! `\r\n` framing.

use std::io;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

/// Outbound message terminator.
pub const DELIMITER: &str = "\r\n";

/// Longest inbound message accepted by default, terminator excluded.
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 16 * 1024 * 1024;

/// Splits inbound bytes into messages and terminates outbound ones.
///
/// Decoding splits on `\n` and strips one trailing `\r`, so both `\r\n` and
/// bare `\n` terminate a message. Empty messages are dropped. A trailing
/// fragment stays buffered until the rest of it arrives, up to the maximum
/// message length; past that decoding fails.
#[derive(Debug, Clone, Copy)]
pub struct MessageCodec {
    /// Bytes already scanned without finding a terminator.
    scanned: usize,
    max_length: usize,
}

impl MessageCodec {
    pub const fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_MESSAGE_LENGTH)
    }

    pub const fn with_max_length(max_length: usize) -> Self {
        Self {
            scanned: 0,
            max_length,
        }
    }

    pub const fn max_length(&self) -> usize {
        self.max_length
    }

    fn too_long(&mut self, src: &mut BytesMut) -> io::Error {
        src.clear();
        self.scanned = 0;
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("message longer than {} bytes", self.max_length),
        )
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for MessageCodec {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, io::Error> {
        loop {
            let Some(offset) = src[self.scanned..].iter().position(|b| *b == b'\n') else {
                // One extra byte may still be the `\r` of a terminator.
                if src.len() > self.max_length.saturating_add(1) {
                    return Err(self.too_long(src));
                }
                self.scanned = src.len();
                return Ok(None);
            };
            let end = self.scanned + offset;
            self.scanned = 0;

            let mut line = src.split_to(end + 1);
            line.truncate(end);
            if line.last() == Some(&b'\r') {
                line.truncate(end - 1);
            }
            if line.is_empty() {
                continue;
            }
            if line.len() > self.max_length {
                return Err(self.too_long(src));
            }
            return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, io::Error> {
        let message = self.decode(src)?;
        if message.is_none() && !src.is_empty() {
            debug!(bytes = src.len(), "Dropping unterminated message at end of stream");
            src.clear();
            self.scanned = 0;
        }
        Ok(message)
    }
}

impl Encoder<String> for MessageCodec {
    type Error = io::Error;

    fn encode(&mut self, message: String, dst: &mut BytesMut) -> Result<(), io::Error> {
        dst.reserve(message.len() + DELIMITER.len());
        dst.put_slice(message.as_bytes());
        dst.put_slice(DELIMITER.as_bytes());
        Ok(())
    }
}
