//! Arbitrary-text display protocol.
//!
//! Text longer than one frame payload is sent as a run of
//! `ARBITRARY_MESSAGE` frames, 8 bytes each, which the firmware appends to
//! its text buffer. A `DISPLAY_BUFFER` frame afterwards shows the whole
//! buffer at once.
//!
//! ```text
//! "hi"  →  48 49 00 00 00 00 00 00   (one chunk: 'H' 'I' NUL + padding)
//!       →  DISPLAY_BUFFER
//! ```

use core::fmt::{self, Write};
use core::net::Ipv4Addr;

use heapless::{String, Vec};

use crate::commands::{MAX_MESSAGE_LEN, PAYLOAD_LEN};
use crate::reply::Version;

/// Text plus terminator exceeded the firmware's text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MessageTooLong {
    /// Encoded length including the terminator.
    pub len: usize,
}

impl fmt::Display for MessageTooLong {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "message of {} bytes exceeds the {}-byte display buffer",
            self.len, MAX_MESSAGE_LEN
        )
    }
}

impl core::error::Error for MessageTooLong {}

/// A display message encoded for transmission: uppercased UTF-8, one NUL
/// terminator, NUL-padded to a whole number of chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    bytes: Vec<u8, MAX_MESSAGE_LEN>,
}

impl Message {
    /// Encode `text` for the hat.
    ///
    /// The firmware font has no lowercase glyphs, so text is uppercased
    /// first.
    ///
    /// # Errors
    /// [`MessageTooLong`] if the uppercased text plus terminator exceeds
    /// [`MAX_MESSAGE_LEN`] bytes.
    pub fn encode(text: &str) -> Result<Self, MessageTooLong> {
        let len = uppercase(text).map(char::len_utf8).sum::<usize>() + 1;
        if len > MAX_MESSAGE_LEN {
            return Err(MessageTooLong { len });
        }

        let mut bytes = Vec::new();
        for c in uppercase(text) {
            let mut utf8 = [0u8; 4];
            bytes
                .extend_from_slice(c.encode_utf8(&mut utf8).as_bytes())
                .map_err(|_| MessageTooLong { len })?;
        }

        // Terminator, then pad to a chunk boundary. MAX_MESSAGE_LEN is a
        // multiple of PAYLOAD_LEN, so padding always fits.
        let padded = len.div_ceil(PAYLOAD_LEN) * PAYLOAD_LEN;
        bytes
            .resize(padded, 0)
            .map_err(|_| MessageTooLong { len })?;

        Ok(Self { bytes })
    }

    /// Number of `ARBITRARY_MESSAGE` frames needed.
    pub fn chunk_count(&self) -> usize {
        self.bytes.len() / PAYLOAD_LEN
    }

    /// Payloads of the `ARBITRARY_MESSAGE` frames, in transmission order.
    pub fn chunks(&self) -> impl Iterator<Item = &[u8]> {
        self.bytes.chunks_exact(PAYLOAD_LEN)
    }

    /// The padded byte sequence.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

fn uppercase(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().flat_map(char::to_uppercase)
}

/// Text of the info screen: project name, software version and host IP.
pub fn info_screen_text(version: Version, ip: Ipv4Addr) -> String<MAX_MESSAGE_LEN> {
    let mut text = String::new();
    // Bounded well below MAX_MESSAGE_LEN: every field has a fixed maximum width.
    let _ = write!(
        text,
        "PROJECT MOAB\nSW VERSION\n{}\nIP ADDRESS:\n{}\n",
        version, ip
    );
    text
}
