//! Fixed-length frame codec.
//!
//! Every exchange with the hat is exactly [`FRAME_LEN`] bytes in both
//! directions: one opcode byte followed by [`PAYLOAD_LEN`] payload bytes.
//! Short payloads are zero-padded; long payloads are rejected, never
//! truncated.

use core::fmt;

use crate::commands::{Command, FRAME_LEN, PAYLOAD_LEN};

/// Reinterpret a received byte as a two's-complement signed value.
pub const fn to_signed(byte: u8) -> i8 {
    byte as i8
}

/// Encode a signed value as the byte written on the wire.
pub const fn to_unsigned(value: i8) -> u8 {
    value as u8
}

/// A payload did not fit into one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameTooLong {
    /// Number of payload bytes the caller supplied.
    pub len: usize,
}

impl fmt::Display for FrameTooLong {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "payload of {} bytes does not fit a {}-byte frame",
            self.len, FRAME_LEN
        )
    }
}

impl core::error::Error for FrameTooLong {}

/// One host → hat frame.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Frame carrying only an opcode, payload all zeros.
    pub fn command(command: Command) -> Self {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[0] = command.code();
        Self(bytes)
    }

    /// Build a frame from signed payload values.
    ///
    /// # Errors
    /// [`FrameTooLong`] if `payload` has more than [`PAYLOAD_LEN`] entries.
    pub fn new(command: Command, payload: &[i8]) -> Result<Self, FrameTooLong> {
        let mut frame = Self::with_capacity_check(command, payload.len())?;
        for (dst, &src) in frame.0[1..].iter_mut().zip(payload) {
            *dst = to_unsigned(src);
        }
        Ok(frame)
    }

    /// Build a frame from raw payload bytes (text chunks, servo positions).
    ///
    /// # Errors
    /// [`FrameTooLong`] if `payload` has more than [`PAYLOAD_LEN`] bytes.
    pub fn from_bytes(command: Command, payload: &[u8]) -> Result<Self, FrameTooLong> {
        let mut frame = Self::with_capacity_check(command, payload.len())?;
        frame.0[1..=payload.len()].copy_from_slice(payload);
        Ok(frame)
    }

    fn with_capacity_check(command: Command, len: usize) -> Result<Self, FrameTooLong> {
        if len > PAYLOAD_LEN {
            return Err(FrameTooLong { len });
        }
        Ok(Self::command(command))
    }

    /// Opcode byte as it goes on the wire.
    pub fn opcode(&self) -> u8 {
        self.0[0]
    }

    /// The eight payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.0[1..]
    }

    /// The whole frame as transmitted.
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Frame({:#04x}, {:?})", self.opcode(), self.payload())
    }
}
