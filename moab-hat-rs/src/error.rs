//! Error types for the hat driver.

use core::fmt;

use crate::frame::FrameTooLong;
use crate::message::MessageTooLong;

/// Errors that can occur when driving the hat.
///
/// Generic over the SPI error `S` and the GPIO error `P` of the
/// underlying `embedded-hal` implementations. Nothing is retried
/// internally; every failure is returned to the caller as-is.
#[derive(Debug)]
pub enum HatError<S, P> {
    /// Driving a control line failed while bringing the hat out of
    /// bootloader mode. The hat is unusable.
    Init(P),

    /// A control line could not be read after initialisation.
    Pin(P),

    /// An SPI exchange failed.
    Bus(S),

    /// A payload longer than one frame was handed to the frame codec.
    FrameTooLong(FrameTooLong),

    /// A display message exceeded the firmware's text buffer. Raised
    /// before any frame is sent.
    MessageTooLong(MessageTooLong),

    /// The hat answered with a reply code other than the one requested.
    UnexpectedReply {
        /// Byte 0 of the reply.
        code: u8,
    },
}

impl<S, P> From<FrameTooLong> for HatError<S, P> {
    fn from(error: FrameTooLong) -> Self {
        HatError::FrameTooLong(error)
    }
}

impl<S, P> From<MessageTooLong> for HatError<S, P> {
    fn from(error: MessageTooLong) -> Self {
        HatError::MessageTooLong(error)
    }
}

impl<S: fmt::Debug, P: fmt::Debug> fmt::Display for HatError<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HatError::Init(e) => write!(f, "could not set up hat control lines: {:?}", e),
            HatError::Pin(e) => write!(f, "GPIO error: {:?}", e),
            HatError::Bus(e) => write!(f, "SPI error: {:?}", e),
            HatError::FrameTooLong(e) => write!(f, "{}", e),
            HatError::MessageTooLong(e) => write!(f, "{}", e),
            HatError::UnexpectedReply { code } => {
                write!(f, "unexpected reply code {:#04x}", code)
            }
        }
    }
}

impl<S: fmt::Debug, P: fmt::Debug> core::error::Error for HatError<S, P> {}

#[cfg(feature = "defmt")]
impl<S: defmt::Format, P: defmt::Format> defmt::Format for HatError<S, P> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            HatError::Init(e) => defmt::write!(f, "Init error: {}", e),
            HatError::Pin(e) => defmt::write!(f, "GPIO error: {}", e),
            HatError::Bus(e) => defmt::write!(f, "SPI error: {}", e),
            HatError::FrameTooLong(e) => defmt::write!(f, "{}", e),
            HatError::MessageTooLong(e) => defmt::write!(f, "{}", e),
            HatError::UnexpectedReply { code } => {
                defmt::write!(f, "Unexpected reply code {=u8:#x}", code)
            }
        }
    }
}
