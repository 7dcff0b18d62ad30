//! Host-side driver for the Moab tilting-plate hat.
//!
//! The hat is a microcontroller board on a Raspberry Pi header that drives
//! three servos, a small display, a joystick and a menu button. The host
//! talks to it over SPI in fixed 9-byte full-duplex frames and brings it out
//! of its bootloader through three GPIO control lines.
//!
//! This crate provides [`Hat`], which owns the bus, the control lines and a
//! delay source, and exposes plate control, display output and input state
//! on top of the frame protocol. It is `no_std` and generic over the
//! blocking [`embedded-hal`](embedded_hal) 1.0 traits, so it runs unchanged
//! on Linux (`linux-embedded-hal`) and against test doubles.
//!
//! # Quick Start
//!
//! ```ignore
//! use moab_hat::{ControlPins, Hat, HatConfig, Icon, Text};
//!
//! let pins = ControlPins { boot_enable, hat_enable, hat_reset, power_sense };
//! let mut hat = Hat::new(spi, pins, delay, HatConfig::default())?;
//!
//! hat.show_icon_and_text(Icon::Dot, Text::Manual)?;
//! hat.enable_servos()?;
//! hat.set_angles(5, -3)?;
//! if hat.buttons().menu_pressed {
//!     hat.lower()?;
//! }
//! ```
//!
//! # Crate Features
//!
//! - **`defmt`**: structured logging via [`defmt`] and `defmt::Format`
//!   impls on public types.
//! - **`log`**: logging through the [`log`] facade, for hosted targets.
//!
//! [`defmt`]: https://docs.rs/defmt
//! [`log`]: https://docs.rs/log

#![no_std]

#[cfg(test)]
extern crate std;

pub mod commands;
pub mod config;
mod driver;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod hat;
pub mod message;
pub mod power;
pub mod reply;

#[cfg(test)]
mod mock;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use commands::{Command, Icon, LogLevel, ReplyKind, Text, FRAME_LEN, MAX_MESSAGE_LEN};
pub use config::{
    HatConfig, DEFAULT_SPI_BITS_PER_WORD, DEFAULT_SPI_BUS, DEFAULT_SPI_DEVICE, DEFAULT_SPI_MODE,
    DEFAULT_SPI_SPEED_HZ,
};
pub use error::HatError;
pub use frame::{Frame, FrameTooLong};
pub use geometry::ServoOffsets;
pub use hat::{Hat, HOVER_POSITION, LOWER_POSITION};
pub use message::{info_screen_text, Message, MessageTooLong};
pub use power::{
    ControlPins, PowerState, BOOT_EN_GPIO, HAT_EN_GPIO, HAT_PWR_N_GPIO, HAT_RESET_GPIO,
};
pub use reply::{ButtonState, Version, VersionParseError};
