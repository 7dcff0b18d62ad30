//! Timing and bus configuration.

use embedded_hal::spi::{Mode, MODE_0};

use crate::geometry::ServoOffsets;

/// Default SPI bus index (`/dev/spidev<bus>.<device>`).
pub const DEFAULT_SPI_BUS: u8 = 0;

/// Default SPI chip-select index.
pub const DEFAULT_SPI_DEVICE: u8 = 0;

/// Default SPI clock. The hat firmware polls its SPI peripheral, so the
/// clock is kept slow.
pub const DEFAULT_SPI_SPEED_HZ: u32 = 10_000;

/// SPI mode expected by the hat: clock idle low, sample on the first edge.
pub const DEFAULT_SPI_MODE: Mode = MODE_0;

/// Word size on the bus.
pub const DEFAULT_SPI_BITS_PER_WORD: u8 = 8;

/// Configuration for the hat facade.
///
/// All delays are blocking: the call that triggers one does not return
/// until it has elapsed. [`HatConfig::default()`] reproduces the values
/// tuned against the shipping hat firmware and servos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HatConfig {
    /// Pause before every exchange, in microseconds. Default: 1000.
    pub pre_exchange_delay_us: u32,
    /// Pause after plate-angle and raw-servo commands while the servos
    /// travel, in milliseconds. Default: 50 (25 measured, doubled).
    pub servo_settle_ms: u32,
    /// How long HAT_EN is held low during power-up, in milliseconds.
    /// Default: 20.
    pub hat_enable_pulse_ms: u32,
    /// Wait after leaving bootloader mode before the first exchange, in
    /// milliseconds. Default: 250.
    pub runtime_settle_ms: u32,
    /// Calibration offsets in effect right after construction.
    pub servo_offsets: ServoOffsets,
}

impl Default for HatConfig {
    fn default() -> Self {
        Self {
            pre_exchange_delay_us: 1_000,
            servo_settle_ms: 50,
            hat_enable_pulse_ms: 20,
            runtime_settle_ms: 250,
            servo_offsets: ServoOffsets::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let c = HatConfig::default();
        assert_eq!(c.pre_exchange_delay_us, 1_000);
        assert_eq!(c.servo_settle_ms, 50);
        assert_eq!(c.hat_enable_pulse_ms, 20);
        assert_eq!(c.runtime_settle_ms, 250);
        assert_eq!(c.servo_offsets, ServoOffsets::new(0, 0, 0));
    }

    #[test]
    fn default_bus_is_mode_0_with_byte_words() {
        assert_eq!(DEFAULT_SPI_MODE, MODE_0);
        assert_eq!(DEFAULT_SPI_BITS_PER_WORD, 8);
    }
}
