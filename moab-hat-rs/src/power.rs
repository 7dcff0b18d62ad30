//! Bootloader → runtime power sequencing.
//!
//! After power-on the hat's microcontroller sits in its bootloader. The
//! host moves it into the application firmware by toggling three control
//! lines with fixed settle delays. There is no way back short of a power
//! cycle, so the sequence runs once per [`Hat`](crate::Hat).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::HatConfig;

/// BCM GPIO driving the hat's BOOT_EN line (header pin 29).
pub const BOOT_EN_GPIO: u32 = 5;

/// BCM GPIO driving the hat's HAT_EN line (header pin 38).
pub const HAT_EN_GPIO: u32 = 20;

/// BCM GPIO driving the hat's HAT_RESET line (header pin 31).
pub const HAT_RESET_GPIO: u32 = 6;

/// BCM GPIO sensing the hat's active-low power button (header pin 5).
pub const HAT_PWR_N_GPIO: u32 = 3;

/// The four control lines between host and hat.
///
/// The three outputs share one pin type; the power-sense input must report
/// the same error type so every line failure maps onto one error variant.
pub struct ControlPins<O, I> {
    /// BOOT_EN output.
    pub boot_enable: O,
    /// HAT_EN output.
    pub hat_enable: O,
    /// HAT_RESET output.
    pub hat_reset: O,
    /// HAT_PWR_N input, low while the power button is held.
    pub power_sense: I,
}

/// Power state of the hat as seen from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Initial state: the hat runs its bootloader and ignores commands.
    Bootloader,
    /// The application firmware is running and accepts frames.
    Runtime,
}

/// Drives the control lines through the bootloader → runtime transition.
pub(crate) struct PowerSequencer<O, I> {
    pins: ControlPins<O, I>,
    state: PowerState,
}

impl<O, I> PowerSequencer<O, I>
where
    O: OutputPin,
    I: InputPin<Error = O::Error>,
{
    /// Take ownership of the control lines. No line is touched yet.
    pub fn new(pins: ControlPins<O, I>) -> Self {
        Self {
            pins,
            state: PowerState::Bootloader,
        }
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Bring the hat into runtime mode.
    ///
    /// 1. HAT_EN low, hold for `hat_enable_pulse_ms`.
    /// 2. HAT_EN high, then HAT_RESET low and BOOT_EN low.
    /// 3. Wait `runtime_settle_ms` for the firmware to boot.
    ///
    /// Does nothing if the hat is already in runtime mode.
    pub fn enter_runtime<D: DelayNs>(
        &mut self,
        delay: &mut D,
        config: &HatConfig,
    ) -> Result<(), O::Error> {
        if self.state == PowerState::Runtime {
            return Ok(());
        }

        self.pins.hat_enable.set_low()?;
        delay.delay_ms(config.hat_enable_pulse_ms);
        self.pins.hat_enable.set_high()?;
        self.pins.hat_reset.set_low()?;
        self.pins.boot_enable.set_low()?;
        delay.delay_ms(config.runtime_settle_ms);

        self.state = PowerState::Runtime;

        #[cfg(feature = "defmt")]
        defmt::info!("Hat in runtime mode");
        #[cfg(feature = "log")]
        log::info!("hat in runtime mode");

        Ok(())
    }

    /// `true` while the hat's power button pulls HAT_PWR_N low.
    pub fn power_button_pressed(&mut self) -> Result<bool, O::Error> {
        self.pins.power_sense.is_low()
    }

    pub fn release(self) -> ControlPins<O, I> {
        self.pins
    }
}
