//! Raspberry Pi wiring: spidev for the bus, the GPIO character device for
//! the control lines.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use embedded_hal::spi::{Mode, Phase, Polarity};
use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{CdevPin, Delay, SpidevDevice};
use moab_hat::{
    ControlPins, Hat, HatConfig, BOOT_EN_GPIO, DEFAULT_SPI_BITS_PER_WORD, DEFAULT_SPI_MODE,
    HAT_EN_GPIO, HAT_PWR_N_GPIO, HAT_RESET_GPIO,
};

use crate::cli::BoardArgs;

/// The hat as wired on a Raspberry Pi.
pub type PiHat = Hat<SpidevDevice, CdevPin, CdevPin, Delay>;

/// Open the bus and control lines and bring the hat into runtime mode.
///
/// Every handle acquired before a failure is dropped on the way out.
pub fn open_hat(args: &BoardArgs) -> Result<PiHat> {
    let spi = open_spi(args.spi_bus, args.spi_device, args.spi_speed_hz)?;
    let pins = request_control_pins(&args.gpio_chip)?;

    let config = HatConfig {
        servo_offsets: args.servo_offsets,
        ..HatConfig::default()
    };

    log::debug!("starting hat with {:?}", config);
    Hat::new(spi, pins, Delay, config)
        .map_err(|e| anyhow!("{e}"))
        .context("could not bring the hat out of bootloader mode")
}

fn open_spi(bus: u8, device: u8, speed_hz: u32) -> Result<SpidevDevice> {
    let path = format!("/dev/spidev{bus}.{device}");
    let mut spi = SpidevDevice::open(&path).with_context(|| format!("could not open `{path}`"))?;

    let options = SpidevOptions::new()
        .bits_per_word(DEFAULT_SPI_BITS_PER_WORD)
        .max_speed_hz(speed_hz)
        .mode(spi_mode_flags(DEFAULT_SPI_MODE))
        .build();
    spi.configure(&options)
        .with_context(|| format!("configuring `{path}`"))?;

    log::info!("opened {path} at {speed_hz} Hz");
    Ok(spi)
}

fn spi_mode_flags(mode: Mode) -> SpiModeFlags {
    let mut flags = SpiModeFlags::empty();
    if mode.polarity == Polarity::IdleHigh {
        flags |= SpiModeFlags::SPI_CPOL;
    }
    if mode.phase == Phase::CaptureOnSecondTransition {
        flags |= SpiModeFlags::SPI_CPHA;
    }
    flags
}

fn request_control_pins(chip_path: &Path) -> Result<ControlPins<CdevPin, CdevPin>> {
    let mut chip = Chip::new(chip_path)
        .with_context(|| format!("opening GPIO chip {}", chip_path.display()))?;

    Ok(ControlPins {
        boot_enable: request_line(&mut chip, BOOT_EN_GPIO, LineRequestFlags::OUTPUT, "moab-boot-en")?,
        hat_enable: request_line(&mut chip, HAT_EN_GPIO, LineRequestFlags::OUTPUT, "moab-hat-en")?,
        hat_reset: request_line(&mut chip, HAT_RESET_GPIO, LineRequestFlags::OUTPUT, "moab-hat-reset")?,
        power_sense: request_line(&mut chip, HAT_PWR_N_GPIO, LineRequestFlags::INPUT, "moab-pwr-n")?,
    })
}

/// Outputs start low.
fn request_line(
    chip: &mut Chip,
    offset: u32,
    flags: LineRequestFlags,
    consumer: &str,
) -> Result<CdevPin> {
    let handle = chip
        .get_line(offset)
        .and_then(|line| line.request(flags, 0, consumer))
        .with_context(|| format!("requesting GPIO {offset} ({consumer})"))?;
    CdevPin::new(handle).with_context(|| format!("creating pin for GPIO {offset}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::spi::{MODE_0, MODE_1, MODE_3};

    #[test]
    fn hat_bus_mode_is_spidev_mode_0() {
        assert_eq!(spi_mode_flags(DEFAULT_SPI_MODE), SpiModeFlags::SPI_MODE_0);
    }

    #[test]
    fn mode_flags_follow_polarity_and_phase() {
        assert_eq!(spi_mode_flags(MODE_0), SpiModeFlags::SPI_MODE_0);
        assert_eq!(spi_mode_flags(MODE_1), SpiModeFlags::SPI_MODE_1);
        assert_eq!(spi_mode_flags(MODE_3), SpiModeFlags::SPI_MODE_3);
    }
}
