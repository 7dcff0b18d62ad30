//! Low-level SPI transceiver.
//!
//! Every exchange is one full-duplex transfer of exactly [`FRAME_LEN`]
//! bytes, preceded by a short pause so the hat firmware is ready to clock
//! its reply.
//!
//! This module is crate-private; consumers interact with [`Hat`] in
//! `hat.rs` instead.
//!
//! [`Hat`]: crate::Hat

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;

use crate::commands::FRAME_LEN;
use crate::frame::Frame;

/// Owns the SPI device and the delay source.
pub(crate) struct HatDriver<SPI, D> {
    spi: SPI,
    delay: D,
    pre_exchange_delay_us: u32,
}

impl<SPI, D> HatDriver<SPI, D>
where
    SPI: SpiDevice,
    D: DelayNs,
{
    pub fn new(spi: SPI, delay: D, pre_exchange_delay_us: u32) -> Self {
        Self {
            spi,
            delay,
            pre_exchange_delay_us,
        }
    }

    /// Send one frame and return the hat's simultaneous reply.
    ///
    /// A failed transfer is returned immediately; nothing is retried.
    pub fn exchange(&mut self, frame: &Frame) -> Result<[u8; FRAME_LEN], SPI::Error> {
        self.delay.delay_us(self.pre_exchange_delay_us);

        let mut reply = [0u8; FRAME_LEN];
        self.spi.transfer(&mut reply, frame.as_bytes())?;

        #[cfg(feature = "defmt")]
        defmt::trace!("tx {} rx {}", frame, reply);
        #[cfg(feature = "log")]
        log::trace!("tx {:?} rx {:?}", frame, reply);

        Ok(reply)
    }

    /// Block for `ms` milliseconds (servo travel and similar).
    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Borrow the delay source, e.g. for power sequencing.
    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }

    pub fn release(self) -> (SPI, D) {
        (self.spi, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::mock::{Event, EventLog, FakeDelay, FakeError, FakeSpi};

    #[test]
    fn exchange_waits_then_transfers_nine_bytes() {
        let log = EventLog::new();
        let spi = FakeSpi::new(&log).reply([1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let mut driver = HatDriver::new(spi, FakeDelay::new(&log), 1_000);

        let reply = driver.exchange(&Frame::command(Command::Noop)).unwrap();

        assert_eq!(reply, [1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(
            log.events(),
            [Event::DelayUs(1_000), Event::Transfer([0; FRAME_LEN])]
        );
    }

    #[test]
    fn exchange_adds_no_post_delay() {
        let log = EventLog::new();
        let mut driver = HatDriver::new(FakeSpi::new(&log), FakeDelay::new(&log), 1_000);

        driver
            .exchange(&Frame::command(Command::SetPlateAngles))
            .unwrap();

        assert!(matches!(log.events().last(), Some(Event::Transfer(_))));
    }

    #[test]
    fn transfer_failure_propagates() {
        let log = EventLog::new();
        let spi = FakeSpi::new(&log).fail_at(0);
        let mut driver = HatDriver::new(spi, FakeDelay::new(&log), 1_000);

        let result = driver.exchange(&Frame::command(Command::Noop));

        assert_eq!(result, Err(FakeError));
        assert!(log.frames().is_empty());
    }
}
