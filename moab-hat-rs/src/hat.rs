//! High-level interface for the Moab hat.
//!
//! [`Hat`] owns the SPI device, the four control lines and the delay
//! source for its whole lifetime. Construction brings the hat out of its
//! bootloader; dropping it (or calling [`Hat::release`]) gives every
//! resource back, on error paths included.

use core::net::Ipv4Addr;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::commands::{Command, Icon, LogLevel, ReplyKind, Text, FRAME_LEN};
use crate::config::HatConfig;
use crate::driver::HatDriver;
use crate::error::HatError;
use crate::frame::Frame;
use crate::geometry::ServoOffsets;
use crate::message::{info_screen_text, Message};
use crate::power::{ControlPins, PowerSequencer, PowerState};
use crate::reply::{ButtonState, Version};

/// Raw servo position holding the plate just above its rest position.
pub const HOVER_POSITION: u8 = 150;

/// Raw servo position of the fully lowered plate (power-off pose).
pub const LOWER_POSITION: u8 = 155;

/// High-level interface for the Moab hat.
///
/// Every method that talks to the hat performs one or more blocking SPI
/// exchanges and refreshes [`buttons()`](Self::buttons) from the reply.
/// Not `Sync`: callers sharing a hat between threads must serialise
/// access themselves.
///
/// # Example
///
/// ```no_run
/// # fn example<SPI, O, I, D>(spi: SPI, pins: moab_hat::ControlPins<O, I>, delay: D)
/// # where
/// #     SPI: embedded_hal::spi::SpiDevice,
/// #     O: embedded_hal::digital::OutputPin,
/// #     I: embedded_hal::digital::InputPin<Error = O::Error>,
/// #     D: embedded_hal::delay::DelayNs,
/// #     SPI::Error: core::fmt::Debug,
/// #     O::Error: core::fmt::Debug,
/// # {
/// use moab_hat::{Hat, HatConfig};
///
/// let mut hat = Hat::new(spi, pins, delay, HatConfig::default()).unwrap();
/// hat.enable_servos().unwrap();
/// hat.set_angles(5, -3).unwrap();
/// let buttons = hat.buttons();
/// # let _ = buttons;
/// # }
/// ```
pub struct Hat<SPI, O, I, D> {
    driver: HatDriver<SPI, D>,
    power: PowerSequencer<O, I>,
    config: HatConfig,
    servo_offsets: ServoOffsets,
    buttons: ButtonState,
    /// What the next exchange's reply carries, set by the previous command.
    expected_reply: ReplyKind,
}

impl<SPI, O, I, D> Hat<SPI, O, I, D>
where
    SPI: SpiDevice,
    O: OutputPin,
    I: InputPin<Error = O::Error>,
    D: DelayNs,
{
    /// Take ownership of the bus and control lines and switch the hat to
    /// runtime mode.
    ///
    /// Blocks for the power-up sequence (about 270 ms with default timing).
    ///
    /// # Errors
    /// [`HatError::Init`] if a control line cannot be driven. The bus and
    /// lines are dropped, and so released, before the error is returned.
    pub fn new(
        spi: SPI,
        pins: ControlPins<O, I>,
        delay: D,
        config: HatConfig,
    ) -> Result<Self, HatError<SPI::Error, O::Error>> {
        let mut driver = HatDriver::new(spi, delay, config.pre_exchange_delay_us);
        let mut power = PowerSequencer::new(pins);

        power
            .enter_runtime(driver.delay_mut(), &config)
            .map_err(HatError::Init)?;

        Ok(Self {
            driver,
            power,
            servo_offsets: config.servo_offsets,
            config,
            buttons: ButtonState::default(),
            expected_reply: ReplyKind::Normal,
        })
    }

    // -----------------------------------------------------------------------
    // State
    // -----------------------------------------------------------------------

    /// Buttons and joystick from the most recent exchange.
    ///
    /// Generates no SPI traffic; call [`noop()`](Self::noop) to refresh.
    pub fn buttons(&self) -> ButtonState {
        self.buttons
    }

    pub fn power_state(&self) -> PowerState {
        self.power.state()
    }

    /// `true` while the hat's power button is held.
    ///
    /// # Errors
    /// [`HatError::Pin`] if the power-sense line cannot be read.
    pub fn power_button_pressed(&mut self) -> Result<bool, HatError<SPI::Error, O::Error>> {
        self.power.power_button_pressed().map_err(HatError::Pin)
    }

    pub fn servo_offsets(&self) -> ServoOffsets {
        self.servo_offsets
    }

    /// Set post-factory calibration offsets for each servo.
    ///
    /// Local only; takes effect on the next [`set_angles`](Self::set_angles).
    /// Normally not needed.
    pub fn set_servo_offsets(&mut self, servo1: i8, servo2: i8, servo3: i8) {
        self.servo_offsets = ServoOffsets::new(servo1, servo2, servo3);
    }

    // -----------------------------------------------------------------------
    // Servos
    // -----------------------------------------------------------------------

    /// Power the servos so the plate tracks commanded angles.
    pub fn enable_servos(&mut self) -> Result<(), HatError<SPI::Error, O::Error>> {
        self.send_command(Command::ServoEnable)
    }

    /// Cut power to the servos.
    pub fn disable_servos(&mut self) -> Result<(), HatError<SPI::Error, O::Error>> {
        self.send_command(Command::ServoDisable)
    }

    /// Tilt the plate to `(x, y)` degrees, corrected by the servo offsets.
    ///
    /// Blocks for the servo settle time after the exchange. The plate's
    /// safe mechanical range is roughly ±22°; nothing here enforces it.
    pub fn set_angles(&mut self, x: i8, y: i8) -> Result<(), HatError<SPI::Error, O::Error>> {
        let payload = self.servo_offsets.plate_payload(x, y);
        let frame = Frame::new(Command::SetPlateAngles, &payload)?;
        self.send(Command::SetPlateAngles, &frame)
    }

    /// Drive the three servos to raw positions.
    ///
    /// Servo offsets are **not** applied here. Blocks for the servo settle
    /// time after the exchange.
    pub fn set_servos(
        &mut self,
        servo1: u8,
        servo2: u8,
        servo3: u8,
    ) -> Result<(), HatError<SPI::Error, O::Error>> {
        self.send_frame(Command::SetServos, &[servo1, servo2, servo3])
    }

    /// Hold the plate just above its lowest position.
    pub fn hover(&mut self) -> Result<(), HatError<SPI::Error, O::Error>> {
        self.set_servos(HOVER_POSITION, HOVER_POSITION, HOVER_POSITION)
    }

    /// Lower the plate fully, the usual pose before power-off.
    pub fn lower(&mut self) -> Result<(), HatError<SPI::Error, O::Error>> {
        self.set_servos(LOWER_POSITION, LOWER_POSITION, LOWER_POSITION)
    }

    // -----------------------------------------------------------------------
    // Display
    // -----------------------------------------------------------------------

    /// Show one of the firmware's built-in icon and text screens.
    pub fn show_icon_and_text(
        &mut self,
        icon: Icon,
        text: Text,
    ) -> Result<(), HatError<SPI::Error, O::Error>> {
        self.send_frame(Command::TextIconSelect, &[icon as u8, text as u8])
    }

    /// Show arbitrary text (uppercased; at most 255 bytes of UTF-8).
    ///
    /// The text is validated before anything is sent. A bus failure part
    /// way through leaves the hat's text buffer partially written until
    /// the next successful call.
    ///
    /// # Errors
    /// * [`HatError::MessageTooLong`] if the text does not fit; nothing is
    ///   sent.
    /// * [`HatError::Bus`] on the first failed exchange.
    pub fn show_text(&mut self, text: &str) -> Result<(), HatError<SPI::Error, O::Error>> {
        let message = Message::encode(text)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("Sending message in {} chunks", message.chunk_count());
        #[cfg(feature = "log")]
        log::debug!("sending {:?} in {} chunks", text, message.chunk_count());

        for chunk in message.chunks() {
            self.send_frame(Command::ArbitraryMessage, chunk)?;
        }
        self.send_command(Command::DisplayBuffer)
    }

    /// Show project name, software version and IP address.
    pub fn show_info_screen(
        &mut self,
        version: Version,
        ip: Ipv4Addr,
    ) -> Result<(), HatError<SPI::Error, O::Error>> {
        let text = info_screen_text(version, ip);
        self.show_text(&text)
    }

    // -----------------------------------------------------------------------
    // Firmware
    // -----------------------------------------------------------------------

    /// Exchange an empty frame, only to refresh [`buttons()`](Self::buttons).
    pub fn noop(&mut self) -> Result<(), HatError<SPI::Error, O::Error>> {
        self.send_command(Command::Noop)
    }

    /// Set how much the firmware prints on its debug console.
    pub fn set_verbosity(&mut self, level: LogLevel) -> Result<(), HatError<SPI::Error, O::Error>> {
        self.send_command(Command::SetDebugging(level))
    }

    /// Ask the firmware to print its main-loop state on its debug console.
    pub fn request_state_info(&mut self) -> Result<(), HatError<SPI::Error, O::Error>> {
        self.send_command(Command::RequestStateInfo)
    }

    /// Query the hat firmware version.
    ///
    /// The hat answers on the exchange after the request, so a no-op frame
    /// follows it to clock the answer out. That answer is not a button
    /// reply and leaves [`buttons()`](Self::buttons) untouched.
    ///
    /// Byte 0 value 2 means "joystick pressed" in a button reply and
    /// "firmware version" in a version reply. Firmware older than 2.5 never
    /// sends a version reply, so with the joystick held its button reply
    /// would pass for a version. The query is therefore refused whenever
    /// the reply to the request itself reports the joystick pressed.
    ///
    /// # Errors
    /// [`HatError::UnexpectedReply`] if the answer is not a firmware-version
    /// reply (firmware older than 2.5), or if the joystick was held during
    /// the request; release it and retry.
    pub fn firmware_version(&mut self) -> Result<Version, HatError<SPI::Error, O::Error>> {
        let request = Frame::command(Command::RequestFwVersion);
        let ack = self.exchange(Command::RequestFwVersion, &request)?;
        // Always clock the answer out so it cannot leak into a later button reply.
        let reply = self.exchange(Command::Noop, &Frame::command(Command::Noop))?;

        if ButtonState::decode(&ack).joystick_pressed {
            #[cfg(feature = "defmt")]
            defmt::warn!("Joystick held during firmware version request");
            #[cfg(feature = "log")]
            log::warn!("joystick held during firmware version request, reply is ambiguous");
            return Err(HatError::UnexpectedReply { code: ack[0] });
        }
        Version::decode_firmware(&reply).map_err(|code| HatError::UnexpectedReply { code })
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Give back the SPI device, control lines and delay source.
    pub fn release(self) -> (SPI, ControlPins<O, I>, D) {
        let (spi, delay) = self.driver.release();
        (spi, self.power.release(), delay)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn send_command(&mut self, command: Command) -> Result<(), HatError<SPI::Error, O::Error>> {
        self.send_frame(command, &[])
    }

    fn send_frame(
        &mut self,
        command: Command,
        payload: &[u8],
    ) -> Result<(), HatError<SPI::Error, O::Error>> {
        let frame = Frame::from_bytes(command, payload)?;
        self.send(command, &frame)
    }

    /// One exchange, followed by the servo settle time for commands that
    /// move the plate.
    fn send(&mut self, command: Command, frame: &Frame) -> Result<(), HatError<SPI::Error, O::Error>> {
        self.exchange(command, frame)?;
        if command.moves_actuators() {
            self.driver.delay_ms(self.config.servo_settle_ms);
        }
        Ok(())
    }

    /// Exchange `frame` (built for `command`). A normal reply refreshes the
    /// button state; the raw reply is returned either way.
    fn exchange(
        &mut self,
        command: Command,
        frame: &Frame,
    ) -> Result<[u8; FRAME_LEN], HatError<SPI::Error, O::Error>> {
        let reply = self.driver.exchange(frame).map_err(HatError::Bus)?;
        if self.expected_reply == ReplyKind::Normal {
            self.buttons = ButtonState::decode(&reply);
        }
        self.expected_reply = command.next_reply();
        Ok(reply)
    }
}
