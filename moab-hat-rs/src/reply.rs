//! Decoding of hat → host frames.

use core::fmt;
use core::str::FromStr;

use crate::commands::{
    Button, ReplyKind, FRAME_LEN, JOYSTICK_SCALE, JOYSTICK_X_INDEX, JOYSTICK_Y_INDEX,
};
use crate::frame::to_signed;

/// Buttons and joystick as reported by the most recent exchange.
///
/// Overwritten wholesale by every normal reply; there is no history.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonState {
    /// Menu button held.
    pub menu_pressed: bool,
    /// Joystick pushed in.
    pub joystick_pressed: bool,
    /// Joystick X, normalised to roughly `[-1.0, 1.0]`.
    pub joystick_x: f32,
    /// Joystick Y, normalised to roughly `[-1.0, 1.0]`.
    pub joystick_y: f32,
}

impl ButtonState {
    /// Decode a normal reply.
    pub fn decode(reply: &[u8; FRAME_LEN]) -> Self {
        let button = Button::from_code(reply[0]);
        Self {
            menu_pressed: button == Some(Button::Menu),
            joystick_pressed: button == Some(Button::Joystick),
            joystick_x: joystick_axis(reply[JOYSTICK_X_INDEX]),
            joystick_y: joystick_axis(reply[JOYSTICK_Y_INDEX]),
        }
    }
}

fn joystick_axis(raw: u8) -> f32 {
    f32::from(to_signed(raw)) / JOYSTICK_SCALE
}

/// Version triple, used both for the hat firmware and the host software.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl Version {
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Decode a firmware-version reply: `[REPLY_FW_VERSION, major, minor,
    /// patch, ..]`.
    ///
    /// Returns the reply code as the error if the hat answered with
    /// anything else (firmware older than 2.5 never sends this reply).
    pub fn decode_firmware(reply: &[u8; FRAME_LEN]) -> Result<Self, u8> {
        if reply[0] != ReplyKind::FirmwareVersion.code() {
            return Err(reply[0]);
        }
        Ok(Self::new(reply[1], reply[2], reply[3]))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A version string was not of the form `major.minor.patch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VersionParseError;

impl fmt::Display for VersionParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("expected a version of the form MAJOR.MINOR.PATCH")
    }
}

impl core::error::Error for VersionParseError {}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let mut next = || -> Result<u8, VersionParseError> {
            parts
                .next()
                .and_then(|p| p.parse().ok())
                .ok_or(VersionParseError)
        };
        let version = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(VersionParseError);
        }
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_and_joystick_codes_are_exclusive() {
        let menu = ButtonState::decode(&[1, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(menu.menu_pressed);
        assert!(!menu.joystick_pressed);

        let joy = ButtonState::decode(&[2, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(!joy.menu_pressed);
        assert!(joy.joystick_pressed);

        let none = ButtonState::decode(&[0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(!none.menu_pressed && !none.joystick_pressed);

        let unknown = ButtonState::decode(&[9, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(!unknown.menu_pressed && !unknown.joystick_pressed);
    }

    #[test]
    fn joystick_bytes_are_signed_and_scaled() {
        let state = ButtonState::decode(&[0, 200, 50, 0, 0, 0, 0, 0, 0]);
        assert_eq!(state.joystick_x, -0.56);
        assert_eq!(state.joystick_y, 0.5);
    }

    #[test]
    fn joystick_extremes() {
        let state = ButtonState::decode(&[0, 100, 156, 0, 0, 0, 0, 0, 0]);
        assert_eq!(state.joystick_x, 1.0);
        assert_eq!(state.joystick_y, -1.0);
    }

    #[test]
    fn firmware_reply_decodes_triple() {
        let reply = [0x02, 3, 1, 4, 0, 0, 0, 0, 0];
        assert_eq!(Version::decode_firmware(&reply), Ok(Version::new(3, 1, 4)));
    }

    #[test]
    fn firmware_reply_with_wrong_code_is_rejected() {
        let reply = [0x01, 3, 1, 4, 0, 0, 0, 0, 0];
        assert_eq!(Version::decode_firmware(&reply), Err(0x01));
    }

    #[test]
    fn version_parses_dotted_triple() {
        assert_eq!("1.0.0".parse::<Version>(), Ok(Version::new(1, 0, 0)));
        assert_eq!(" 2.10.3\n".parse::<Version>(), Ok(Version::new(2, 10, 3)));
    }

    #[test]
    fn version_rejects_malformed_strings() {
        assert_eq!("1.0".parse::<Version>(), Err(VersionParseError));
        assert_eq!("1.0.0.0".parse::<Version>(), Err(VersionParseError));
        assert_eq!("1.x.0".parse::<Version>(), Err(VersionParseError));
        assert_eq!("300.0.0".parse::<Version>(), Err(VersionParseError));
    }

    #[test]
    fn version_displays_dotted() {
        let mut buf: heapless::String<16> = heapless::String::new();
        core::fmt::write(&mut buf, format_args!("{}", Version::new(1, 2, 3))).unwrap();
        assert_eq!(buf.as_str(), "1.2.3");
    }
}
