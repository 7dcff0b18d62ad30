//! Opcodes, reply codes and protocol constants for the Moab hat.
//!
//! Host → hat opcodes and hat → host reply codes share overlapping numeric
//! ranges on the wire. They are kept in two separate closed types,
//! [`Command`] and [`ReplyKind`], and are only ever interpreted by
//! direction.

// ---------------------------------------------------------------------------
// Framing
// ---------------------------------------------------------------------------

/// Total length of every frame exchanged on the bus (opcode + payload).
pub const FRAME_LEN: usize = 9;

/// Number of payload bytes following the opcode.
pub const PAYLOAD_LEN: usize = FRAME_LEN - 1;

/// Upper bound on an arbitrary display message, terminator included.
pub const MAX_MESSAGE_LEN: usize = 256;

/// Reply byte holding the signed joystick X reading.
pub const JOYSTICK_X_INDEX: usize = 1;

/// Reply byte holding the signed joystick Y reading.
pub const JOYSTICK_Y_INDEX: usize = 2;

/// Divisor normalising a signed joystick byte to roughly `[-1.0, 1.0]`.
pub const JOYSTICK_SCALE: f32 = 100.0;

// ---------------------------------------------------------------------------
// Host → hat
// ---------------------------------------------------------------------------

/// Firmware log verbosity, sent as one of the `SET_DEBUGGING_*` opcodes.
///
/// Level 0 doubles as "off": the firmware prints only emergencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LogLevel {
    /// Emergencies only (also used to silence the firmware).
    Emergency = 0,
    /// Actions that must be taken immediately.
    Alert = 1,
    /// Critical conditions.
    Critical = 2,
    /// Errors.
    Error = 3,
    /// Warnings.
    Warning = 4,
    /// Normal but significant conditions.
    Notice = 5,
    /// Informational messages.
    Info = 6,
    /// Everything the firmware can print.
    Debug = 7,
}

impl LogLevel {
    /// Alias for [`LogLevel::Emergency`]; the firmware has no quieter level.
    pub const OFF: Self = Self::Emergency;

    /// All levels, quietest first.
    pub const ALL: [Self; 8] = [
        Self::Emergency,
        Self::Alert,
        Self::Critical,
        Self::Error,
        Self::Warning,
        Self::Notice,
        Self::Info,
        Self::Debug,
    ];
}

impl TryFrom<u8> for LogLevel {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        Self::ALL.get(usize::from(value)).copied().ok_or(value)
    }
}

/// Host → hat opcodes (byte 0 of every outgoing frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Do nothing; the reply still carries button and joystick state.
    Noop,
    /// Power the servos and track plate angles.
    ServoEnable,
    /// Cut power to the servos.
    ServoDisable,
    /// Control-loop metadata (unused by the host driver so far).
    ControlInfo,
    /// Payload bytes 1–2 are the plate X/Y angles in signed degrees.
    SetPlateAngles,
    /// Payload bytes 1–3 are raw servo positions.
    SetServos,
    /// Payload bytes 1–2 select a built-in icon and text.
    TextIconSelect,
    /// Show whatever has been accumulated in the text buffer.
    DisplayBuffer,
    /// Change the firmware's log verbosity.
    SetDebugging(LogLevel),
    /// Ask the firmware to print its main-loop state.
    RequestStateInfo,
    /// Ask for the firmware version (firmware < 2.5 never answers).
    RequestFwVersion,
    /// One 8-byte chunk of an arbitrary message for the text buffer.
    ArbitraryMessage,
}

impl Command {
    /// Base opcode of the `SET_DEBUGGING_*` range; the level is added to it.
    const SET_DEBUGGING_BASE: u8 = 0x40;

    /// Wire value of this opcode.
    pub const fn code(self) -> u8 {
        match self {
            Command::Noop => 0x00,
            Command::ServoEnable => 0x01,
            Command::ServoDisable => 0x02,
            Command::ControlInfo => 0x03,
            Command::SetPlateAngles => 0x04,
            Command::SetServos => 0x05,
            Command::TextIconSelect => 0x06,
            Command::DisplayBuffer => 0x07,
            Command::SetDebugging(level) => Self::SET_DEBUGGING_BASE | level as u8,
            Command::RequestStateInfo => 0x4E,
            Command::RequestFwVersion => 0x4F,
            Command::ArbitraryMessage => 0x80,
        }
    }

    /// `true` for commands that move the plate and need the settle delay.
    pub const fn moves_actuators(self) -> bool {
        matches!(self, Command::SetPlateAngles | Command::SetServos)
    }

    /// Kind of reply the hat sends on the exchange *after* this command.
    pub const fn next_reply(self) -> ReplyKind {
        match self {
            Command::RequestFwVersion => ReplyKind::FirmwareVersion,
            _ => ReplyKind::Normal,
        }
    }
}

// ---------------------------------------------------------------------------
// Hat → host
// ---------------------------------------------------------------------------

/// Reply kinds the hat can send back in byte 0.
///
/// Byte 0 of a normal reply is reused for the [`Button`] code, so the kind
/// is decided by what the host asked for ([`Command::next_reply`]), never
/// by the byte alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReplyKind {
    /// Buttons and joystick.
    Normal,
    /// Firmware version triple in bytes 1–3.
    FirmwareVersion,
}

impl ReplyKind {
    /// Wire value of this reply kind.
    pub const fn code(self) -> u8 {
        match self {
            ReplyKind::Normal => 0x01,
            ReplyKind::FirmwareVersion => 0x02,
        }
    }
}

/// Button codes carried in byte 0 of a normal reply.
///
/// Only one button can be reported per reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// The menu button.
    Menu,
    /// The joystick push button.
    Joystick,
}

impl Button {
    /// Decode byte 0 of a normal reply. Any other code means "no button".
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Button::Menu),
            2 => Some(Button::Joystick),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in display content
// ---------------------------------------------------------------------------

/// Icons built into the hat firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Icon {
    Blank = 0,
    UpDown = 1,
    Down = 2,
    Up = 3,
    Dot = 4,
    Pause = 5,
    Check = 6,
    X = 7,
}

impl TryFrom<u8> for Icon {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        Ok(match value {
            0 => Icon::Blank,
            1 => Icon::UpDown,
            2 => Icon::Down,
            3 => Icon::Up,
            4 => Icon::Dot,
            5 => Icon::Pause,
            6 => Icon::Check,
            7 => Icon::X,
            other => return Err(other),
        })
    }
}

/// Text screens built into the hat firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Text {
    Blank = 0,
    Init = 1,
    PowerOff = 2,
    Error = 3,
    Cal = 4,
    Manual = 5,
    Classic = 6,
    Brain = 7,
    Custom1 = 8,
    Custom2 = 9,
    Info = 10,
    CalInstr = 11,
    CalComplete = 12,
    CalCanceled = 13,
    CalFailed = 14,
    VersIpSn = 15,
    UpdateBrain = 16,
    UpdateSystem = 17,
}

impl TryFrom<u8> for Text {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        Ok(match value {
            0 => Text::Blank,
            1 => Text::Init,
            2 => Text::PowerOff,
            3 => Text::Error,
            4 => Text::Cal,
            5 => Text::Manual,
            6 => Text::Classic,
            7 => Text::Brain,
            8 => Text::Custom1,
            9 => Text::Custom2,
            10 => Text::Info,
            11 => Text::CalInstr,
            12 => Text::CalComplete,
            13 => Text::CalCanceled,
            14 => Text::CalFailed,
            15 => Text::VersIpSn,
            16 => Text::UpdateBrain,
            17 => Text::UpdateSystem,
            other => return Err(other),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
