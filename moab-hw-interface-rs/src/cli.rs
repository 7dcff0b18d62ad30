//! Command-line surface of the `moab-hat` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use moab_hat::{
    Icon, LogLevel, ServoOffsets, Text, DEFAULT_SPI_BUS, DEFAULT_SPI_DEVICE, DEFAULT_SPI_SPEED_HZ,
};

/// Drive the Moab hat from a Raspberry Pi.
#[derive(Debug, Parser)]
#[command(name = "moab-hat", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub board: BoardArgs,

    #[command(subcommand)]
    pub command: Action,
}

/// Where the hat is wired and how it is calibrated.
#[derive(Debug, Clone, Args)]
pub struct BoardArgs {
    /// SPI bus index (`/dev/spidev<BUS>.<DEVICE>`).
    #[arg(long, env = "MOAB_SPI_BUS", default_value_t = DEFAULT_SPI_BUS)]
    pub spi_bus: u8,

    /// SPI chip-select index.
    #[arg(long, env = "MOAB_SPI_DEVICE", default_value_t = DEFAULT_SPI_DEVICE)]
    pub spi_device: u8,

    /// SPI clock in Hz.
    #[arg(long, env = "MOAB_SPI_SPEED_HZ", default_value_t = DEFAULT_SPI_SPEED_HZ)]
    pub spi_speed_hz: u32,

    /// GPIO character device carrying the hat control lines.
    #[arg(long, env = "MOAB_GPIO_CHIP", default_value = "/dev/gpiochip0")]
    pub gpio_chip: PathBuf,

    /// Servo calibration offsets as `S1,S2,S3`.
    #[arg(
        long,
        env = "MOAB_SERVO_OFFSETS",
        default_value = "0,0,0",
        value_parser = parse_servo_offsets,
        allow_hyphen_values = true
    )]
    pub servo_offsets: ServoOffsets,
}

#[derive(Debug, Subcommand)]
pub enum Action {
    /// Show project name, software version and IP address.
    Info,

    /// Show arbitrary text (uppercased, at most 255 bytes).
    Text { text: String },

    /// Show a built-in icon and text screen by index.
    Icon {
        /// Icon index, 0-7.
        #[arg(value_parser = parse_icon)]
        icon: Icon,
        /// Text index, 0-17.
        #[arg(value_parser = parse_text)]
        text: Text,
    },

    /// Tilt the plate to X/Y degrees (servo offsets applied).
    Angle {
        #[arg(allow_negative_numbers = true)]
        x: i8,
        #[arg(allow_negative_numbers = true)]
        y: i8,
    },

    /// Drive the servos to raw positions (no offsets).
    Servos { servo1: u8, servo2: u8, servo3: u8 },

    /// Hold the plate just above its lowest position.
    Hover,

    /// Lower the plate fully.
    Lower,

    /// Power the servos.
    Enable,

    /// Cut power to the servos.
    Disable,

    /// Print button and joystick state at a fixed interval.
    Poll {
        /// Number of samples; runs until interrupted if omitted.
        #[arg(long)]
        count: Option<u64>,
        /// Pause between samples in milliseconds.
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,
    },

    /// Print the hat firmware version.
    Version,

    /// Set the firmware console verbosity, 0 (off) to 7 (debug).
    Verbosity {
        #[arg(value_parser = parse_log_level)]
        level: LogLevel,
    },

    /// Ask the firmware to print its state on its debug console.
    StateInfo,
}

fn parse_servo_offsets(s: &str) -> Result<ServoOffsets, String> {
    let values: Vec<i8> = s
        .split(',')
        .map(|v| v.trim().parse::<i8>().map_err(|e| format!("{v:?}: {e}")))
        .collect::<Result<_, _>>()?;
    match values[..] {
        [a, b, c] => Ok(ServoOffsets::new(a, b, c)),
        _ => Err(format!("expected three offsets, got {}", values.len())),
    }
}

fn parse_index<T: TryFrom<u8, Error = u8>>(s: &str, what: &str) -> Result<T, String> {
    let index: u8 = s.parse().map_err(|e| format!("{s:?}: {e}"))?;
    T::try_from(index).map_err(|i| format!("no {what} with index {i}"))
}

fn parse_icon(s: &str) -> Result<Icon, String> {
    parse_index(s, "icon")
}

fn parse_text(s: &str) -> Result<Text, String> {
    parse_index(s, "text")
}

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    parse_index(s, "log level")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("moab-hat").chain(args.iter().copied()))
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_library() {
        let cli = parse(&["hover"]).unwrap();
        assert_eq!(cli.board.spi_bus, DEFAULT_SPI_BUS);
        assert_eq!(cli.board.spi_device, DEFAULT_SPI_DEVICE);
        assert_eq!(cli.board.spi_speed_hz, DEFAULT_SPI_SPEED_HZ);
        assert_eq!(cli.board.servo_offsets, ServoOffsets::default());
        assert!(matches!(cli.command, Action::Hover));
    }

    #[test]
    fn negative_angles_are_values() {
        let cli = parse(&["angle", "-5", "12"]).unwrap();
        assert!(matches!(cli.command, Action::Angle { x: -5, y: 12 }));
    }

    #[test]
    fn servo_offsets_flag() {
        let cli = parse(&["--servo-offsets", "-1,0,2", "lower"]).unwrap();
        assert_eq!(cli.board.servo_offsets, ServoOffsets::new(-1, 0, 2));
    }

    #[test]
    fn malformed_servo_offsets_are_rejected() {
        assert!(parse(&["--servo-offsets", "1,2", "lower"]).is_err());
        assert!(parse(&["--servo-offsets", "1,2,x", "lower"]).is_err());
    }

    #[test]
    fn icon_and_text_by_index() {
        let cli = parse(&["icon", "6", "12"]).unwrap();
        assert!(matches!(
            cli.command,
            Action::Icon {
                icon: Icon::Check,
                text: Text::CalComplete
            }
        ));
        assert!(parse(&["icon", "8", "0"]).is_err());
    }

    #[test]
    fn raw_servo_values_above_127() {
        let cli = parse(&["servos", "150", "155", "200"]).unwrap();
        assert!(matches!(
            cli.command,
            Action::Servos {
                servo1: 150,
                servo2: 155,
                servo3: 200
            }
        ));
    }

    #[test]
    fn poll_options() {
        let cli = parse(&["poll", "--count", "3", "--interval-ms", "20"]).unwrap();
        assert!(matches!(
            cli.command,
            Action::Poll {
                count: Some(3),
                interval_ms: 20
            }
        ));
    }

    #[test]
    fn verbosity_levels() {
        let cli = parse(&["verbosity", "7"]).unwrap();
        assert!(matches!(
            cli.command,
            Action::Verbosity {
                level: LogLevel::Debug
            }
        ));
        assert!(parse(&["verbosity", "8"]).is_err());
    }

    #[test]
    fn text_takes_one_argument() {
        let cli = parse(&["text", "hello moab"]).unwrap();
        match cli.command {
            Action::Text { text } => assert_eq!(text, "hello moab"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
