//! moab-hat
//!
//! Raspberry Pi front end for the Moab hat. Each invocation:
//!
//! 1. Opens `/dev/spidev<bus>.<device>` and requests the four control lines
//!    from the GPIO character device.
//! 2. Runs the power-up sequence that moves the hat from its bootloader
//!    into the application firmware.
//! 3. Performs one action (display, servos, input polling, firmware query).
//! 4. Drops the hat, which closes the bus and releases the lines, on success
//!    and on error alike.
//!
//! Logging goes through `env_logger`; set `RUST_LOG=trace` to see every
//! frame on the bus.

mod board;
mod cli;
mod host_info;

use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use moab_hat::HatError;

use crate::board::PiHat;
use crate::cli::{Action, Cli};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut hat = board::open_hat(&cli.board)?;
    log::info!("hat ready");

    run(&mut hat, cli.command)
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

fn run(hat: &mut PiHat, action: Action) -> Result<()> {
    match action {
        Action::Info => {
            let version = host_info::software_version()?;
            let ip = host_info::local_ipv4()?;
            log::info!("software {version}, address {ip}");
            hat.show_info_screen(version, ip).map_err(hat_error)?;
        }
        Action::Text { text } => hat.show_text(&text).map_err(hat_error)?,
        Action::Icon { icon, text } => hat.show_icon_and_text(icon, text).map_err(hat_error)?,
        Action::Angle { x, y } => hat.set_angles(x, y).map_err(hat_error)?,
        Action::Servos {
            servo1,
            servo2,
            servo3,
        } => hat.set_servos(servo1, servo2, servo3).map_err(hat_error)?,
        Action::Hover => hat.hover().map_err(hat_error)?,
        Action::Lower => hat.lower().map_err(hat_error)?,
        Action::Enable => hat.enable_servos().map_err(hat_error)?,
        Action::Disable => hat.disable_servos().map_err(hat_error)?,
        Action::Poll { count, interval_ms } => poll(hat, count, interval_ms)?,
        Action::Version => {
            let version = hat
                .firmware_version()
                .map_err(hat_error)
                .context("firmware did not report a version (older than 2.5?)")?;
            println!("{version}");
        }
        Action::Verbosity { level } => hat.set_verbosity(level).map_err(hat_error)?,
        Action::StateInfo => hat.request_state_info().map_err(hat_error)?,
    }
    Ok(())
}

/// Print one line of input state per exchange. `count = None` runs until
/// the process is killed.
fn poll(hat: &mut PiHat, count: Option<u64>, interval_ms: u64) -> Result<()> {
    let interval = Duration::from_millis(interval_ms);
    let mut sample = 0u64;

    while count.map_or(true, |n| sample < n) {
        hat.noop().map_err(hat_error)?;
        let buttons = hat.buttons();
        let power = hat.power_button_pressed().map_err(hat_error)?;
        println!(
            "menu={} joystick={} x={:+.2} y={:+.2} power={}",
            u8::from(buttons.menu_pressed),
            u8::from(buttons.joystick_pressed),
            buttons.joystick_x,
            buttons.joystick_y,
            u8::from(power),
        );

        sample += 1;
        thread::sleep(interval);
    }
    Ok(())
}

/// Flatten a driver error into `anyhow`, keeping its message.
fn hat_error<S: std::fmt::Debug, P: std::fmt::Debug>(error: HatError<S, P>) -> anyhow::Error {
    anyhow!("{error}")
}
