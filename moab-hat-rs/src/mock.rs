//! Recording fakes of the `embedded-hal` traits used by the driver.
//!
//! Every fake writes into one shared [`EventLog`], so tests can assert the
//! exact interleaving of line changes, delays and SPI frames.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::spi::{self, Operation, SpiDevice};

use crate::commands::FRAME_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    BootEnable,
    HatEnable,
    HatReset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Low(Line),
    High(Line),
    DelayUs(u32),
    Transfer([u8; FRAME_LEN]),
}

#[derive(Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<Event>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    /// Only the SPI frames, in transmission order.
    pub fn frames(&self) -> Vec<[u8; FRAME_LEN]> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Transfer(frame) => Some(*frame),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeError;

impl digital::Error for FakeError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

impl spi::Error for FakeError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

// ── GPIO ─────────────────────────────────────────────────────────────────

pub struct FakePin {
    line: Line,
    log: EventLog,
    fail: bool,
}

impl FakePin {
    pub fn new(line: Line, log: &EventLog) -> Self {
        Self {
            line,
            log: log.clone(),
            fail: false,
        }
    }

    /// A pin whose every write fails, like a line that was never granted.
    pub fn failing(line: Line, log: &EventLog) -> Self {
        Self {
            fail: true,
            ..Self::new(line, log)
        }
    }
}

impl digital::ErrorType for FakePin {
    type Error = FakeError;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), FakeError> {
        if self.fail {
            return Err(FakeError);
        }
        self.log.push(Event::Low(self.line));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), FakeError> {
        if self.fail {
            return Err(FakeError);
        }
        self.log.push(Event::High(self.line));
        Ok(())
    }
}

pub struct FakeInput {
    high: bool,
}

impl FakeInput {
    pub fn new(high: bool) -> Self {
        Self { high }
    }
}

impl digital::ErrorType for FakeInput {
    type Error = FakeError;
}

impl InputPin for FakeInput {
    fn is_high(&mut self) -> Result<bool, FakeError> {
        Ok(self.high)
    }

    fn is_low(&mut self) -> Result<bool, FakeError> {
        Ok(!self.high)
    }
}

// ── Delay ────────────────────────────────────────────────────────────────

pub struct FakeDelay {
    log: EventLog,
}

impl FakeDelay {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.push(Event::DelayUs(ns / 1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.log.push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.push(Event::DelayUs(ms * 1_000));
    }
}

// ── SPI ──────────────────────────────────────────────────────────────────

pub struct FakeSpi {
    log: EventLog,
    replies: VecDeque<[u8; FRAME_LEN]>,
    transfers: usize,
    fail_at: Option<usize>,
}

impl FakeSpi {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            replies: VecDeque::new(),
            transfers: 0,
            fail_at: None,
        }
    }

    /// Queue the bytes the hat answers with on a later exchange. Exchanges
    /// with nothing queued read back all zeros.
    pub fn reply(mut self, bytes: [u8; FRAME_LEN]) -> Self {
        self.replies.push_back(bytes);
        self
    }

    /// Fail the `n`-th transfer (0-based) without recording it.
    pub fn fail_at(mut self, n: usize) -> Self {
        self.fail_at = Some(n);
        self
    }

    fn clock(&mut self, write: &[u8], read: &mut [u8]) -> Result<(), FakeError> {
        let index = self.transfers;
        self.transfers += 1;
        if self.fail_at == Some(index) {
            return Err(FakeError);
        }

        let mut frame = [0u8; FRAME_LEN];
        frame.copy_from_slice(write);
        self.log.push(Event::Transfer(frame));

        let reply = self.replies.pop_front().unwrap_or([0; FRAME_LEN]);
        read.copy_from_slice(&reply[..read.len()]);
        Ok(())
    }
}

impl spi::ErrorType for FakeSpi {
    type Error = FakeError;
}

impl SpiDevice<u8> for FakeSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), FakeError> {
        for op in operations {
            match op {
                Operation::Transfer(read, write) => self.clock(write, read)?,
                Operation::TransferInPlace(words) => {
                    let write: Vec<u8> = words.to_vec();
                    self.clock(&write, words)?;
                }
                Operation::Write(_) | Operation::Read(_) | Operation::DelayNs(_) => {}
            }
        }
        Ok(())
    }
}
