//! Scripted mock link for testing without sensor hardware
//!
//! The mock plays back a script of read outcomes (lines, timeouts, I/O
//! faults) and lets tests stage open failures and backlog sizes, so the
//! supervisor and the sample loop can be exercised against device churn,
//! garbled bursts and overruns deterministically.
//!
//! Only compiled for tests or with the `mock-link` feature:
//!
//! ```bash
//! cargo test --features mock-link
//! ```

use std::collections::VecDeque;

use crate::error::{Result, SwatchboothError};
use crate::link::SensorLink;

/// One scripted outcome of a `read_line` call
#[derive(Debug, Clone)]
pub enum MockRead {
    /// A complete line arrives (terminator included)
    Line(String),
    /// The read times out with no complete line
    Timeout,
    /// The device drops off the bus mid-read
    Fault,
}

/// A scripted stand-in for the serial sensor
#[derive(Debug, Default)]
pub struct MockLink {
    open: bool,
    /// Next N `open` calls fail with `NoDeviceFound`
    open_failures: u32,
    reads: VecDeque<MockRead>,
    backlog: u32,
    /// Successful opens observed (reconnect counting in tests)
    pub opens: u32,
    /// `discard_backlog` calls observed
    pub discards: u32,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a sequence of complete lines (terminators appended)
    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            let mut line = line.into();
            if !line.ends_with('\n') {
                line.push('\n');
            }
            self.reads.push_back(MockRead::Line(line));
        }
        self
    }

    /// Make the next `count` open attempts fail
    pub fn failing_opens(mut self, count: u32) -> Self {
        self.open_failures = count;
        self
    }

    /// Stage an unread backlog present from the first `backlog` call
    pub fn with_backlog(mut self, bytes: u32) -> Self {
        self.backlog = bytes;
        self
    }

    pub fn push_read(&mut self, read: MockRead) {
        self.reads.push_back(read);
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        let mut line = line.into();
        if !line.ends_with('\n') {
            line.push('\n');
        }
        self.reads.push_back(MockRead::Line(line));
    }

    /// Stage the unread-byte count the next `backlog` call reports
    pub fn set_backlog(&mut self, bytes: u32) {
        self.backlog = bytes;
    }

    pub fn remaining_reads(&self) -> usize {
        self.reads.len()
    }
}

impl SensorLink for MockLink {
    fn open(&mut self) -> Result<()> {
        if self.open_failures > 0 {
            self.open_failures -= 1;
            return Err(SwatchboothError::NoDeviceFound);
        }
        self.open = true;
        self.opens += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn backlog(&mut self) -> Result<u32> {
        self.ensure_open()?;
        Ok(self.backlog)
    }

    fn discard_backlog(&mut self) -> Result<u32> {
        self.ensure_open()?;
        self.discards += 1;
        let dropped = self.backlog;
        self.backlog = 0;
        Ok(dropped)
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        self.ensure_open()?;
        match self.reads.pop_front() {
            Some(MockRead::Line(line)) => Ok(Some(line)),
            Some(MockRead::Timeout) | None => Ok(None),
            Some(MockRead::Fault) => Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device unplugged",
            )
            .into()),
        }
    }

    fn port_name(&self) -> Option<&str> {
        self.open.then_some("/dev/ttyACM0")
    }
}

impl MockLink {
    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "sensor link not open",
            )
            .into())
        }
    }
}
