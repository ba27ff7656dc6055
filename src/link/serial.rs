//! `serialport`-backed sensor link
//!
//! Wraps a `Box<dyn serialport::SerialPort>` with line buffering. Reads
//! are chunked into an internal buffer and handed out one `\n`-terminated
//! line at a time; a read timeout without a complete line is reported as
//! `Ok(None)` so the sample loop can re-check link health between lines.

use std::io::Read;
use std::time::{Duration, Instant};

use crate::config::SerialConfig;
use crate::error::Result;
use crate::link::{ports, SensorLink};

/// Ceiling on buffered partial-line bytes; a line this long is garble
const MAX_PENDING: usize = 1024;

/// The real serial connection to the color sensor
pub struct SerialLink {
    patterns: Vec<String>,
    baud_rate: u32,
    read_timeout: Duration,
    port: Option<Box<dyn serialport::SerialPort>>,
    name: Option<String>,
    /// Bytes read from the port but not yet returned as a line
    pending: Vec<u8>,
}

impl SerialLink {
    pub fn new(config: &SerialConfig) -> Self {
        Self {
            patterns: config.port_patterns.clone(),
            baud_rate: config.baud_rate,
            read_timeout: config.read_timeout(),
            port: None,
            name: None,
            pending: Vec::new(),
        }
    }

    /// Pop one terminator-included line off the pending buffer
    fn take_line(&mut self) -> Option<String> {
        let pos = self.pending.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=pos).collect();
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

impl SensorLink for SerialLink {
    fn open(&mut self) -> Result<()> {
        let name = ports::resolve(&self.patterns)?;
        let port = serialport::new(&name, self.baud_rate)
            .timeout(self.read_timeout)
            .open()?;

        self.pending.clear();
        tracing::info!("connected to sensor on {} at {} baud", name, self.baud_rate);
        self.name = Some(name);
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(name) = self.name.take() {
            tracing::info!("closing sensor link on {}", name);
        }
        self.port = None;
        self.pending.clear();
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn backlog(&mut self) -> Result<u32> {
        let port = self.port.as_mut().ok_or_else(closed)?;
        Ok(port.bytes_to_read()?)
    }

    fn discard_backlog(&mut self) -> Result<u32> {
        let port = self.port.as_mut().ok_or_else(closed)?;
        let unread = port.bytes_to_read()?;
        port.clear(serialport::ClearBuffer::Input)?;
        let buffered = self.pending.len() as u32;
        self.pending.clear();
        Ok(unread + buffered)
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.take_line() {
            return Ok(Some(line));
        }

        let deadline = Instant::now() + self.read_timeout;
        let mut buf = [0u8; 64];
        loop {
            let port = self.port.as_mut().ok_or_else(closed)?;
            match port.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(n) => {
                    self.pending.extend_from_slice(&buf[..n]);
                    if let Some(line) = self.take_line() {
                        return Ok(Some(line));
                    }
                    if self.pending.len() > MAX_PENDING {
                        // Terminator-free garble; drop it rather than grow
                        tracing::debug!("dropping {} unterminated bytes", self.pending.len());
                        self.pending.clear();
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => return Ok(None),
                Err(e) => return Err(e.into()),
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
        }
    }

    fn port_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

fn closed() -> crate::error::SwatchboothError {
    std::io::Error::new(std::io::ErrorKind::NotConnected, "sensor link not open").into()
}
