//! Serial sensor link abstraction
//!
//! This module provides a common trait for the serial connection to the
//! color sensor, enabling both the real `serialport`-backed link and a
//! scripted mock for testing.
//!
//! The trait is the only way the rest of the crate touches the serial
//! handle: the connection supervisor owns a `Box<dyn SensorLink>` and no
//! other component reads from the device directly.

pub mod ports;
pub mod serial;

#[cfg(any(test, feature = "mock-link"))]
pub mod mock;

pub use ports::resolve;
pub use serial::SerialLink;

#[cfg(any(test, feature = "mock-link"))]
pub use mock::{MockLink, MockRead};

use crate::error::Result;

/// Unified interface for the sensor's serial connection.
///
/// Implementations must be `Send` so the link can live on the sampler
/// thread. All methods may be called regardless of state; operations on a
/// closed link fail with a link fault rather than panicking.
pub trait SensorLink: Send {
    /// Resolve a device and open it.
    ///
    /// Re-resolves the port on every call: the set of plugged-in devices
    /// may have changed since the last attempt. Opening also discards any
    /// partial-line state from a previous connection.
    fn open(&mut self) -> Result<()>;

    /// Close the connection, dropping the handle and buffered bytes
    fn close(&mut self);

    /// Whether a handle is currently open
    fn is_open(&self) -> bool;

    /// Bytes received by the port but not yet consumed by the reader
    fn backlog(&mut self) -> Result<u32>;

    /// Drop all unread bytes, including any buffered partial line.
    /// Returns the number of bytes discarded.
    fn discard_backlog(&mut self) -> Result<u32>;

    /// Read one line, terminator included.
    ///
    /// Blocks until a terminator arrives or the read timeout elapses;
    /// `Ok(None)` means no complete line within the timeout, which is not
    /// a fault. Returned strings always end in `\n`.
    fn read_line(&mut self) -> Result<Option<String>>;

    /// Name of the resolved device, when open
    fn port_name(&self) -> Option<&str>;
}
