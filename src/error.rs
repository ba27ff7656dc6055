//! Error handling for the swatchbooth kiosk
//!
//! This module defines custom error types and a Result alias for use
//! throughout the application.
//!
//! Note that a malformed sensor line is *not* an error: garbled lines are
//! expected transient noise on the link, so the decoder reports rejection
//! as an ordinary value (see [`crate::sensor::decode`]).

use thiserror::Error;

/// Main error type for swatchbooth operations
#[derive(Error, Debug)]
pub enum SwatchboothError {
    /// No serial device matching the configured patterns is attached
    #[error("no matching serial device found")]
    NoDeviceFound,

    /// Errors reported by the serial port layer
    #[error("serial link error: {0}")]
    Link(#[from] serialport::Error),

    /// IO errors (reads/writes on an open link)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors related to configuration loading/saving
    #[error("configuration error: {0}")]
    Config(String),

    /// Errors related to channel communication
    #[error("channel error: {0}")]
    Channel(String),

    /// Errors reported by the printing collaborator
    #[error("printer error: {0}")]
    Printer(String),

    /// Errors reported by the persistence collaborator
    #[error("storage error: {0}")]
    Storage(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SwatchboothError>,
    },
}

impl SwatchboothError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SwatchboothError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// True for faults the supervisor recovers from by closing the link
    /// and retrying after the reconnect backoff.
    pub fn is_link_fault(&self) -> bool {
        match self {
            SwatchboothError::NoDeviceFound
            | SwatchboothError::Link(_)
            | SwatchboothError::Io(_) => true,
            SwatchboothError::WithContext { source, .. } => source.is_link_fault(),
            _ => false,
        }
    }
}

/// Result type alias for swatchbooth operations
pub type Result<T> = std::result::Result<T, SwatchboothError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SwatchboothError::Config("missing baud rate".to_string());
        assert_eq!(err.to_string(), "configuration error: missing baud rate");
    }

    #[test]
    fn test_error_with_context() {
        let err = SwatchboothError::NoDeviceFound;
        let with_ctx = err.with_context("resolving sensor port");
        assert!(with_ctx.to_string().contains("resolving sensor port"));
    }

    #[test]
    fn test_link_fault_classification() {
        assert!(SwatchboothError::NoDeviceFound.is_link_fault());
        let io = SwatchboothError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "unplugged",
        ));
        assert!(io.is_link_fault());
        assert!(io.with_context("reading line").is_link_fault());
        assert!(!SwatchboothError::Config("bad".into()).is_link_fault());
    }
}
