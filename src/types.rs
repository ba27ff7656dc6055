//! Core data types for the swatchbooth kiosk
//!
//! This module contains the fundamental data structures used throughout
//! the application for representing sensor readings, colors, link state
//! and catalogue records.
//!
//! # Main Types
//!
//! - [`RawSample`] - One successfully parsed sensor line (channels still in
//!   sensor-native range)
//! - [`Rgb`] - A canonical 24-bit color, each channel clamped to 0-255
//! - [`LinkState`] - Connection lifecycle of the serial link
//! - [`CurrentColor`] - The process-wide "last observed color" cell
//! - [`SwatchRecord`] / [`ColorCategory`] - Operator-entered catalogue metadata
//! - [`SampleStats`] - Running counters published by the sample loop

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// A single sensor reading, produced once per successfully parsed line.
///
/// Channels keep the sensor-native range; clamping to 0-255 only happens
/// during normalization. The three channels are all-or-nothing: a line
/// missing any of them never produces a `RawSample` at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub red: u64,
    pub green: u64,
    pub blue: u64,
    /// Ambient light intensity; absent means "no compensation requested"
    pub intensity: Option<u64>,
    /// True when the trailing capture flag was present on the line
    pub capture: bool,
}

/// A canonical 24-bit RGB color.
///
/// Immutable once constructed from a [`RawSample`]; formatted as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack into the low 24 bits of a `u32` (`0x00rrggbb`)
    pub fn to_u32(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Unpack from the low 24 bits of a `u32`
    pub fn from_u32(v: u32) -> Self {
        Self {
            r: (v >> 16) as u8,
            g: (v >> 8) as u8,
            b: v as u8,
        }
    }

    /// The CSS-style hex string, e.g. `#ff0080`
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Connection lifecycle of the serial link.
///
/// Transitions happen only inside the connection supervisor; everyone else
/// observes state changes through [`crate::backend::KioskEvent::LinkStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LinkState {
    /// No open serial handle
    #[default]
    Disconnected,
    /// Resolving a port and opening it
    Connecting,
    /// Handle open and readable
    Connected,
    /// Backlog exceeded the overrun limit; discarding or awaiting restart
    Recovering,
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkState::Disconnected => write!(f, "disconnected"),
            LinkState::Connecting => write!(f, "connecting"),
            LinkState::Connected => write!(f, "connected"),
            LinkState::Recovering => write!(f, "recovering"),
        }
    }
}

/// Sentinel for "no color observed yet"; real colors only use 24 bits.
const NO_COLOR: u32 = u32::MAX;

/// The process-wide "last observed color" cell.
///
/// Written by the sample loop on every successful decode and readable from
/// any thread at an arbitrary later instant (e.g. when the operator opens
/// the catalogue form after scanning). A lock-free atomic is sufficient
/// because the sample loop is the only writer.
#[derive(Debug, Clone, Default)]
pub struct CurrentColor(Arc<AtomicU32>);

impl CurrentColor {
    pub fn new() -> Self {
        Self(Arc::new(AtomicU32::new(NO_COLOR)))
    }

    /// The last color shown on the display, if any sample decoded yet
    pub fn get(&self) -> Option<Rgb> {
        match self.0.load(Ordering::Relaxed) {
            NO_COLOR => None,
            v => Some(Rgb::from_u32(v)),
        }
    }

    pub fn set(&self, color: Rgb) {
        self.0.store(color.to_u32(), Ordering::Relaxed);
    }
}

/// Coarse color category for the catalogue form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorCategory {
    Yellow,
    Orange,
    Red,
    Pink,
    LightGreen,
    DarkGreen,
    LightBlue,
    DarkBlue,
    Brown,
    Black,
    Other,
}

impl ColorCategory {
    /// All categories in form display order
    pub const ALL: [ColorCategory; 11] = [
        ColorCategory::Yellow,
        ColorCategory::Orange,
        ColorCategory::Red,
        ColorCategory::Pink,
        ColorCategory::LightGreen,
        ColorCategory::DarkGreen,
        ColorCategory::LightBlue,
        ColorCategory::DarkBlue,
        ColorCategory::Brown,
        ColorCategory::Black,
        ColorCategory::Other,
    ];
}

/// One catalogued pigment sample, as entered by the operator.
///
/// Only `author` and the scanned color are mandatory; everything else is
/// optional form input. Consumed through the [`crate::station::RecordStore`]
/// seam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwatchRecord {
    pub author: String,
    pub hex: Rgb,
    pub name: Option<String>,
    pub category: Option<ColorCategory>,
    pub drawer: Option<u8>,
    pub location: Option<String>,
    pub recorded_at: chrono::DateTime<chrono::Local>,
    pub comment: Option<String>,
}

impl SwatchRecord {
    /// Create a record with the mandatory fields, timestamped now
    pub fn new(author: impl Into<String>, hex: Rgb) -> Self {
        Self {
            author: author.into(),
            hex,
            name: None,
            category: None,
            drawer: None,
            location: None,
            recorded_at: chrono::Local::now(),
            comment: None,
        }
    }
}

/// Running counters for the sample loop, published periodically as
/// [`crate::backend::KioskEvent::Stats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleStats {
    /// Lines that decoded into a sample
    pub lines_decoded: u64,
    /// Lines rejected by the decoder (expected, frequent)
    pub lines_rejected: u64,
    /// Successful reconnections after a fault
    pub reconnects: u64,
    /// Overrun recoveries performed
    pub overruns: u64,
    /// Total backlog bytes dropped during overrun recovery
    pub bytes_discarded: u64,
    /// Capture/print events emitted
    pub captures: u64,
    /// Events dropped because the frontend queue was full
    pub dropped_events: u64,
}

impl SampleStats {
    /// Fraction of lines that decoded, in [0, 1]; 1.0 when nothing arrived yet
    pub fn decode_ratio(&self) -> f64 {
        let total = self.lines_decoded + self.lines_rejected;
        if total == 0 {
            1.0
        } else {
            self.lines_decoded as f64 / total as f64
        }
    }
}
