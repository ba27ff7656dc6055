//! Collaborator seams for the capture flow
//!
//! Rendering, card printing and catalogue persistence live outside the
//! sampling core. The core only ever talks to them through the narrow
//! traits here; the reference implementations ([`LogPrinter`],
//! [`MemoryStore`]) are enough for a kiosk running without a printer or a
//! database attached.

use crate::error::Result;
use crate::types::{Rgb, SwatchRecord};

#[cfg(test)]
use mockall::automock;

/// Produces a physical swatch card for a captured color
#[cfg_attr(test, automock)]
pub trait SwatchPrinter: Send {
    fn print(&mut self, record: &SwatchRecord) -> Result<()>;
}

/// Persists catalogued swatch records
#[cfg_attr(test, automock)]
pub trait RecordStore: Send {
    fn insert(&mut self, record: SwatchRecord) -> Result<()>;
    /// Most recent records, newest first
    fn recent(&self, limit: usize) -> Result<Vec<SwatchRecord>>;
}

/// Printer that only logs; the default when no print spooler is wired up
#[derive(Debug, Default)]
pub struct LogPrinter;

impl SwatchPrinter for LogPrinter {
    fn print(&mut self, record: &SwatchRecord) -> Result<()> {
        tracing::info!("swatch card: {} catalogued by {}", record.hex, record.author);
        Ok(())
    }
}

/// In-memory record store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<SwatchRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn insert(&mut self, record: SwatchRecord) -> Result<()> {
        self.records.push(record);
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<SwatchRecord>> {
        Ok(self.records.iter().rev().take(limit).cloned().collect())
    }
}

/// Runs the capture flow for flagged samples: build the record, print the
/// card, file the record
pub struct CaptureStation {
    printer: Box<dyn SwatchPrinter>,
    store: Box<dyn RecordStore>,
    author: String,
}

impl CaptureStation {
    pub fn new(
        printer: Box<dyn SwatchPrinter>,
        store: Box<dyn RecordStore>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            printer,
            store,
            author: author.into(),
        }
    }

    /// Handle one captured color.
    ///
    /// Printing is fire-and-forget: a dead printer must not lose the
    /// record, so print failures are logged and the insert still happens.
    pub fn handle_capture(&mut self, color: Rgb) -> Result<()> {
        let record = SwatchRecord::new(&self.author, color);

        if let Err(e) = self.printer.print(&record) {
            tracing::warn!("swatch print failed: {}", e);
        }

        self.store.insert(record)
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<SwatchRecord>> {
        self.store.recent(limit)
    }
}
