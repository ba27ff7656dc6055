//! # Swatchbooth: pigment catalogue kiosk core
//!
//! Sampling core for a museum kiosk that reads RGB samples from a
//! hand-held color sensor over a serial line, shows the last observed
//! color and, on a flagged sample, kicks off the swatch-card capture
//! flow. The architecture separates the serial sampling backend from the
//! kiosk frontend:
//!
//! - **Backend**: Polls the sensor link on a separate thread: resolve the
//!   port, decode lines, normalize colors, supervise reconnects and
//!   overrun recovery
//! - **Frontend**: Whatever renders the kiosk (out of scope here); talks
//!   to the backend through [`backend::FrontendHandle`]
//! - **Station**: Narrow seams for the printer and the record store
//! - **Communication**: Crossbeam channels for thread-safe data transfer,
//!   plus a lock-free "last observed color" cell
//!
//! ## Configuration
//!
//! Settings are stored as TOML in the platform-appropriate data directory
//! under `rs.swatchbooth`:
//!
//! - **Linux**: `~/.local/share/rs.swatchbooth/swatchbooth.toml`
//! - **macOS**: `~/Library/Application Support/rs.swatchbooth/swatchbooth.toml`
//! - **Windows**: `%APPDATA%\rs.swatchbooth\swatchbooth.toml`
//!
//! ## Example
//!
//! ```ignore
//! use swatchbooth::{
//!     backend::{KioskEvent, SamplerBackend},
//!     config::AppConfig,
//! };
//!
//! fn main() {
//!     let config = AppConfig::load_or_default();
//!     let (backend, frontend) = SamplerBackend::new(config);
//!
//!     std::thread::spawn(move || backend.run());
//!
//!     loop {
//!         for event in frontend.drain() {
//!             match event {
//!                 KioskEvent::ColorUpdate(color) => { /* paint the screen */ }
//!                 KioskEvent::CaptureRequested(color) => { /* print a card */ }
//!                 _ => {}
//!             }
//!         }
//!     }
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod link;
pub mod sensor;
pub mod station;
pub mod types;

// Re-export commonly used types
pub use backend::{FrontendHandle, KioskCommand, KioskEvent, SamplerBackend};
pub use config::{AppConfig, OverrunStrategy};
pub use error::{Result, SwatchboothError};
pub use types::{CurrentColor, LinkState, RawSample, Rgb, SwatchRecord};
