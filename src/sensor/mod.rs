//! Sensor message handling: line decoding and color normalization
//!
//! The sensor emits one textual message per line:
//!
//! ```text
//! <red>,<green>,<blue>[;<intensity>][@]\r?\n
//! ```
//!
//! [`decode`] turns a line into a [`crate::types::RawSample`] or rejects it;
//! [`normalize`] turns a raw sample into a display-ready
//! [`crate::types::Rgb`], compensating for ambient light when the sensor
//! supplied an intensity reading.

pub mod decode;
pub mod normalize;

pub use decode::{decode, CAPTURE_FLAG};
pub use normalize::normalize;
