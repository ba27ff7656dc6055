//! Color normalizer: raw channels to a canonical 24-bit color
//!
//! When the sensor supplies an ambient intensity reading, each channel is
//! rescaled as `channel / intensity * 255` (truncating toward zero) so that
//! samples taken under different lighting produce comparable brightness.
//! The formula assumes intensity is monotonic with exposure and channels
//! are linear; no gamma correction is applied.

use crate::types::{RawSample, Rgb};

/// Convert a raw sample into a display-ready color.
///
/// Total function: out-of-range channels clamp to 255 and an intensity of
/// zero is treated as one, so normalization never rejects a sample that
/// the decoder accepted.
pub fn normalize(sample: RawSample) -> Rgb {
    match sample.intensity {
        Some(intensity) => {
            let intensity = intensity.max(1);
            Rgb::new(
                rescale(sample.red, intensity),
                rescale(sample.green, intensity),
                rescale(sample.blue, intensity),
            )
        }
        None => Rgb::new(
            clamp(sample.red),
            clamp(sample.green),
            clamp(sample.blue),
        ),
    }
}

fn rescale(channel: u64, intensity: u64) -> u8 {
    // f64 keeps the original truncate-toward-zero semantics; channel and
    // intensity are far below 2^52 in practice so no precision is lost
    let scaled = channel as f64 / intensity as f64 * 255.0;
    if scaled >= 255.0 {
        255
    } else {
        scaled as u8
    }
}

fn clamp(channel: u64) -> u8 {
    channel.min(255) as u8
}
