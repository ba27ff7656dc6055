//! Line decoder for the sensor wire format
//!
//! A message is a single line: three decimal channel values, an optional
//! `;<intensity>` suffix, an optional trailing capture flag, then `\r?\n`.
//! Decoding is one anchored scan over the whole line; any deviation
//! (missing fields, non-digit characters, garbage before the terminator,
//! missing terminator) rejects the line as a whole.
//!
//! Rejection is a normal, frequent outcome: partial and garbled lines are
//! expected transient noise from the hardware link, so `decode` returns
//! `Option` instead of an error and never panics on malformed input.

use crate::types::RawSample;

/// Trailing marker requesting "capture/print this sample now"
pub const CAPTURE_FLAG: char = '@';

/// Parse one line (terminator included) into a sample, or reject it.
pub fn decode(line: &str) -> Option<RawSample> {
    let body = line.strip_suffix('\n')?;
    let body = body.strip_suffix('\r').unwrap_or(body);
    let bytes = body.as_bytes();

    let mut pos = 0usize;
    let red = take_uint(bytes, &mut pos)?;
    take_byte(bytes, &mut pos, b',')?;
    let green = take_uint(bytes, &mut pos)?;
    take_byte(bytes, &mut pos, b',')?;
    let blue = take_uint(bytes, &mut pos)?;

    let intensity = if take_byte(bytes, &mut pos, b';').is_some() {
        Some(take_uint(bytes, &mut pos)?)
    } else {
        None
    };

    let capture = take_byte(bytes, &mut pos, CAPTURE_FLAG as u8).is_some();

    // Anchored at both ends: leftover bytes reject the whole line
    if pos != bytes.len() {
        return None;
    }

    Some(RawSample {
        red,
        green,
        blue,
        intensity,
        capture,
    })
}

/// Consume one or more decimal digits; a value too wide for u64 rejects
fn take_uint(bytes: &[u8], pos: &mut usize) -> Option<u64> {
    let start = *pos;
    let mut value: u64 = 0;
    while let Some(d) = bytes.get(*pos).filter(|b| b.is_ascii_digit()) {
        value = value
            .checked_mul(10)?
            .checked_add((d - b'0') as u64)?;
        *pos += 1;
    }
    if *pos == start {
        return None;
    }
    Some(value)
}

fn take_byte(bytes: &[u8], pos: &mut usize, expected: u8) -> Option<()> {
    if bytes.get(*pos) == Some(&expected) {
        *pos += 1;
        Some(())
    } else {
        None
    }
}
