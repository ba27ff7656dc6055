//! Port resolver: pick the sensor's serial device
//!
//! Enumerates the currently attached serial ports and selects the first
//! whose name matches one of the configured device patterns. No caching:
//! every call re-enumerates, because the sensor is routinely hot-plugged.

use crate::error::{Result, SwatchboothError};

/// Resolve the sensor's device path.
///
/// A port matches when its name is `<pattern><digits>` for any configured
/// pattern (e.g. `/dev/ttyACM0`, `COM3`). The first match in enumeration
/// order wins; an empty candidate set is [`SwatchboothError::NoDeviceFound`].
pub fn resolve(patterns: &[String]) -> Result<String> {
    let ports = serialport::available_ports()?;
    let names: Vec<String> = ports.into_iter().map(|p| p.port_name).collect();
    tracing::debug!("available ports: {:?}", names);

    names
        .into_iter()
        .find(|name| patterns.iter().any(|p| matches_pattern(name, p)))
        .ok_or(SwatchboothError::NoDeviceFound)
}

/// `<pattern><one or more digits>`, anchored at both ends
pub(crate) fn matches_pattern(name: &str, pattern: &str) -> bool {
    match name.strip_prefix(pattern) {
        Some(rest) => !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}
