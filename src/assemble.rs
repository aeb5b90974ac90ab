//! Result assembly
//!
//! Rebuilds the attribute-name-to-value mapping from the raw register
//! words returned by per-range reads, and synthesizes the derived device
//! status from the status, fault and derating code registers.

use crate::catalog::{
    RegisterDescriptor, ATTR_DERATING_MODE, ATTR_FAULT_CODE, ATTR_STATUS_CODE,
};
use crate::codec::RegisterValue;
use std::collections::HashMap;
use tracing::trace;

/// Absolute register address to raw word, merged from per-range reads
pub type RawRegisterMap = HashMap<u16, u16>;

/// Attribute name to decoded, scaled value
pub type DecodedResultMap = HashMap<&'static str, RegisterValue>;

/// Decode every descriptor whose registers are fully present in `raw`
///
/// Descriptors with any word missing are skipped silently: the caller may
/// have requested only a subset of the catalog, and partial telemetry
/// beats failing the whole pass. The map is built fresh on every call.
pub fn process_registers(
    descriptors: &'static [RegisterDescriptor],
    raw: &RawRegisterMap,
) -> DecodedResultMap {
    let mut results = DecodedResultMap::new();
    let mut words: Vec<u16> = Vec::new();

    for desc in descriptors {
        words.clear();
        for address in desc.addresses() {
            match raw.get(&address) {
                Some(&word) => words.push(word),
                None => break,
            }
        }
        if words.len() != usize::from(desc.length) {
            trace!(attribute = desc.name, "registers absent, skipping");
            continue;
        }
        results.insert(desc.name, desc.decode(&words));
    }

    results
}

// ============================================================================
// Derived Status
// ============================================================================

/// Human readable derating reason for a derating mode code
fn derating_reason(mode: i64) -> Option<&'static str> {
    match mode {
        1 => Some("PV over voltage"),
        2 => Some("Power limit"),
        3 => Some("Grid voltage"),
        4 => Some("Grid frequency"),
        5 => Some("Boost temperature"),
        6 => Some("Inverter temperature"),
        7 => Some("External control"),
        _ => None,
    }
}

/// Derive the device status from the base decode results
///
/// Runs after the primary decode pass, not as a descriptor: a fault code
/// wins, an active derating mode comes next, otherwise the status code
/// maps through a lookup table. Anything unmapped comes back as the
/// literal `"Unknown"` rather than an error.
pub fn inverter_status(results: &DecodedResultMap) -> String {
    let code = |name: &str| results.get(name).and_then(RegisterValue::as_i64);

    if let Some(fault) = code(ATTR_FAULT_CODE) {
        if fault != 0 {
            return format!("Fault {fault}");
        }
    }

    if let Some(mode) = code(ATTR_DERATING_MODE) {
        if mode != 0 {
            return match derating_reason(mode) {
                Some(reason) => format!("Derating: {reason}"),
                None => "Unknown".to_string(),
            };
        }
    }

    match code(ATTR_STATUS_CODE) {
        Some(0) => "Waiting".to_string(),
        Some(1) => "Normal".to_string(),
        Some(3) => "Fault".to_string(),
        _ => "Unknown".to_string(),
    }
}
