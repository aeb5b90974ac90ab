//! Engine constants derived from the Growatt Modbus register maps
//!
//! The span limit is a device property: Growatt inverters answer a single
//! read request with at most `MAXIMUM_DATA_LENGTH` consecutive registers,
//! which is stricter than the Modbus protocol ceiling of 125 registers
//! per FC03/FC04 response.

// ============================================================================
// Read Batching
// ============================================================================

/// Maximum number of consecutive registers per device read
///
/// Ranges produced by the coalescer never exceed this span. Two requested
/// addresses farther apart than this always end up in separate reads.
pub const MAXIMUM_DATA_LENGTH: u16 = 100;

/// Capacity of the LRU plan cache (distinct requested address sets)
///
/// A polling host cycles through a handful of stable key sets (full
/// telemetry, power-only, holding), so a small cache already gives a
/// near-100% hit rate.
pub const PLAN_CACHE_CAPACITY: usize = 10;

// ============================================================================
// Well-known Holding Register Addresses
// ============================================================================

/// First of the six device clock registers (year, month, day, hour,
/// minute, second); year is stored as an offset from 2000
pub const DEVICE_TIME_BASE_REGISTER: u16 = 45;

/// Number of registers occupied by the device clock
pub const DEVICE_TIME_LENGTH: u16 = 6;

/// Year offset used by the device clock registers
pub const DEVICE_TIME_YEAR_BASE: i32 = 2000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_within_modbus_limit() {
        // FC03/FC04 responses carry at most 125 registers; the device span
        // must fit inside that.
        assert!(MAXIMUM_DATA_LENGTH <= 125);
    }

    #[test]
    fn test_clock_register_window() {
        assert_eq!(DEVICE_TIME_BASE_REGISTER, 45);
        assert_eq!(DEVICE_TIME_BASE_REGISTER + DEVICE_TIME_LENGTH - 1, 50);
    }
}
