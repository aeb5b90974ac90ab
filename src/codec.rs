//! Register value codecs
//!
//! Pure functions that turn raw 16-bit register words into typed values:
//! big-endian scaled numerics, fixed-length ASCII strings, the packed
//! inverter model code and the bit-packed time-of-day schedule windows.
//!
//! Decoding malformed-but-present data never fails; unmapped codes come
//! back as the literal `"Unknown"` sentinel so one odd register value
//! cannot abort a whole poll cycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded register value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegisterValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    /// High/low byte pair of a single register (e.g. tracker/phase counts)
    Pair(u8, u8),
    Schedule(ScheduleWindow),
}

impl RegisterValue {
    /// Numeric view, for callers that only care about magnitudes
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RegisterValue::Integer(i) => Some(*i as f64),
            RegisterValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RegisterValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RegisterValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterValue::Integer(i) => write!(f, "{i}"),
            RegisterValue::Float(v) => write!(f, "{v}"),
            RegisterValue::Text(s) => write!(f, "{s}"),
            RegisterValue::Bool(b) => write!(f, "{b}"),
            RegisterValue::Pair(hi, lo) => write!(f, "({hi}, {lo})"),
            RegisterValue::Schedule(w) => write!(f, "{w}"),
        }
    }
}

/// Charge/discharge priority carried in a schedule start word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulePriority {
    Load,
    Battery,
    Grid,
    Unknown,
}

impl SchedulePriority {
    fn from_code(code: u16) -> Self {
        match code {
            0 => SchedulePriority::Load,
            1 => SchedulePriority::Battery,
            2 => SchedulePriority::Grid,
            _ => SchedulePriority::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulePriority::Load => "Load",
            SchedulePriority::Battery => "Battery",
            SchedulePriority::Grid => "Grid",
            SchedulePriority::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for SchedulePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded time-of-day schedule window
///
/// Hours and minutes are kept as the raw field values rather than a
/// calendar type: out-of-range bit patterns must round-trip into the
/// rendered `HH:MM` text instead of failing the decode pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    pub start_hour: u8,
    pub start_minute: u8,
    pub end_hour: u8,
    pub end_minute: u8,
    pub priority: SchedulePriority,
    pub enabled: bool,
}

impl ScheduleWindow {
    pub fn start_time(&self) -> String {
        format!("{:02}:{:02}", self.start_hour, self.start_minute)
    }

    pub fn end_time(&self) -> String {
        format!("{:02}:{:02}", self.end_hour, self.end_minute)
    }
}

impl fmt::Display for ScheduleWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Start: {}, End: {}, Priority: {}, Enabled: {}",
            self.start_time(),
            self.end_time(),
            self.priority,
            if self.enabled { "Yes" } else { "No" }
        )
    }
}

// ============================================================================
// Numeric and String Codecs
// ============================================================================

/// Concatenate one or two register words big-endian into an unsigned value
///
/// Word counts above two fold in the same MSW-first order; the catalog
/// only declares lengths 1 and 2 for numeric descriptors.
pub fn decode_unsigned(words: &[u16]) -> u64 {
    words.iter().fold(0u64, |acc, &w| (acc << 16) | u64::from(w))
}

/// Reinterpret the big-endian concatenation as a two's-complement value
pub fn decode_signed(words: &[u16]) -> i64 {
    let raw = decode_unsigned(words);
    match words.len() {
        1 => i64::from(raw as u16 as i16),
        2 => i64::from(raw as u32 as i32),
        _ => raw as i64,
    }
}

/// Decode a base-10 scaled float from one or two registers
pub fn decode_scaled(words: &[u16], signed: bool, scale: u32) -> f64 {
    let value = if signed {
        decode_signed(words) as f64
    } else {
        decode_unsigned(words) as f64
    };
    value / f64::from(scale.max(1))
}

/// Encode a scaled float back into register words (inverse of [`decode_scaled`])
pub fn encode_scaled(value: f64, length: u16, scale: u32) -> Vec<u16> {
    let raw = (value * f64::from(scale.max(1))).round() as i64;
    match length {
        1 => vec![raw as u16],
        _ => vec![((raw as u32) >> 16) as u16, raw as u16],
    }
}

/// Decode a fixed-length ASCII string, stripping trailing NUL padding
///
/// Each register carries two bytes, high byte first. Non-ASCII bytes are
/// replaced rather than rejected.
pub fn decode_string(words: &[u16]) -> String {
    let mut bytes = Vec::with_capacity(words.len() * 2);
    for &w in words {
        bytes.push((w >> 8) as u8);
        bytes.push(w as u8);
    }
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Encode an ASCII string into `length` registers, NUL padded
pub fn encode_string(text: &str, length: u16) -> Vec<u16> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.resize(usize::from(length) * 2, 0);
    bytes
        .chunks_exact(2)
        .map(|pair| (u16::from(pair[0]) << 8) | u16::from(pair[1]))
        .collect()
}

// ============================================================================
// Bit-field Codecs
// ============================================================================

/// Decode the inverter model registers into the 8-token model string
///
/// Two registers combine into one 32-bit value; each 4-bit nibble renders
/// as an uppercase hex digit behind its token letter, most significant
/// nibble first.
pub fn decode_model(words: &[u16]) -> String {
    let mo = (u32::from(words.first().copied().unwrap_or(0)) << 16)
        | u32::from(words.get(1).copied().unwrap_or(0));
    format!(
        "A{:X} B{:X} D{:X} T{:X} P{:X} U{:X} M{:X} S{:X}",
        (mo & 0xF000_0000) >> 28,
        (mo & 0x0F00_0000) >> 24,
        (mo & 0x00F0_0000) >> 20,
        (mo & 0x000F_0000) >> 16,
        (mo & 0x0000_F000) >> 12,
        (mo & 0x0000_0F00) >> 8,
        (mo & 0x0000_00F0) >> 4,
        mo & 0x0000_000F
    )
}

// Schedule start word layout (MSB -> LSB):
//   bit 15     enabled
//   bits 14-13 priority (0 Load, 1 Battery, 2 Grid)
//   bits 12-9  hour
//   bits 8-3   minute
//   bits 2-0   unused
//
// The end word shifts both fields down by one bit relative to the start
// word (hour bits 12-8, minute bits 7-2). The asymmetry matches the
// device firmware and must not be normalized.

fn start_fields(word: u16) -> (u8, u8) {
    let hour = ((word >> 9) & 0x0F) as u8;
    let minute = ((word >> 3) & 0x3F) as u8;
    (hour, minute)
}

fn end_fields(word: u16) -> (u8, u8) {
    let hour = ((word >> 8) & 0x1F) as u8;
    let minute = ((word >> 2) & 0x3F) as u8;
    (hour, minute)
}

fn start_priority(word: u16) -> SchedulePriority {
    SchedulePriority::from_code((word >> 13) & 0b11)
}

fn start_enabled(word: u16) -> bool {
    word & 0x8000 != 0
}

/// Decode a full schedule window from its start and end words
pub fn decode_schedule_window(words: &[u16]) -> ScheduleWindow {
    let start_word = words.first().copied().unwrap_or(0);
    let end_word = words.get(1).copied().unwrap_or(0);
    let (start_hour, start_minute) = start_fields(start_word);
    let (end_hour, end_minute) = end_fields(end_word);
    ScheduleWindow {
        start_hour,
        start_minute,
        end_hour,
        end_minute,
        priority: start_priority(start_word),
        enabled: start_enabled(start_word),
    }
}

/// Decode only the start time (`HH:MM`) of a schedule window
pub fn decode_schedule_start(words: &[u16]) -> String {
    let (hour, minute) = start_fields(words.first().copied().unwrap_or(0));
    format!("{hour:02}:{minute:02}")
}

/// Decode only the end time (`HH:MM`) of a schedule window
pub fn decode_schedule_end(words: &[u16]) -> String {
    let (hour, minute) = end_fields(words.first().copied().unwrap_or(0));
    format!("{hour:02}:{minute:02}")
}

/// Decode only the priority of a schedule window start word
pub fn decode_schedule_priority(words: &[u16]) -> SchedulePriority {
    start_priority(words.first().copied().unwrap_or(0))
}

/// Decode only the enabled flag of a schedule window start word
pub fn decode_schedule_enabled(words: &[u16]) -> bool {
    start_enabled(words.first().copied().unwrap_or(0))
}

/// Encode schedule fields into a start word (inverse of the start layout)
///
/// The start layout gives the hour only 4 bits, so hours above 15 are
/// not representable and would wrap.
pub fn encode_schedule_start(
    hour: u8,
    minute: u8,
    priority: SchedulePriority,
    enabled: bool,
) -> u16 {
    debug_assert!(hour < 16, "start hour {hour} exceeds the 4-bit field");
    debug_assert!(minute < 60, "start minute {minute} out of range");
    let priority_code: u16 = match priority {
        SchedulePriority::Load => 0,
        SchedulePriority::Battery => 1,
        SchedulePriority::Grid => 2,
        SchedulePriority::Unknown => 3,
    };
    (u16::from(enabled) << 15)
        | (priority_code << 13)
        | ((u16::from(hour) & 0x0F) << 9)
        | ((u16::from(minute) & 0x3F) << 3)
}

/// Encode schedule fields into an end word (inverse of the end layout)
pub fn encode_schedule_end(hour: u8, minute: u8) -> u16 {
    debug_assert!(hour < 24, "end hour {hour} out of range");
    debug_assert!(minute < 60, "end minute {minute} out of range");
    ((u16::from(hour) & 0x1F) << 8) | ((u16::from(minute) & 0x3F) << 2)
}

/// Split a register into its high and low bytes
///
/// Used for packed count registers such as "number of trackers and phases".
pub fn decode_byte_pair(words: &[u16]) -> (u8, u8) {
    let word = words.first().copied().unwrap_or(0);
    ((word >> 8) as u8, word as u8)
}
