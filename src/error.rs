//! Error handling for the register engine
//!
//! This module provides error type definitions and conversions for the
//! register mapping and batching engine.

use thiserror::Error;

/// Register engine error type
#[derive(Error, Debug, Clone)]
pub enum GrowattError {
    /// Attribute name not present in the device catalog
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// A descriptor's register words are not fully present in a raw read
    ///
    /// The assembler never surfaces this for a whole batch; it is only
    /// returned by APIs that read a single descriptor.
    #[error("Incomplete range: {0}")]
    IncompleteRange(String),

    /// Failure propagated opaquely from the transport collaborator
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Protocol contract violations (wrong word count, invalid parameters)
    #[error("Protocol error: {0}")]
    ProtocolError(String),
}

/// Result type alias for the register engine
pub type Result<T> = std::result::Result<T, GrowattError>;

impl GrowattError {
    pub fn unknown_attribute(name: impl Into<String>) -> Self {
        GrowattError::UnknownAttribute(name.into())
    }

    pub fn incomplete_range(msg: impl Into<String>) -> Self {
        GrowattError::IncompleteRange(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        GrowattError::TransportError(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        GrowattError::ProtocolError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GrowattError::unknown_attribute("output_power");
        assert_eq!(err.to_string(), "Unknown attribute: output_power");

        let err = GrowattError::transport("connection reset");
        assert_eq!(err.to_string(), "Transport error: connection reset");
    }

    #[test]
    fn test_every_variant_has_a_constructor() {
        let errors = [
            GrowattError::unknown_attribute("x"),
            GrowattError::incomplete_range("x"),
            GrowattError::transport("x"),
            GrowattError::protocol("x"),
        ];
        assert!(matches!(errors[0], GrowattError::UnknownAttribute(_)));
        assert!(matches!(errors[1], GrowattError::IncompleteRange(_)));
        assert!(matches!(errors[2], GrowattError::TransportError(_)));
        assert!(matches!(errors[3], GrowattError::ProtocolError(_)));
    }
}
