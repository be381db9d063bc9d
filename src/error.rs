//! Error types for the BSB engine

use thiserror::Error;

/// Result type for BSB engine operations
pub type Result<T> = std::result::Result<T, BusError>;

/// Error types encountered while framing, decoding or driving the bus
#[derive(Error, Debug)]
pub enum BusError {
    /// Frame structure is not a BSB telegram
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// CRC check failed
    #[error("Checksum mismatch: expected {expected:#06X}, got {actual:#06X}")]
    ChecksumMismatch { expected: u16, actual: u16 },

    /// Length byte out of range or disagreeing with the buffer
    #[error("Invalid length: {0}")]
    InvalidLength(String),

    /// Command code not known to the protocol
    #[error("Unknown command code: {0:#04X}")]
    UnknownCommand(u8),

    /// Payload too short for the requested interpretation
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Invalid bus address specified
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Point handle does not refer to a registered point
    #[error("Unknown point: {0}")]
    UnknownPoint(String),

    /// Write intent addressed a point of the wrong kind
    #[error("Point is not writable this way: {0}")]
    NotWritable(String),

    /// Host write sink failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BusError {
    /// Create a new InvalidFrame error
    pub fn invalid_frame(msg: impl Into<String>) -> Self {
        BusError::InvalidFrame(msg.into())
    }

    /// Create a new InvalidLength error
    pub fn invalid_length(msg: impl Into<String>) -> Self {
        BusError::InvalidLength(msg.into())
    }

    /// Create a new InsufficientData error
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        BusError::InsufficientData(msg.into())
    }

    /// Create a new InvalidAddress error
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        BusError::InvalidAddress(msg.into())
    }

    /// Create a new InvalidConfig error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        BusError::InvalidConfig(msg.into())
    }

    /// Create a new UnknownPoint error
    pub fn unknown_point(msg: impl Into<String>) -> Self {
        BusError::UnknownPoint(msg.into())
    }

    /// Create a new NotWritable error
    pub fn not_writable(msg: impl Into<String>) -> Self {
        BusError::NotWritable(msg.into())
    }

    /// Whether the error came from malformed wire input rather than the caller
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            BusError::InvalidFrame(_)
                | BusError::ChecksumMismatch { .. }
                | BusError::InvalidLength(_)
                | BusError::UnknownCommand(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BusError::invalid_frame("test");
        assert!(err.to_string().contains("Invalid frame"));

        let err = BusError::ChecksumMismatch {
            expected: 0x1234,
            actual: 0xABCD,
        };
        assert_eq!(
            err.to_string(),
            "Checksum mismatch: expected 0x1234, got 0xABCD"
        );
    }

    #[test]
    fn test_framing_classification() {
        assert!(BusError::UnknownCommand(0x42).is_framing());
        assert!(BusError::invalid_length("short").is_framing());
        assert!(!BusError::invalid_config("bad").is_framing());
    }
}
