//! Error types for loralink-frame.

use thiserror::Error;

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Payload exceeds the sender-side limit.
    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Actual payload size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Fewer bytes than a full header were available.
    #[error("Truncated header: {available} bytes available (need {needed})")]
    TruncatedHeader {
        /// Bytes that were available.
        available: usize,
        /// Header size.
        needed: usize,
    },

    /// Declared payload length does not match the bytes actually read.
    #[error("Length mismatch: header declares {declared} bytes, read {actual}")]
    LengthMismatch {
        /// Length byte from the header.
        declared: u8,
        /// Payload bytes actually read.
        actual: usize,
    },
}

impl FrameError {
    /// Returns true for receive-side errors that mean "drop this frame".
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            FrameError::TruncatedHeader { .. } | FrameError::LengthMismatch { .. }
        )
    }
}
