//! Error types for the node crate.

use loralink_frame::FrameError;
use thiserror::Error;

/// Errors reported by a radio driver.
#[derive(Debug, Error)]
pub enum RadioError {
    /// The transceiver could not be initialized. Fatal at startup.
    #[error("radio init failed: {0}")]
    Init(String),

    /// A transmit did not complete.
    #[error("radio transmit failed: {0}")]
    Transmit(String),

    /// Reading from the transceiver failed.
    #[error("radio receive failed: {0}")]
    Receive(String),

    /// Underlying I/O error.
    #[error("radio I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RadioError {
    /// Create an init error.
    pub fn init(message: impl Into<String>) -> Self {
        RadioError::Init(message.into())
    }

    /// Create a transmit error.
    pub fn transmit(message: impl Into<String>) -> Self {
        RadioError::Transmit(message.into())
    }
}

/// Errors from the send path.
#[derive(Debug, Error)]
pub enum SendError {
    /// The payload was rejected before anything was transmitted.
    #[error("send rejected: {0}")]
    Frame(#[from] FrameError),

    /// The radio failed to transmit the frame.
    #[error("send failed: {0}")]
    Radio(#[from] RadioError),
}

impl SendError {
    /// Whether the payload exceeded the frame limit.
    pub fn is_payload_too_large(&self) -> bool {
        matches!(self, SendError::Frame(FrameError::PayloadTooLarge { .. }))
    }
}

/// Invalid link configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An address field holds a value it may not take.
    #[error("invalid {field}: {value} ({reason})")]
    InvalidAddress {
        /// Configuration field name.
        field: &'static str,
        /// Offending value.
        value: u8,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A MAC address could not be parsed.
    #[error("invalid MAC address: {0:?}")]
    InvalidMac(String),
}
