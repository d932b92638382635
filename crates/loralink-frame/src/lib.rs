//! # loralink-frame
//!
//! Wire format for the LoRaLink point-to-multipoint radio link.
//!
//! Every over-the-air packet carries a fixed 4-byte header followed by the
//! payload:
//!
//! | Field       | Size (bytes)                    | Description                               |
//! |-------------|---------------------------------|-------------------------------------------|
//! | destination | 1                               | Recipient address (`99` = all clients).   |
//! | sender      | 1                               | Address of the transmitting node.         |
//! | sequence    | 1                               | Message id, `0..100`, wraps 99 → 0.       |
//! | length      | 1                               | Declared payload length.                  |
//! | payload     | up to 250 (`MAX_PAYLOAD_LEN`)   | Raw payload bytes (usually text).         |
//!
//! There is no checksum. The only integrity check on receive is that the
//! declared length matches the number of payload bytes actually read.
//!
//! ## Usage
//!
//! ```
//! use loralink_frame::{decode_frame, encode_frame};
//!
//! let bytes = encode_frame(2, 1, 7, b"relay:on")?;
//! let frame = decode_frame(&bytes)?.expect("a frame");
//! assert_eq!(frame.destination, 2);
//! assert_eq!(frame.payload, b"relay:on");
//! # Ok::<(), loralink_frame::FrameError>(())
//! ```

mod codec;
mod error;

pub use codec::*;
pub use error::*;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Header size in bytes.
pub const HEADER_SIZE: usize = 4;

/// Largest payload a sender may put in one frame.
pub const MAX_PAYLOAD_LEN: usize = 250;

/// Destination address meaning "all clients".
pub const BROADCAST_ADDRESS: u8 = 99;

/// Sequence numbers run `0..SEQUENCE_MODULUS`.
pub const SEQUENCE_MODULUS: u8 = 100;

/// A node address on the link.
pub type Address = u8;

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Recipient address.
    pub destination: Address,
    /// Transmitting node address.
    pub sender: Address,
    /// Message id assigned by the sender.
    pub sequence: u8,
    /// Payload bytes; always exactly as long as the header declared.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Create a new frame.
    pub fn new(destination: Address, sender: Address, sequence: u8, payload: impl Into<Vec<u8>>) -> Self {
        Frame {
            destination,
            sender,
            sequence,
            payload: payload.into(),
        }
    }

    /// Declared payload length as it appears on the wire.
    pub fn length(&self) -> usize {
        self.payload.len()
    }

    /// Whether the frame is addressed to all clients.
    pub fn is_broadcast(&self) -> bool {
        self.destination == BROADCAST_ADDRESS
    }

    /// Payload interpreted as text. Non-UTF-8 bytes are replaced.
    pub fn payload_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// Encode this frame to wire bytes.
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        encode_frame(self.destination, self.sender, self.sequence, &self.payload)
    }
}

/// Outgoing message id counter.
///
/// Starts at 0 and advances modulo [`SEQUENCE_MODULUS`], so it never
/// reaches 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceCounter {
    next: u8,
}

impl SequenceCounter {
    /// Create a counter starting at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counter starting at `value` (reduced modulo 100).
    pub fn starting_at(value: u8) -> Self {
        SequenceCounter {
            next: value % SEQUENCE_MODULUS,
        }
    }

    /// The id the next outgoing frame will carry.
    pub fn current(&self) -> u8 {
        self.next
    }

    /// Move to the next id, wrapping 99 → 0.
    pub fn advance(&mut self) {
        self.next = (self.next + 1) % SEQUENCE_MODULUS;
    }
}
