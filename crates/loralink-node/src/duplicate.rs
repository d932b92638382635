//! Single-slot duplicate suppression.
//!
//! Only the most recently accepted `(sender, sequence)` pair is remembered. A
//! frame is rejected when it repeats that pair exactly; a retransmission that
//! arrives after a frame from another sender is accepted again.

use loralink_frame::Address;

/// Identity of an accepted frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DuplicateKey {
    /// Sender address.
    pub sender: Address,
    /// Sender-assigned message id.
    pub sequence: u8,
}

/// Outcome of a duplicate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    /// New frame; the stored key now refers to it.
    Accept,
    /// Exact repeat of the last accepted frame.
    Reject,
}

/// Remembers the last accepted frame.
#[derive(Debug, Clone, Default)]
pub struct DuplicateFilter {
    last: Option<DuplicateKey>,
}

impl DuplicateFilter {
    /// Create an empty filter. The first frame checked is always accepted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a frame and record it if accepted.
    pub fn check(&mut self, sender: Address, sequence: u8) -> FilterDecision {
        let key = DuplicateKey { sender, sequence };
        if self.last == Some(key) {
            return FilterDecision::Reject;
        }
        self.last = Some(key);
        FilterDecision::Accept
    }

    /// The last accepted key, if any frame has been accepted.
    pub fn last_accepted(&self) -> Option<DuplicateKey> {
        self.last
    }
}
