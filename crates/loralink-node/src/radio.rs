//! Radio transceiver interface.
//!
//! The link layer does not drive hardware itself. A [`Radio`] delivers whole
//! received packets (with signal quality when the driver reports it) and
//! transmits whole frames.

use bytes::Bytes;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use serde::{Deserialize, Serialize};

use crate::error::RadioError;

/// Signal quality of a received packet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkQuality {
    /// Received signal strength in dBm.
    pub rssi_dbm: i16,
    /// Signal-to-noise ratio in dB.
    pub snr_db: f32,
}

/// One packet as delivered by the radio.
#[derive(Debug, Clone, PartialEq)]
pub struct RadioPacket {
    /// Raw frame bytes.
    pub data: Bytes,
    /// Signal quality, if the driver reports it.
    pub quality: Option<LinkQuality>,
}

impl RadioPacket {
    pub fn new(data: impl Into<Bytes>, quality: Option<LinkQuality>) -> Self {
        RadioPacket {
            data: data.into(),
            quality,
        }
    }
}

/// A half-duplex packet radio.
pub trait Radio {
    /// Bring the transceiver up on the given band. Failure is fatal.
    fn begin(&mut self, frequency_hz: u64) -> Result<(), RadioError>;

    /// Poll for a received packet without blocking.
    fn receive(&mut self) -> Result<Option<RadioPacket>, RadioError>;

    /// Transmit one complete frame.
    fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError>;
}

impl<R: Radio + ?Sized> Radio for Box<R> {
    fn begin(&mut self, frequency_hz: u64) -> Result<(), RadioError> {
        (**self).begin(frequency_hz)
    }

    fn receive(&mut self) -> Result<Option<RadioPacket>, RadioError> {
        (**self).receive()
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        (**self).transmit(frame)
    }
}

// ============================================================================
// In-memory radio
// ============================================================================

/// A radio whose "air" is a pair of in-process channels.
///
/// Created in pairs: whatever one end transmits, the other end receives.
/// Used to run a master against a scripted client without hardware.
#[derive(Debug)]
pub struct MemoryRadio {
    tx: Sender<Bytes>,
    rx: Receiver<Bytes>,
    quality: Option<LinkQuality>,
    frequency_hz: Option<u64>,
    fail_begin: bool,
    fail_transmit: bool,
}

impl MemoryRadio {
    /// Create two radios that hear each other.
    pub fn pair() -> (MemoryRadio, MemoryRadio) {
        let (a_tx, b_rx) = crossbeam_channel::unbounded();
        let (b_tx, a_rx) = crossbeam_channel::unbounded();
        (MemoryRadio::new(a_tx, a_rx), MemoryRadio::new(b_tx, b_rx))
    }

    fn new(tx: Sender<Bytes>, rx: Receiver<Bytes>) -> Self {
        MemoryRadio {
            tx,
            rx,
            quality: None,
            frequency_hz: None,
            fail_begin: false,
            fail_transmit: false,
        }
    }

    /// Report this signal quality on every received packet.
    pub fn with_quality(mut self, quality: LinkQuality) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Make [`Radio::begin`] fail.
    pub fn with_failing_begin(mut self) -> Self {
        self.fail_begin = true;
        self
    }

    /// Make [`Radio::transmit`] fail.
    pub fn set_failing_transmit(&mut self, fail: bool) {
        self.fail_transmit = fail;
    }

    /// Band passed to the last successful `begin`.
    pub fn frequency_hz(&self) -> Option<u64> {
        self.frequency_hz
    }
}

impl Radio for MemoryRadio {
    fn begin(&mut self, frequency_hz: u64) -> Result<(), RadioError> {
        if self.fail_begin {
            return Err(RadioError::init("transceiver not responding"));
        }
        self.frequency_hz = Some(frequency_hz);
        Ok(())
    }

    fn receive(&mut self) -> Result<Option<RadioPacket>, RadioError> {
        match self.rx.try_recv() {
            Ok(data) => Ok(Some(RadioPacket {
                data,
                quality: self.quality,
            })),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => Ok(None),
        }
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        if self.fail_transmit {
            return Err(RadioError::transmit("channel busy"));
        }
        self.tx
            .send(Bytes::copy_from_slice(frame))
            .map_err(|_| RadioError::transmit("peer radio dropped"))
    }
}
