//! Receive pipeline and send path.
//!
//! The [`Dispatcher`] is the node's session object. It owns all state that
//! survives between loop iterations:
//!
//! - the duplicate filter's last accepted `(sender, sequence)`
//! - the outgoing sequence counter
//! - the last accepted [`TelemetryRecord`]
//!
//! Receive order is fixed: decode, duplicate filter, address check, payload
//! parse. Every drop is reported as a [`Disposition`] and logged; nothing on
//! the receive path returns an error.

use std::fmt;

use bytes::Buf;
use chrono::{DateTime, Utc};
use loralink_frame::{decode_buf, encode_frame, Address, FrameError, SequenceCounter};
use loralink_metrics::{metric_defs, metrics, MetricLabels};
use loralink_telemetry::{parse_telemetry, ParseError, TelemetryRecord};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::LinkConfig;
use crate::duplicate::{DuplicateFilter, FilterDecision};
use crate::error::{RadioError, SendError};
use crate::radio::{LinkQuality, Radio};
use crate::router::{AddressRouter, RouteDecision};

/// A newly accepted telemetry report, handed to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryEvent {
    /// Address of the reporting client.
    pub sender: Address,
    /// Message id of the frame.
    pub sequence: u8,
    /// The parsed report.
    pub record: TelemetryRecord,
    /// Signal quality of the frame, if known.
    pub quality: Option<LinkQuality>,
    /// When the frame was processed.
    pub received_at: DateTime<Utc>,
}

/// What happened to one receive attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Nothing was available.
    NoPacket,
    /// Truncated header or length mismatch.
    Malformed(FrameError),
    /// Exact repeat of the last accepted frame.
    Duplicate {
        sender: Address,
        sequence: u8,
    },
    /// Addressed to another node or to all clients.
    NotForMe {
        destination: Address,
    },
    /// Addressed here but the payload did not parse.
    ParseFailed {
        sender: Address,
        error: ParseError,
    },
    /// Telemetry parsed and retained.
    Accepted {
        sender: Address,
        sequence: u8,
    },
}

impl Disposition {
    /// Whether the frame got past the duplicate filter.
    pub fn passed_filter(&self) -> bool {
        matches!(
            self,
            Disposition::NotForMe { .. } | Disposition::ParseFailed { .. } | Disposition::Accepted { .. }
        )
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Disposition::Accepted { .. })
    }

    /// Metric label for a dropped frame.
    fn drop_reason(&self) -> Option<&'static str> {
        match self {
            Disposition::Malformed(_) => Some("malformed"),
            Disposition::Duplicate { .. } => Some("duplicate"),
            Disposition::NotForMe { .. } => Some("not_for_me"),
            Disposition::ParseFailed { .. } => Some("parse_error"),
            Disposition::NoPacket | Disposition::Accepted { .. } => None,
        }
    }
}

type Subscriber = Box<dyn FnMut(&TelemetryEvent) + Send>;

/// Link-layer session for one node.
pub struct Dispatcher {
    config: LinkConfig,
    router: AddressRouter,
    filter: DuplicateFilter,
    sequence: SequenceCounter,
    telemetry: Option<TelemetryRecord>,
    labels: MetricLabels,
    subscribers: Vec<Subscriber>,
}

impl Dispatcher {
    /// Create a session with an empty filter, sequence 0 and no telemetry.
    pub fn new(config: LinkConfig) -> Self {
        Dispatcher {
            router: AddressRouter::new(config.local_address),
            config,
            filter: DuplicateFilter::new(),
            sequence: SequenceCounter::new(),
            telemetry: None,
            labels: MetricLabels::default(),
            subscribers: Vec::new(),
        }
    }

    /// Set the labels attached to emitted metrics.
    pub fn with_labels(mut self, labels: MetricLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn local_address(&self) -> Address {
        self.router.local_address()
    }

    /// Message id the next successful send will use.
    pub fn next_sequence(&self) -> u8 {
        self.sequence.current()
    }

    /// Last accepted telemetry report.
    pub fn telemetry(&self) -> Option<&TelemetryRecord> {
        self.telemetry.as_ref()
    }

    pub fn duplicate_filter(&self) -> &DuplicateFilter {
        &self.filter
    }

    /// Register a handler called for every accepted telemetry report.
    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: FnMut(&TelemetryEvent) + Send + 'static,
    {
        self.subscribers.push(Box::new(handler));
    }

    // ========================================================================
    // Receive path
    // ========================================================================

    /// Poll the radio once and run any packet through the receive pipeline.
    pub fn poll<R: Radio + ?Sized>(&mut self, radio: &mut R) -> Result<Disposition, RadioError> {
        match radio.receive()? {
            Some(mut packet) => Ok(self.on_receive(&mut packet.data, packet.quality)),
            None => Ok(Disposition::NoPacket),
        }
    }

    /// Run one packet's bytes through decode, filter, route and parse.
    pub fn on_receive<B: Buf>(&mut self, source: &mut B, quality: Option<LinkQuality>) -> Disposition {
        let disposition = self.process(source, quality);
        if let Some(reason) = disposition.drop_reason() {
            metrics::counter!(
                metric_defs::LINK_RX_DROPPED.name,
                &self.labels.with(&[("reason", reason.to_string())])
            )
            .increment(1);
        }
        disposition
    }

    fn process<B: Buf>(&mut self, source: &mut B, quality: Option<LinkQuality>) -> Disposition {
        let frame = match decode_buf(source) {
            Ok(None) => return Disposition::NoPacket,
            Ok(Some(frame)) => frame,
            Err(err) => {
                metrics::counter!(metric_defs::LINK_RX_FRAMES.name, &self.labels.to_labels()).increment(1);
                warn!("dropping malformed frame: {}", err);
                return Disposition::Malformed(err);
            }
        };
        metrics::counter!(metric_defs::LINK_RX_FRAMES.name, &self.labels.to_labels()).increment(1);

        if self.filter.check(frame.sender, frame.sequence) == FilterDecision::Reject {
            warn!(
                sender = frame.sender,
                sequence = frame.sequence,
                "duplicate frame"
            );
            return Disposition::Duplicate {
                sender: frame.sender,
                sequence: frame.sequence,
            };
        }

        info!(
            sender = format_args!("0x{:02X}", frame.sender),
            destination = format_args!("0x{:02X}", frame.destination),
            sequence = frame.sequence,
            length = frame.length(),
            rssi = quality.map(|q| q.rssi_dbm),
            snr = quality.map(|q| q.snr_db),
            payload = %frame.payload_text(),
            "frame received"
        );
        if let Some(q) = quality {
            metrics::histogram!(metric_defs::LINK_RX_RSSI.name, &self.labels.to_labels())
                .record(q.rssi_dbm as f64);
            metrics::histogram!(metric_defs::LINK_RX_SNR.name, &self.labels.to_labels())
                .record(q.snr_db as f64);
        }

        if self.router.route(frame.destination) == RouteDecision::NotForMe {
            debug!(
                destination = frame.destination,
                local = self.local_address(),
                "frame not for this node"
            );
            return Disposition::NotForMe {
                destination: frame.destination,
            };
        }

        let record = match parse_telemetry(&frame.payload_text()) {
            Ok(record) => record,
            Err(error) => {
                warn!(
                    sender = frame.sender,
                    field = %error.field(),
                    "dropping unparseable telemetry: {}",
                    error
                );
                return Disposition::ParseFailed {
                    sender: frame.sender,
                    error,
                };
            }
        };

        info!(
            id = %record.id,
            fw = %record.firmware_version,
            topic = %record.topic,
            params = ?record.params,
            "telemetry accepted"
        );
        metrics::counter!(metric_defs::LINK_RX_TELEMETRY.name, &self.labels.to_labels()).increment(1);

        let event = TelemetryEvent {
            sender: frame.sender,
            sequence: frame.sequence,
            record: record.clone(),
            quality,
            received_at: Utc::now(),
        };
        self.telemetry = Some(record);
        for handler in &mut self.subscribers {
            handler(&event);
        }

        Disposition::Accepted {
            sender: frame.sender,
            sequence: frame.sequence,
        }
    }

    // ========================================================================
    // Send path
    // ========================================================================

    /// Send `payload` to `destination`.
    ///
    /// Returns the message id used. The sequence counter advances only when
    /// the radio accepted the frame.
    pub fn send<R: Radio + ?Sized>(
        &mut self,
        radio: &mut R,
        payload: &str,
        destination: Address,
    ) -> Result<u8, SendError> {
        let sequence = self.sequence.current();
        debug!(length = payload.len(), destination, "outgoing payload");

        let bytes = match encode_frame(destination, self.local_address(), sequence, payload.as_bytes()) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("message can't be sent over the link: {}", err);
                self.count_rejected("payload_too_large");
                return Err(err.into());
            }
        };

        if let Err(err) = radio.transmit(&bytes) {
            warn!(destination, sequence, "transmit failed: {}", err);
            self.count_rejected("radio");
            return Err(err.into());
        }
        self.sequence.advance();

        info!(
            destination = format_args!("0x{:02X}", destination),
            sequence,
            length = payload.len(),
            "frame sent"
        );
        metrics::counter!(metric_defs::LINK_TX_FRAMES.name, &self.labels.to_labels()).increment(1);
        metrics::histogram!(metric_defs::LINK_TX_PAYLOAD_SIZE.name, &self.labels.to_labels())
            .record(payload.len() as f64);
        metrics::gauge!(metric_defs::LINK_TX_SEQUENCE.name, &self.labels.to_labels())
            .set(self.sequence.current() as f64);

        Ok(sequence)
    }

    /// Send `payload` to the configured default destination (all clients).
    pub fn broadcast<R: Radio + ?Sized>(&mut self, radio: &mut R, payload: &str) -> Result<u8, SendError> {
        let destination = self.config.default_destination;
        self.send(radio, payload, destination)
    }

    fn count_rejected(&self, reason: &'static str) {
        metrics::counter!(
            metric_defs::LINK_TX_REJECTED.name,
            &self.labels.with(&[("reason", reason.to_string())])
        )
        .increment(1);
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("filter", &self.filter)
            .field("sequence", &self.sequence)
            .field("telemetry", &self.telemetry)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
