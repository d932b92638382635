//! Metrics infrastructure for the LoRaLink node.
//!
//! This crate declares every metric the link layer emits as a structured
//! [`Metric`] constant and re-exports the `metrics` crate. Nothing is recorded
//! unless the host installs a recorder; without one the macros are no-ops.
//!
//! # Example
//!
//! ```rust,ignore
//! use loralink_metrics::{describe_metrics, metric_defs, metrics, MetricLabels};
//!
//! describe_metrics();
//!
//! let labels = MetricLabels::new("tiny32-DDEEFF", "master");
//! metrics::counter!(metric_defs::LINK_TX_FRAMES.name, labels.to_labels()).increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// The kind of metric (counter, gauge, or histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
    /// A histogram for recording distributions.
    Histogram,
}

/// A metric declaration with its metadata.
///
/// ```rust
/// use loralink_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const FRAMES: Metric = Metric::counter("loralink.test.frames")
///     .with_description("Frames seen")
///     .with_unit(Unit::Count)
///     .with_labels(&["node"]);
///
/// assert_eq!(FRAMES.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "loralink.rx.frames").
    pub name: &'static str,
    /// The kind of metric (counter, gauge, histogram).
    pub kind: MetricKind,
    /// Human-readable description of the metric.
    pub description: &'static str,
    /// The unit of measurement (optional).
    pub unit: Option<Unit>,
    /// Expected label keys for this metric.
    pub labels: &'static [&'static str],
}

impl Metric {
    /// Creates a new counter metric with the given name.
    pub const fn counter(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new gauge metric with the given name.
    pub const fn gauge(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Gauge,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new histogram metric with the given name.
    pub const fn histogram(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Histogram,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Sets the description for the metric.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit for the metric.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the expected label keys for the metric.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers this metric's description with the metrics recorder.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Gauge, Some(unit)) => {
                describe_gauge!(self.name, unit, self.description);
            }
            (MetricKind::Gauge, None) => {
                describe_gauge!(self.name, self.description);
            }
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description);
            }
            (MetricKind::Histogram, None) => {
                describe_histogram!(self.name, self.description);
            }
        }
    }
}

/// All metric definitions for the link layer.
pub mod metric_defs {
    use super::{Metric, Unit};

    /// Standard labels present on all node-scoped metrics.
    pub const STANDARD_LABELS: &[&str] = &["node", "role"];

    // ========================================================================
    // Receive Path
    // ========================================================================

    /// Frames read from the radio (before any filtering).
    pub const LINK_RX_FRAMES: Metric = Metric::counter("loralink.rx.frames")
        .with_description("Packets read from the radio")
        .with_unit(Unit::Count)
        .with_labels(STANDARD_LABELS);

    /// Frames dropped on the receive path.
    ///
    /// Labels: node, role, reason (`malformed`, `duplicate`, `not_for_me`, `parse_error`)
    pub const LINK_RX_DROPPED: Metric = Metric::counter("loralink.rx.dropped")
        .with_description("Frames dropped on the receive path, by reason")
        .with_unit(Unit::Count)
        .with_labels(&["node", "role", "reason"]);

    /// Telemetry records accepted and retained.
    pub const LINK_RX_TELEMETRY: Metric = Metric::counter("loralink.rx.telemetry")
        .with_description("Telemetry reports accepted")
        .with_unit(Unit::Count)
        .with_labels(STANDARD_LABELS);

    /// RSSI of frames that passed the duplicate filter.
    pub const LINK_RX_RSSI: Metric = Metric::histogram("loralink.rx.rssi_dbm")
        .with_description("Received signal strength in dBm")
        .with_labels(STANDARD_LABELS);

    /// SNR of frames that passed the duplicate filter.
    pub const LINK_RX_SNR: Metric = Metric::histogram("loralink.rx.snr_db")
        .with_description("Signal-to-noise ratio in dB")
        .with_labels(STANDARD_LABELS);

    // ========================================================================
    // Send Path
    // ========================================================================

    /// Frames handed to the radio.
    pub const LINK_TX_FRAMES: Metric = Metric::counter("loralink.tx.frames")
        .with_description("Frames transmitted")
        .with_unit(Unit::Count)
        .with_labels(STANDARD_LABELS);

    /// Sends that failed before or during transmission.
    ///
    /// Labels: node, role, reason (`payload_too_large`, `radio`)
    pub const LINK_TX_REJECTED: Metric = Metric::counter("loralink.tx.rejected")
        .with_description("Sends rejected before or during transmission")
        .with_unit(Unit::Count)
        .with_labels(&["node", "role", "reason"]);

    /// Payload size of transmitted frames.
    pub const LINK_TX_PAYLOAD_SIZE: Metric = Metric::histogram("loralink.tx.payload_size_bytes")
        .with_description("Payload size of transmitted frames in bytes")
        .with_unit(Unit::Bytes)
        .with_labels(STANDARD_LABELS);

    /// Message id the next outgoing frame will carry.
    pub const LINK_TX_SEQUENCE: Metric = Metric::gauge("loralink.tx.sequence")
        .with_description("Next outgoing message id")
        .with_labels(STANDARD_LABELS);

    // ========================================================================
    // Runtime
    // ========================================================================

    /// Loop watchdog alerts.
    pub const WATCHDOG_ALERTS: Metric = Metric::counter("loralink.watchdog.alerts")
        .with_description("Main loop iterations that exceeded the watchdog timeout")
        .with_unit(Unit::Count)
        .with_labels(STANDARD_LABELS);

    /// Returns a slice of all defined metrics.
    pub const ALL: &[&Metric] = &[
        &LINK_RX_FRAMES,
        &LINK_RX_DROPPED,
        &LINK_RX_TELEMETRY,
        &LINK_RX_RSSI,
        &LINK_RX_SNR,
        &LINK_TX_FRAMES,
        &LINK_TX_REJECTED,
        &LINK_TX_PAYLOAD_SIZE,
        &LINK_TX_SEQUENCE,
        &WATCHDOG_ALERTS,
    ];
}

/// Labels identifying the node that emits a metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricLabels {
    /// Unit identifier, e.g. `tiny32-DDEEFF`.
    pub node: String,
    /// Node role on the link (`master` or `client`).
    pub role: String,
}

impl MetricLabels {
    /// Creates labels for a node.
    pub fn new(node: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            role: role.into(),
        }
    }

    /// Converts the labels to the metrics crate label format.
    pub fn to_labels(&self) -> Vec<(&'static str, String)> {
        vec![("node", self.node.clone()), ("role", self.role.clone())]
    }

    /// Returns labels with additional key-value pairs.
    ///
    /// ```rust
    /// use loralink_metrics::MetricLabels;
    ///
    /// let labels = MetricLabels::new("tiny32-DDEEFF", "master");
    /// let extended = labels.with(&[("reason", "duplicate".to_string())]);
    ///
    /// assert!(extended.iter().any(|(k, v)| *k == "reason" && v == "duplicate"));
    /// ```
    pub fn with(&self, extra: &[(&'static str, String)]) -> Vec<(&'static str, String)> {
        let mut labels = self.to_labels();
        labels.extend_from_slice(extra);
        labels
    }
}

impl Default for MetricLabels {
    fn default() -> Self {
        MetricLabels::new("unknown", "master")
    }
}

/// Describes all metrics used by the link layer.
///
/// Call once at startup, after installing a recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

/// Install a Prometheus exporter listening on `addr` and describe all metrics.
#[cfg(feature = "prometheus")]
pub fn install_prometheus(
    addr: std::net::SocketAddr,
) -> Result<(), metrics_exporter_prometheus::BuildError> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    describe_metrics();
    Ok(())
}
