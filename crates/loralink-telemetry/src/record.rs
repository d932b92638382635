//! Decoded telemetry report.

use serde::{Deserialize, Serialize};

use crate::error::PARAM_COUNT;

/// One client's telemetry report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Device identifier, e.g. `tiny32-AB12CD`.
    pub id: String,
    /// Client firmware version.
    pub firmware_version: String,
    /// Report topic, e.g. `inverter`.
    pub topic: String,
    /// Measurements `param_1` .. `param_10`, in wire order.
    pub params: [f32; PARAM_COUNT],
}

impl TelemetryRecord {
    /// Create a record.
    pub fn new(
        id: impl Into<String>,
        firmware_version: impl Into<String>,
        topic: impl Into<String>,
        params: [f32; PARAM_COUNT],
    ) -> Self {
        TelemetryRecord {
            id: id.into(),
            firmware_version: firmware_version.into(),
            topic: topic.into(),
            params,
        }
    }

    /// Measurement `param_n` (1-based). `None` outside `1..=10`.
    pub fn param(&self, n: usize) -> Option<f32> {
        if n == 0 {
            return None;
        }
        self.params.get(n - 1).copied()
    }

    pub fn param_1(&self) -> f32 {
        self.params[0]
    }

    pub fn param_2(&self) -> f32 {
        self.params[1]
    }

    pub fn param_3(&self) -> f32 {
        self.params[2]
    }

    pub fn param_4(&self) -> f32 {
        self.params[3]
    }

    pub fn param_5(&self) -> f32 {
        self.params[4]
    }

    pub fn param_6(&self) -> f32 {
        self.params[5]
    }

    pub fn param_7(&self) -> f32 {
        self.params[6]
    }

    pub fn param_8(&self) -> f32 {
        self.params[7]
    }

    pub fn param_9(&self) -> f32 {
        self.params[8]
    }

    pub fn param_10(&self) -> f32 {
        self.params[9]
    }

    /// Format the record in the wire text format clients transmit:
    ///
    /// ```text
    /// {"id":"<id>","fw":"<fw>","topic":"<topic>",<p1>,...,<p10>}
    /// ```
    pub fn to_payload(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        format!(
            "{{\"id\":\"{}\",\"fw\":\"{}\",\"topic\":\"{}\",{}}}",
            self.id,
            self.firmware_version,
            self.topic,
            params.join(",")
        )
    }
}
