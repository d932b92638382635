//! Error types for telemetry parsing.

use std::fmt;

use thiserror::Error;

/// Number of numeric measurements in a telemetry report.
pub const PARAM_COUNT: usize = 10;

/// Identifies one field of the telemetry schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Device identifier (`id`).
    Id,
    /// Firmware version (`fw`).
    Firmware,
    /// Report topic (`topic`).
    Topic,
    /// Numeric measurement, 1-based (`param_1` .. `param_10`).
    Param(u8),
}

impl Field {
    /// The text fields in wire order.
    pub const TEXT: [Field; 3] = [Field::Id, Field::Firmware, Field::Topic];

    /// Key used for the field on the wire (`id`, `fw`, `topic`) or
    /// `param_N` for measurements.
    pub fn name(&self) -> String {
        match self {
            Field::Id => "id".to_string(),
            Field::Firmware => "fw".to_string(),
            Field::Topic => "topic".to_string(),
            Field::Param(n) => format!("param_{}", n),
        }
    }

    /// Marker preceding a text field's value, e.g. `id":"`.
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            Field::Id => Some("id\":\""),
            Field::Firmware => Some("fw\":\""),
            Field::Topic => Some("topic\":\""),
            Field::Param(_) => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Errors produced while parsing a telemetry payload.
///
/// Every variant names the field that could not be located.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The marker introducing a text field was not found.
    #[error("missing marker {marker:?} for field `{field}`")]
    MissingMarker {
        /// Field being parsed.
        field: Field,
        /// Marker that was searched for.
        marker: &'static str,
    },

    /// The delimiter ending (or preceding) a field was not found.
    #[error("missing delimiter '{delimiter}' for field `{field}`")]
    MissingDelimiter {
        /// Field being parsed.
        field: Field,
        /// Delimiter that was searched for.
        delimiter: char,
    },
}

impl ParseError {
    /// The field that failed.
    pub fn field(&self) -> Field {
        match self {
            ParseError::MissingMarker { field, .. } | ParseError::MissingDelimiter { field, .. } => {
                *field
            }
        }
    }

    /// Name of the field that failed, e.g. `"fw"`.
    pub fn field_name(&self) -> String {
        self.field().name()
    }
}

/// Result type alias for telemetry parsing.
pub type ParseResult<T> = Result<T, ParseError>;
