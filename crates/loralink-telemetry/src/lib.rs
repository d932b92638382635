//! LoRaLink Telemetry Payloads
//!
//! Clients report telemetry as a short text payload that resembles a JSON
//! object with a fixed field order:
//!
//! ```text
//! {"id":"tiny32-AB12CD","fw":"1.0","topic":"inverter",220.5,5.2,1150.0,49.9,0.0,0.0,0.0,0.0,0.0,0.0}
//! ```
//!
//! Three text fields (`id`, `fw`, `topic`) are followed by exactly ten
//! numbers, the last one closed by `}`. The payload is scanned left to right
//! rather than parsed as JSON; see [`parse_telemetry`] for the exact rules.
//!
//! # Example
//!
//! ```
//! use loralink_telemetry::{parse_telemetry, Field};
//!
//! let record = parse_telemetry(r#"{"id":"X1","fw":"2.0","topic":"t",1,2,3,4,5,6,7,8,9,10}"#)?;
//! assert_eq!(record.id, "X1");
//! assert_eq!(record.param(10), Some(10.0));
//!
//! let err = parse_telemetry(r#"{"id":"X1","topic":"t"}"#).unwrap_err();
//! assert_eq!(err.field(), Field::Firmware);
//! # Ok::<(), loralink_telemetry::ParseError>(())
//! ```

mod cursor;
mod error;
mod parser;
mod record;

pub use cursor::*;
pub use error::*;
pub use parser::*;
pub use record::*;
