//! # loralink-node
//!
//! Link-layer logic for a LoRaLink node: the receive pipeline (decode,
//! duplicate filter, address check, telemetry parse), the send path with its
//! wrapping message id, and the interfaces to the radio and board I/O the
//! node runs on.
//!
//! ## Usage
//!
//! ```
//! use loralink_frame::encode_frame;
//! use loralink_node::{Dispatcher, LinkConfig, MemoryRadio, Radio};
//!
//! let (mut master_radio, mut client_radio) = MemoryRadio::pair();
//! let mut master = Dispatcher::new(LinkConfig::default());
//!
//! let report = r#"{"id":"X1","fw":"2.0","topic":"t",1,2,3,4,5,6,7,8,9,10}"#;
//! client_radio.transmit(&encode_frame(1, 2, 0, report.as_bytes())?)?;
//!
//! assert!(master.poll(&mut master_radio)?.is_accepted());
//! assert_eq!(master.telemetry().unwrap().id, "X1");
//!
//! master.send(&mut master_radio, "relay:on", 2)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod board;
mod config;
mod dispatcher;
mod duplicate;
mod error;
mod radio;
mod router;

pub use board::*;
pub use config::*;
pub use dispatcher::*;
pub use duplicate::*;
pub use error::*;
pub use radio::*;
pub use router::*;
