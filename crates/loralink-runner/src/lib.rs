//! # loralink-runner
//!
//! Runs a LoRaLink master node on a host. A UDP socket stands in for the
//! transceiver and the terminal stands in for the board: beeps and the
//! indicator LED are logged, and buttons are pressed by typing `sw1` / `sw2`.
//! Accepted telemetry is printed on stdout as one JSON object per line.
//!
//! ## Modules
//!
//! - [`config`]: YAML configuration with firmware defaults
//! - [`master`]: the master loop (receive, indicator, buttons)
//! - [`udp_radio`]: datagram radio
//! - [`console_board`]: stdin buttons and logged buzzer/LED
//! - [`watchdog`]: stalled-loop detection
//! - [`app`]: the `master` and `send` subcommands

pub mod app;
pub mod config;
pub mod console_board;
pub mod error;
pub mod master;
pub mod udp_radio;
pub mod watchdog;

pub use config::RunnerConfig;
pub use error::{Result, RunnerError};
