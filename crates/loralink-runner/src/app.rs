//! Entry points behind the `loralink` subcommands.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use loralink_frame::Address;
use loralink_metrics::MetricLabels;
use loralink_node::{Dispatcher, Radio};
use tracing::{info, warn};

use crate::config::RunnerConfig;
use crate::console_board::ConsoleBoard;
use crate::error::{Result, RunnerError};
use crate::master::{stdout_sink, MasterNode};
use crate::udp_radio::UdpRadio;
use crate::watchdog::Watchdog;

/// Install the metrics exporter if one is configured, and describe metrics.
pub fn init_metrics(config: &RunnerConfig) {
    if let Some(addr) = config.metrics_addr {
        install_exporter(addr);
    }
    loralink_metrics::describe_metrics();
}

#[cfg(feature = "prometheus")]
fn install_exporter(addr: SocketAddr) {
    match loralink_metrics::install_prometheus(addr) {
        Ok(()) => info!(%addr, "prometheus exporter listening"),
        Err(err) => warn!("failed to start prometheus exporter: {}", err),
    }
}

#[cfg(not(feature = "prometheus"))]
fn install_exporter(addr: SocketAddr) {
    warn!(%addr, "metrics_addr is set but the prometheus feature is not enabled");
}

/// Run the master node until Ctrl-C.
pub fn run_master(config: &RunnerConfig) -> Result<()> {
    config.validate()?;
    let unit_id = config.unit_id()?;
    init_metrics(config);

    let radio = UdpRadio::new(config.radio.bind, config.radio.peers.clone());
    let board = ConsoleBoard::spawn_stdin(config.buttons.debounce_samples);
    let mut node = MasterNode::new(config, unit_id.clone(), radio, board);
    node.dispatcher_mut().subscribe(stdout_sink());
    node.begin().map_err(RunnerError::RadioInit)?;

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        flag.store(false, Ordering::SeqCst);
    })?;

    info!(
        timeout_s = config.watchdog_timeout_s,
        "watchdog armed; type sw1 or sw2 to press a button"
    );
    let watchdog = Watchdog::new(config.watchdog_timeout(), MetricLabels::new(unit_id, "master"));
    node.run(&running, config.loop_interval(), Some(watchdog.state()));
    watchdog.stop();

    info!("shutting down");
    Ok(())
}

/// Transmit one frame and return the message id used.
pub fn send_once(config: &RunnerConfig, payload: &str, destination: Address) -> Result<u8> {
    config.validate()?;
    let unit_id = config.unit_id()?;

    let mut radio = UdpRadio::new(config.radio.bind, config.radio.peers.clone());
    radio
        .begin(config.radio.frequency_hz)
        .map_err(RunnerError::RadioInit)?;
    if radio.peers().is_empty() {
        warn!("no peers configured, the frame goes nowhere");
    }

    let mut dispatcher =
        Dispatcher::new(config.link.clone()).with_labels(MetricLabels::new(unit_id, "client"));
    let sequence = dispatcher.send(&mut radio, payload, destination)?;
    Ok(sequence)
}
