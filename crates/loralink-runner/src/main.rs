//! `loralink` command-line entry point.
//!
//! - `loralink master`: run the master loop until Ctrl-C
//! - `loralink send <text> [--to <addr>]`: transmit one text frame
//! - `loralink send --telemetry v1,...,v10 [--topic <t>]`: transmit one
//!   telemetry report the way a client would

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use loralink_runner::app::{run_master, send_once};
use loralink_runner::master::FIRMWARE_VERSION;
use loralink_runner::{RunnerConfig, RunnerError};
use loralink_telemetry::{TelemetryRecord, PARAM_COUNT};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "loralink")]
#[command(about = "Point-to-multipoint LoRa link master and tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `loralink_node=trace` (default: RUST_LOG, then `info`)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Override the local node address
    #[arg(long, global = true)]
    local_address: Option<u8>,

    /// Override the UDP radio bind address
    #[arg(long, global = true)]
    bind: Option<SocketAddr>,

    /// Add a UDP radio peer (repeatable)
    #[arg(long = "peer", global = true)]
    peers: Vec<SocketAddr>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the master node loop
    Master,
    /// Transmit one frame and exit
    Send {
        /// Text payload
        #[arg(required_unless_present = "telemetry", conflicts_with = "telemetry")]
        text: Option<String>,

        /// Destination address (default: broadcast destination for text, gateway for telemetry)
        #[arg(long)]
        to: Option<u8>,

        /// Send a telemetry report with ten comma-separated values
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        telemetry: Option<Vec<f32>>,

        /// Topic of the telemetry report
        #[arg(long, default_value = "telemetry")]
        topic: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), RunnerError> {
    let mut config = RunnerConfig::load_or_default(cli.config.as_deref())?;
    if let Some(address) = cli.local_address {
        config.link.local_address = address;
    }
    if let Some(bind) = cli.bind {
        config.radio.bind = bind;
    }
    for peer in cli.peers {
        if !config.radio.peers.contains(&peer) {
            config.radio.peers.push(peer);
        }
    }

    match cli.command {
        Commands::Master => run_master(&config),
        Commands::Send {
            text,
            to,
            telemetry,
            topic,
        } => {
            let (payload, default_destination) = match telemetry {
                Some(values) => {
                    let params: [f32; PARAM_COUNT] = values.as_slice().try_into().map_err(|_| {
                        RunnerError::InvalidArgument(format!(
                            "--telemetry needs {} values, got {}",
                            PARAM_COUNT,
                            values.len()
                        ))
                    })?;
                    let record = TelemetryRecord::new(config.unit_id()?, FIRMWARE_VERSION, topic, params);
                    (record.to_payload(), config.link.gateway_address)
                }
                None => (text.unwrap_or_default(), config.link.default_destination),
            };

            let destination = to.unwrap_or(default_destination);
            let sequence = send_once(&config, &payload, destination)?;
            info!(destination, sequence, "sent {:?}", payload);
            Ok(())
        }
    }
}
