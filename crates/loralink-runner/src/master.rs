//! The master node loop.
//!
//! One cooperative loop: poll the radio once, feed the result through the
//! [`Dispatcher`], then sample the buttons and issue commands on debounced
//! presses. The indicator LED is lit for one iteration after a frame gets
//! past the duplicate filter.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use loralink_metrics::MetricLabels;
use loralink_node::{
    Board, Button, ButtonDebouncer, Dispatcher, Disposition, Radio, RadioError, TelemetryEvent,
};
use tracing::{error, info, warn};

use crate::config::{ButtonConfig, RunnerConfig};
use crate::watchdog::WatchdogState;

/// Project name shown in the startup banner.
pub const PROJECT_NAME: &str = "loralink master";

/// Firmware version shown in the startup banner.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A master node bound to a radio and a board.
pub struct MasterNode<R, B> {
    radio: R,
    board: B,
    dispatcher: Dispatcher,
    buttons: ButtonConfig,
    debouncers: [ButtonDebouncer; 2],
    indicator_on: bool,
    unit_id: String,
    frequency_hz: u64,
}

impl<R: Radio, B: Board> MasterNode<R, B> {
    pub fn new(config: &RunnerConfig, unit_id: impl Into<String>, radio: R, board: B) -> Self {
        let unit_id = unit_id.into();
        let dispatcher = Dispatcher::new(config.link.clone())
            .with_labels(MetricLabels::new(unit_id.clone(), "master"));
        let samples = config.buttons.debounce_samples;

        MasterNode {
            radio,
            board,
            dispatcher,
            buttons: config.buttons.clone(),
            debouncers: [ButtonDebouncer::new(samples), ButtonDebouncer::new(samples)],
            indicator_on: false,
            unit_id,
            frequency_hz: config.radio.frequency_hz,
        }
    }

    pub fn unit_id(&self) -> &str {
        &self.unit_id
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// Log the banner and bring the radio up.
    ///
    /// On failure the board sounds three beeps and the error is returned;
    /// the node must not enter its loop.
    pub fn begin(&mut self) -> Result<(), RadioError> {
        let config = self.dispatcher.config();
        info!("**************************************************");
        info!("* Project   : {}", PROJECT_NAME);
        info!("* Revision  : {}", FIRMWARE_VERSION);
        info!("* Unit ID   : {}", self.unit_id);
        info!("**************************************************");

        if let Err(err) = self.radio.begin(self.frequency_hz) {
            error!("radio init failed, check connections: {}", err);
            self.board.beep(3);
            return Err(err);
        }

        info!("frequency band  = {} Hz", self.frequency_hz);
        info!("gateway id      = {:02}", config.gateway_address);
        info!("local id        = {:02}", config.local_address);
        info!("destination id  = {:02}", config.default_destination);
        self.board.beep(2);
        Ok(())
    }

    /// Run one loop iteration.
    pub fn tick(&mut self) -> Disposition {
        if self.indicator_on {
            self.board.set_indicator(false);
            self.indicator_on = false;
        }

        let disposition = match self.dispatcher.poll(&mut self.radio) {
            Ok(disposition) => disposition,
            Err(err) => {
                warn!("radio receive failed: {}", err);
                Disposition::NoPacket
            }
        };
        if disposition.passed_filter() {
            self.board.set_indicator(true);
            self.indicator_on = true;
        }

        for (index, button) in Button::ALL.into_iter().enumerate() {
            let level = self.board.button_pressed(button);
            if self.debouncers[index].update(level) {
                self.on_press(button);
            }
        }

        disposition
    }

    fn on_press(&mut self, button: Button) {
        self.board.beep(1);
        let command = self.buttons.command(button).to_string();
        let target = self.buttons.target;
        info!(button = button.name(), target, "sending {:?}", command);

        if let Err(err) = self.dispatcher.send(&mut self.radio, &command, target) {
            warn!(button = button.name(), "command not sent: {}", err);
            self.board.beep(3);
        }
    }

    /// Loop until `running` is cleared, kicking `watchdog` every iteration.
    pub fn run(&mut self, running: &AtomicBool, interval: Duration, watchdog: Option<&WatchdogState>) {
        info!(interval_ms = interval.as_millis() as u64, "master loop started");
        while running.load(Ordering::SeqCst) {
            self.tick();
            if let Some(watchdog) = watchdog {
                watchdog.kick();
            }
            thread::sleep(interval);
        }
        info!("master loop stopped");
    }
}

/// Render an accepted telemetry event as one JSON line.
pub fn to_json_line(event: &TelemetryEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}

/// Subscriber printing every accepted telemetry event on stdout.
pub fn stdout_sink() -> impl FnMut(&TelemetryEvent) + Send + 'static {
    |event: &TelemetryEvent| match to_json_line(event) {
        Ok(line) => {
            let mut out = io::stdout().lock();
            if let Err(err) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
                warn!("failed to write telemetry: {}", err);
            }
        }
        Err(err) => warn!("failed to encode telemetry: {}", err),
    }
}
