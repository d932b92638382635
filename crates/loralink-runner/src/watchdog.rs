//! Watchdog thread for monitoring the master loop.
//!
//! The main loop kicks the watchdog once per iteration. If no kick arrives
//! within the timeout, the watchdog thread logs an alert. It alerts once per
//! stalled iteration.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use loralink_metrics::{metric_defs, metrics, MetricLabels};
use tracing::{error, warn};

/// Shared state between the main loop and the watchdog thread.
#[derive(Debug)]
pub struct WatchdogState {
    origin: Instant,
    /// Milliseconds since `origin` at the last kick.
    last_kick_ms: AtomicU64,
    /// Number of kicks so far.
    iteration: AtomicU64,
    stop_flag: AtomicBool,
    alert_count: AtomicU64,
}

impl WatchdogState {
    pub fn new() -> Self {
        WatchdogState {
            origin: Instant::now(),
            last_kick_ms: AtomicU64::new(0),
            iteration: AtomicU64::new(0),
            stop_flag: AtomicBool::new(false),
            alert_count: AtomicU64::new(0),
        }
    }

    /// Record that the loop is alive.
    pub fn kick(&self) {
        self.last_kick_ms
            .store(self.origin.elapsed().as_millis() as u64, Ordering::Relaxed);
        self.iteration.fetch_add(1, Ordering::Relaxed);
    }

    /// Time since the last kick.
    pub fn since_last_kick(&self) -> Duration {
        let now = self.origin.elapsed().as_millis() as u64;
        Duration::from_millis(now.saturating_sub(self.last_kick_ms.load(Ordering::Relaxed)))
    }

    pub fn iteration(&self) -> u64 {
        self.iteration.load(Ordering::Relaxed)
    }

    /// Signal the watchdog to stop.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    pub fn should_stop(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }

    /// Number of alerts raised so far.
    pub fn alert_count(&self) -> u64 {
        self.alert_count.load(Ordering::Relaxed)
    }

    fn increment_alert_count(&self) -> u64 {
        self.alert_count.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Default for WatchdogState {
    fn default() -> Self {
        Self::new()
    }
}

/// Watchdog thread handle.
pub struct Watchdog {
    state: Arc<WatchdogState>,
    thread_handle: Option<JoinHandle<()>>,
}

impl Watchdog {
    /// Start a watchdog that checks twice a second.
    pub fn new(timeout: Duration, labels: MetricLabels) -> Self {
        Self::with_check_interval(timeout, Duration::from_millis(500), labels)
    }

    /// Start a watchdog with an explicit check interval.
    pub fn with_check_interval(timeout: Duration, check_interval: Duration, labels: MetricLabels) -> Self {
        let state = Arc::new(WatchdogState::new());
        let watchdog_state = Arc::clone(&state);

        let thread_handle = thread::spawn(move || {
            let mut last_alerted: Option<u64> = None;

            while !watchdog_state.should_stop() {
                thread::sleep(check_interval);

                let stalled = watchdog_state.since_last_kick();
                let iteration = watchdog_state.iteration();
                if stalled >= timeout && last_alerted != Some(iteration) {
                    last_alerted = Some(iteration);
                    let alert_num = watchdog_state.increment_alert_count();
                    error!(
                        alert = alert_num,
                        iteration,
                        stalled_s = stalled.as_secs_f64(),
                        "watchdog: loop iteration is taking too long"
                    );
                    metrics::counter!(metric_defs::WATCHDOG_ALERTS.name, &labels.to_labels()).increment(1);
                }
            }
        });

        Watchdog {
            state,
            thread_handle: Some(thread_handle),
        }
    }

    /// State for the main loop to kick.
    pub fn state(&self) -> &Arc<WatchdogState> {
        &self.state
    }

    /// Stop the watchdog thread and wait for it to finish.
    pub fn stop(mut self) {
        self.state.stop();
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                warn!("watchdog thread panicked");
            }
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.state.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kick_resets_stall_timer() {
        let state = WatchdogState::new();
        thread::sleep(Duration::from_millis(20));
        assert!(state.since_last_kick() >= Duration::from_millis(20));

        state.kick();
        assert!(state.since_last_kick() < Duration::from_millis(20));
        assert_eq!(state.iteration(), 1);
    }

    #[test]
    fn test_alerts_once_per_stall() {
        let watchdog = Watchdog::with_check_interval(
            Duration::from_millis(30),
            Duration::from_millis(5),
            MetricLabels::default(),
        );
        watchdog.state().kick();
        thread::sleep(Duration::from_millis(200));

        assert_eq!(watchdog.state().alert_count(), 1);
        watchdog.stop();
    }

    #[test]
    fn test_no_alert_while_kicked() {
        let watchdog = Watchdog::with_check_interval(
            Duration::from_millis(500),
            Duration::from_millis(5),
            MetricLabels::default(),
        );
        for _ in 0..10 {
            watchdog.state().kick();
            thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(watchdog.state().alert_count(), 0);
        watchdog.stop();
    }
}
