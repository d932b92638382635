//! Runner configuration file.
//!
//! Every field has a default, so an empty file (or no file at all) gives a
//! master at address 1 on 433 MHz that sends `relay:on` / `relay:off` to
//! client 2.
//!
//! ```yaml
//! link:
//!   local_address: 1
//!   default_destination: 99
//! radio:
//!   bind: 0.0.0.0:47433
//!   peers: [192.168.1.20:47433]
//! buttons:
//!   target: 2
//! mac_address: "24:0A:C4:12:34:56"
//! ```

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use loralink_frame::Address;
use loralink_node::{Button, ConfigError, LinkConfig};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RunnerError};

/// LoRa band used by the master.
pub const DEFAULT_FREQUENCY_HZ: u64 = 433_000_000;

/// Address of the client carrying the relay.
pub const DEFAULT_RELAY_CLIENT: Address = 2;

/// UDP port used when none is configured.
pub const DEFAULT_UDP_PORT: u16 = 47433;

/// Radio settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    /// Local UDP socket standing in for the transceiver.
    pub bind: SocketAddr,
    /// Nodes that hear every transmitted frame.
    pub peers: Vec<SocketAddr>,
    /// Band in Hz.
    pub frequency_hz: u64,
}

impl Default for RadioConfig {
    fn default() -> Self {
        RadioConfig {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_UDP_PORT)),
            peers: Vec::new(),
            frequency_hz: DEFAULT_FREQUENCY_HZ,
        }
    }
}

/// Commands issued from the front-panel buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    /// Client the commands are addressed to.
    pub target: Address,
    /// Sent on a press of button 1.
    pub sw1_command: String,
    /// Sent on a press of button 2.
    pub sw2_command: String,
    /// Consecutive polls a level must hold before it counts.
    pub debounce_samples: u8,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        ButtonConfig {
            target: DEFAULT_RELAY_CLIENT,
            sw1_command: "relay:on".to_string(),
            sw2_command: "relay:off".to_string(),
            debounce_samples: 2,
        }
    }
}

impl ButtonConfig {
    pub fn command(&self, button: Button) -> &str {
        match button {
            Button::Sw1 => &self.sw1_command,
            Button::Sw2 => &self.sw2_command,
        }
    }
}

/// Top-level runner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub link: LinkConfig,
    pub radio: RadioConfig,
    pub buttons: ButtonConfig,
    /// MAC-style hardware address the unit id is derived from.
    pub mac_address: String,
    /// Pause between loop iterations.
    pub loop_interval_ms: u64,
    /// A loop iteration running longer than this raises a watchdog alert.
    pub watchdog_timeout_s: u64,
    /// Prometheus listener (only used with the `prometheus` feature).
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            link: LinkConfig::default(),
            radio: RadioConfig::default(),
            buttons: ButtonConfig::default(),
            mac_address: "24:0A:C4:00:00:01".to_string(),
            loop_interval_ms: 100,
            watchdog_timeout_s: 10,
            metrics_addr: None,
        }
    }
}

impl RunnerConfig {
    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RunnerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| RunnerError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check the link addresses and the MAC address.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.link.validate()?;
        self.unit_id()?;
        Ok(())
    }

    /// Unit identifier derived from the configured MAC address.
    pub fn unit_id(&self) -> std::result::Result<String, ConfigError> {
        self.link.unit_id(&self.mac_address)
    }

    pub fn loop_interval(&self) -> Duration {
        Duration::from_millis(self.loop_interval_ms)
    }

    pub fn watchdog_timeout(&self) -> Duration {
        Duration::from_secs(self.watchdog_timeout_s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_master_firmware() {
        let config = RunnerConfig::default();
        assert_eq!(config.link.local_address, 1);
        assert_eq!(config.link.gateway_address, 1);
        assert_eq!(config.link.default_destination, 99);
        assert_eq!(config.radio.frequency_hz, 433_000_000);
        assert_eq!(config.buttons.target, 2);
        assert_eq!(config.buttons.command(Button::Sw1), "relay:on");
        assert_eq!(config.buttons.command(Button::Sw2), "relay:off");
        assert_eq!(config.loop_interval(), Duration::from_millis(100));
        assert_eq!(config.watchdog_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config: RunnerConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, RunnerConfig::default());
    }

    #[test]
    fn test_nested_override() {
        let yaml = "radio:\n  peers: [\"127.0.0.1:5000\"]\nbuttons:\n  target: 7\n";
        let config: RunnerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.radio.peers, vec!["127.0.0.1:5000".parse().unwrap()]);
        assert_eq!(config.radio.frequency_hz, DEFAULT_FREQUENCY_HZ);
        assert_eq!(config.buttons.target, 7);
        assert_eq!(config.buttons.sw1_command, "relay:on");
    }

    #[test]
    fn test_unit_id_from_mac() {
        let config = RunnerConfig {
            mac_address: "AA:BB:CC:DD:EE:FF".to_string(),
            ..Default::default()
        };
        assert_eq!(config.unit_id().unwrap(), "tiny32-DDEEFF");
    }

    #[test]
    fn test_invalid_mac_fails_validation() {
        let config = RunnerConfig {
            mac_address: "nope".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMac(_))));
    }
}
