//! Link-level configuration and unit identity.

use loralink_frame::{Address, BROADCAST_ADDRESS};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Address of the gateway every client reports to.
pub const DEFAULT_GATEWAY_ADDRESS: Address = 1;

/// Address of the master node.
pub const DEFAULT_LOCAL_ADDRESS: Address = 1;

/// Prefix of the derived unit identifier.
pub const DEFAULT_UNIT_PREFIX: &str = "tiny32";

/// Addresses and identity of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// This node's address. Frames are processed only when addressed here.
    pub local_address: Address,
    /// Gateway address clients report to.
    pub gateway_address: Address,
    /// Destination used by [`crate::Dispatcher::broadcast`].
    pub default_destination: Address,
    /// Prefix of the unit identifier derived from the MAC address.
    pub unit_prefix: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            local_address: DEFAULT_LOCAL_ADDRESS,
            gateway_address: DEFAULT_GATEWAY_ADDRESS,
            default_destination: BROADCAST_ADDRESS,
            unit_prefix: DEFAULT_UNIT_PREFIX.to_string(),
        }
    }
}

impl LinkConfig {
    /// Check address constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.local_address == BROADCAST_ADDRESS {
            return Err(ConfigError::InvalidAddress {
                field: "local_address",
                value: self.local_address,
                reason: "reserved for broadcast",
            });
        }
        if self.gateway_address == BROADCAST_ADDRESS {
            return Err(ConfigError::InvalidAddress {
                field: "gateway_address",
                value: self.gateway_address,
                reason: "reserved for broadcast",
            });
        }
        Ok(())
    }

    /// Unit identifier for a node with the given MAC address.
    pub fn unit_id(&self, mac: &str) -> Result<String, ConfigError> {
        unit_id_from_mac(&self.unit_prefix, mac)
    }
}

/// Derive a unit identifier: prefix, a dash, and the last three MAC octets in
/// upper-case hex without separators.
///
/// ```
/// use loralink_node::unit_id_from_mac;
///
/// assert_eq!(unit_id_from_mac("tiny32", "24:0a:c4:ab:12:cd").unwrap(), "tiny32-AB12CD");
/// ```
pub fn unit_id_from_mac(prefix: &str, mac: &str) -> Result<String, ConfigError> {
    let digits: String = mac
        .trim()
        .chars()
        .filter(|c| *c != ':' && *c != '-')
        .collect();
    let octets = hex::decode(&digits).map_err(|_| ConfigError::InvalidMac(mac.to_string()))?;
    if octets.len() != 6 {
        return Err(ConfigError::InvalidMac(mac.to_string()));
    }

    Ok(format!("{}-{}", prefix, hex::encode_upper(&octets[3..])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.local_address, 1);
        assert_eq!(config.gateway_address, 1);
        assert_eq!(config.default_destination, 99);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_broadcast_local_address_rejected() {
        let config = LinkConfig {
            local_address: BROADCAST_ADDRESS,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAddress { field: "local_address", .. })
        ));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: LinkConfig = serde_yaml::from_str("local_address: 7\n").unwrap();
        assert_eq!(config.local_address, 7);
        assert_eq!(config.default_destination, BROADCAST_ADDRESS);
        assert_eq!(config.unit_prefix, "tiny32");
    }

    #[test]
    fn test_unit_id() {
        assert_eq!(
            unit_id_from_mac("tiny32", "AA:BB:CC:DD:EE:FF").unwrap(),
            "tiny32-DDEEFF"
        );
        assert_eq!(
            LinkConfig::default().unit_id("24-0A-C4-01-02-0f").unwrap(),
            "tiny32-01020F"
        );
    }

    #[test]
    fn test_unit_id_invalid_mac() {
        assert!(unit_id_from_mac("tiny32", "not a mac").is_err());
        assert!(unit_id_from_mac("tiny32", "AA:BB:CC").is_err());
    }
}
