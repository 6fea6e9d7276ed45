//! Bridge configuration

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;
use zwave_shared::{timing, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Serial device of the controller stick
    pub serial_port: String,
    pub baud_rate: u32,
    /// Node id the controller holds on its own network
    pub controller_node: NodeId,
    /// How long a transaction may wait for its answer
    pub transaction_timeout: Duration,
    /// How often pending transactions are checked for timeout
    pub sweep_interval: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            serial_port: "/dev/ttyUSB0".into(),
            baud_rate: timing::SERIAL_BAUD_RATE,
            controller_node: NodeId(1),
            transaction_timeout: Duration::from_millis(timing::TRANSACTION_TIMEOUT_MS),
            sweep_interval: Duration::from_millis(timing::SWEEP_INTERVAL_MS),
        }
    }
}

impl BridgeConfig {
    /// Defaults overridden by `ZWAVE_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns. Values that do not
    /// parse are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(port) = lookup("ZWAVE_SERIAL_PORT").filter(|p| !p.trim().is_empty()) {
            config.serial_port = port.trim().to_string();
        }
        if let Some(baud) = parsed::<u32, _>(&lookup, "ZWAVE_BAUD_RATE") {
            config.baud_rate = baud;
        }
        if let Some(node) = parsed::<u8, _>(&lookup, "ZWAVE_CONTROLLER_NODE") {
            config.controller_node = NodeId(node);
        }
        if let Some(ms) = parsed::<u64, _>(&lookup, "ZWAVE_TRANSACTION_TIMEOUT_MS").filter(|ms| *ms > 0) {
            config.transaction_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parsed::<u64, _>(&lookup, "ZWAVE_SWEEP_INTERVAL_MS").filter(|ms| *ms > 0) {
            config.sweep_interval = Duration::from_millis(ms);
        }

        config
    }
}

fn parsed<T: FromStr, F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> BridgeConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BridgeConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.serial_port, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.controller_node, NodeId(1));
        assert_eq!(config.transaction_timeout, Duration::from_secs(5));
        assert_eq!(config.sweep_interval, Duration::from_millis(250));
        assert_eq!(from_pairs(&[]), config);
    }

    #[test]
    fn test_env_overrides() {
        let config = from_pairs(&[
            ("ZWAVE_SERIAL_PORT", "/dev/ttyACM0"),
            ("ZWAVE_CONTROLLER_NODE", "2"),
            ("ZWAVE_TRANSACTION_TIMEOUT_MS", "1500"),
        ]);
        assert_eq!(config.serial_port, "/dev/ttyACM0");
        assert_eq!(config.controller_node, NodeId(2));
        assert_eq!(config.transaction_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_invalid_values_ignored() {
        let config = from_pairs(&[
            ("ZWAVE_BAUD_RATE", "fast"),
            ("ZWAVE_CONTROLLER_NODE", "300"),
            ("ZWAVE_SWEEP_INTERVAL_MS", "0"),
        ]);
        assert_eq!(config, BridgeConfig::default());
    }
}
