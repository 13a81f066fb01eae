use serde::Deserialize;
use std::{path::Path, time::Duration};

/// Gateway settings. Every field has a default, so an empty document is
/// a valid configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GatewayConfig {
    /// Address announced to the Java server in the handshake.
    pub remote_address: String,
    pub remote_port: u16,
    pub protocol_version: i32,
    /// Capacity of each inbound packet queue of a session.
    pub inbound_queue_capacity: usize,
    pub control_queue_capacity: usize,
    #[serde(with = "millis")]
    pub double_chest_open_delay: Duration,
    #[serde(with = "millis")]
    pub trade_commit_delay: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            remote_address: "127.0.0.1".to_owned(),
            remote_port: 25565,
            protocol_version: crate::protocol::java::PROTOCOL_VERSION,
            inbound_queue_capacity: 256,
            control_queue_capacity: 8,
            double_chest_open_delay: Duration::from_millis(200),
            trade_commit_delay: Duration::from_millis(100),
        }
    }
}

impl GatewayConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = fs_err::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
