//! Sync Configuration
//!
//! Storage keys and relay settings shared by every surface. All surfaces of
//! one deployment must agree on these values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const SELECTED_IDS_KEY: &str = "selected-ids";
pub const CLIENTS_CACHE_KEY: &str = "all-clients-cache";
pub const RELAY_CHANNEL_KEY: &str = "relay-channel";
/// Source tag every relayed message carries
pub const MESSAGE_SOURCE: &str = "micro-frontend-event";
/// Delay before the storage echo is removed
pub const DEFAULT_ECHO_TTL_MS: u32 = 1000;

/// Which transports the relay uses to reach other browsing contexts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayMode {
    /// One same-origin broadcast channel
    #[default]
    Channel,
    /// Storage echo plus window messages, for shells and remotes served from
    /// different origins
    Legacy,
}

impl FromStr for RelayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "channel" => Ok(RelayMode::Channel),
            "legacy" => Ok(RelayMode::Legacy),
            other => Err(format!("unknown relay mode `{}`", other)),
        }
    }
}

impl fmt::Display for RelayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayMode::Channel => f.write_str("channel"),
            RelayMode::Legacy => f.write_str("legacy"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    pub selected_ids_key: String,
    pub clients_cache_key: String,
    /// Storage key of the echo transport, also the broadcast channel name
    pub relay_key: String,
    pub message_source: String,
    pub relay_mode: RelayMode,
    pub echo_ttl_ms: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            selected_ids_key: SELECTED_IDS_KEY.to_string(),
            clients_cache_key: CLIENTS_CACHE_KEY.to_string(),
            relay_key: RELAY_CHANNEL_KEY.to_string(),
            message_source: MESSAGE_SOURCE.to_string(),
            relay_mode: RelayMode::default(),
            echo_ttl_ms: DEFAULT_ECHO_TTL_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: SyncConfig = serde_json::from_str(r#"{"relayMode":"legacy","echoTtlMs":250}"#).unwrap();
        assert_eq!(config.relay_mode, RelayMode::Legacy);
        assert_eq!(config.echo_ttl_ms, 250);
        assert_eq!(config.selected_ids_key, SELECTED_IDS_KEY);
        assert_eq!(config.message_source, MESSAGE_SOURCE);
    }

    #[test]
    fn test_relay_mode_parse() {
        assert_eq!(" Legacy ".parse::<RelayMode>().unwrap(), RelayMode::Legacy);
        assert_eq!("channel".parse::<RelayMode>().unwrap(), RelayMode::Channel);
        assert!("pigeon".parse::<RelayMode>().is_err());
    }
}
