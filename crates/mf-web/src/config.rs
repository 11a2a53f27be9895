//! Web Configuration
//!
//! Build-time settings shared by the shell and the remote surfaces.

use log::warn;
use mf_sync::{RelayMode, SyncConfig};

pub const DEFAULT_API_URL: &str = "https://boasorte.teddybackoffice.com.br";

#[derive(Debug, Clone, PartialEq)]
pub struct WebConfig {
    pub api_base_url: String,
    pub sync: SyncConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            sync: SyncConfig::default(),
        }
    }
}

impl WebConfig {
    /// Read `CLIENT_ADMIN_API_URL` and `CLIENT_ADMIN_RELAY` as set when the
    /// bundle was built
    pub fn from_env() -> Self {
        Self::from_values(option_env!("CLIENT_ADMIN_API_URL"), option_env!("CLIENT_ADMIN_RELAY"))
    }

    pub fn from_values(api_url: Option<&str>, relay: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(url) = api_url.map(str::trim).filter(|url| !url.is_empty()) {
            config.api_base_url = url.to_string();
        }
        if let Some(raw) = relay {
            match raw.parse::<RelayMode>() {
                Ok(mode) => config.sync.relay_mode = mode,
                Err(err) => warn!("[config] {}, keeping {}", err, config.sync.relay_mode),
            }
        }
        config
    }
}
