//! Shell Configuration

use log::Level;
use mf_web::WebConfig;

pub const DEFAULT_LOG_LEVEL: Level = Level::Info;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub web: WebConfig,
    pub log_level: Level,
}

impl AppConfig {
    /// Build-time settings: `CLIENT_ADMIN_API_URL`, `CLIENT_ADMIN_RELAY`
    /// and `CLIENT_ADMIN_LOG`
    pub fn from_env() -> Self {
        Self {
            web: WebConfig::from_env(),
            log_level: parse_level(option_env!("CLIENT_ADMIN_LOG")),
        }
    }
}

/// Unknown or missing levels fall back to `info`
pub fn parse_level(raw: Option<&str>) -> Level {
    raw.and_then(|raw| raw.trim().parse::<Level>().ok())
        .unwrap_or(DEFAULT_LOG_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(None), Level::Info);
        assert_eq!(parse_level(Some("debug")), Level::Debug);
        assert_eq!(parse_level(Some(" WARN ")), Level::Warn);
        assert_eq!(parse_level(Some("chatty")), Level::Info);
    }
}
