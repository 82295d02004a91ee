use crate::error::ConfigError;
use crate::push::MAX_PUSH_PAYLOAD_BYTES;

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use time::UtcOffset;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const OFFSET_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub app_name: String,
    pub vapid_private_key: Option<String>,
    pub vapid_public_key: Option<String>,
    pub vapid_subject: Option<String>,
    pub send_timeout: Duration,
    pub max_payload_bytes: usize,
    pub utc_offset: UtcOffset,
    /// Drop subscriptions whose endpoint the push gateway reports as gone.
    pub evict_gone_subscriptions: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            app_name: "FlashStore".to_string(),
            vapid_private_key: None,
            vapid_public_key: None,
            vapid_subject: None,
            send_timeout: Duration::from_secs(10),
            max_payload_bytes: MAX_PUSH_PAYLOAD_BYTES,
            utc_offset: UtcOffset::UTC,
            evict_gone_subscriptions: true,
        }
    }
}

/// On-disk TOML configuration; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub bind: Option<SocketAddr>,
    pub app_name: Option<String>,
    pub vapid_private_key: Option<String>,
    pub vapid_public_key: Option<String>,
    pub vapid_subject: Option<String>,
    pub send_timeout_secs: Option<u64>,
    pub max_payload_bytes: Option<usize>,
    pub utc_offset: Option<String>,
    pub evict_gone_subscriptions: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Layers this file over the built-in defaults.
    pub fn into_app_config(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let send_timeout = match self.send_timeout_secs {
            Some(0) => return Err(ConfigError::InvalidTimeout),
            Some(secs) => Duration::from_secs(secs),
            None => defaults.send_timeout,
        };
        let max_payload_bytes = match self.max_payload_bytes {
            Some(bytes) => validate_payload_limit(bytes)?,
            None => defaults.max_payload_bytes,
        };
        let utc_offset = match self.utc_offset.as_deref() {
            Some(raw) => parse_utc_offset(raw)?,
            None => defaults.utc_offset,
        };

        Ok(AppConfig {
            bind: self.bind.unwrap_or(defaults.bind),
            app_name: self.app_name.unwrap_or(defaults.app_name),
            vapid_private_key: self.vapid_private_key,
            vapid_public_key: self.vapid_public_key,
            vapid_subject: self.vapid_subject,
            send_timeout,
            max_payload_bytes,
            utc_offset,
            evict_gone_subscriptions: self
                .evict_gone_subscriptions
                .unwrap_or(defaults.evict_gone_subscriptions),
        })
    }
}

/// Accepts `1..=MAX_PUSH_PAYLOAD_BYTES`.
pub fn validate_payload_limit(bytes: usize) -> Result<usize, ConfigError> {
    if bytes == 0 || bytes > MAX_PUSH_PAYLOAD_BYTES {
        return Err(ConfigError::InvalidPayloadLimit {
            got: bytes,
            max: MAX_PUSH_PAYLOAD_BYTES,
        });
    }
    Ok(bytes)
}

pub fn parse_utc_offset(raw: &str) -> Result<UtcOffset, ConfigError> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return Ok(UtcOffset::UTC);
    }
    UtcOffset::parse(value, OFFSET_FORMAT).map_err(|_| ConfigError::InvalidOffset(value.to_string()))
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    #[test]
    fn parse_utc_offset__should_accept_signed_hours_and_minutes() {
        assert_eq!(
            parse_utc_offset("+02:00").expect("offset"),
            UtcOffset::from_hms(2, 0, 0).expect("offset")
        );
        assert_eq!(
            parse_utc_offset("-05:30").expect("offset"),
            UtcOffset::from_hms(-5, -30, 0).expect("offset")
        );
        assert_eq!(parse_utc_offset("UTC").expect("offset"), UtcOffset::UTC);
    }

    #[test]
    fn parse_utc_offset__should_reject_garbage() {
        assert!(parse_utc_offset("two hours").is_err());
        assert!(parse_utc_offset("02:00").is_err());
    }

    #[test]
    fn into_app_config__should_layer_file_over_defaults() {
        // Given
        let file = FileConfig::parse(
            r#"
bind = "0.0.0.0:8080"
vapid_subject = "mailto:admin@flashstore.example"
send_timeout_secs = 3
utc_offset = "+01:00"
"#,
        )
        .expect("parse file");

        // When
        let config = file.into_app_config().expect("config");

        // Then
        assert_eq!(config.bind, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(config.app_name, "FlashStore");
        assert_eq!(config.send_timeout, Duration::from_secs(3));
        assert_eq!(config.max_payload_bytes, 3052);
        assert_eq!(
            config.vapid_subject.as_deref(),
            Some("mailto:admin@flashstore.example")
        );
        assert!(config.evict_gone_subscriptions);
    }

    #[test]
    fn into_app_config__should_reject_zero_timeout() {
        let file = FileConfig::parse("send_timeout_secs = 0").expect("parse file");

        assert!(matches!(
            file.into_app_config(),
            Err(ConfigError::InvalidTimeout)
        ));
    }

    #[test]
    fn into_app_config__should_reject_limit_above_transport_ceiling() {
        // Given
        let file = FileConfig::parse("max_payload_bytes = 3800").expect("parse file");

        // When
        let result = file.into_app_config();

        // Then
        assert!(matches!(
            result,
            Err(ConfigError::InvalidPayloadLimit { got: 3800, max: 3052 })
        ));
    }

    #[test]
    fn into_app_config__should_accept_limit_at_transport_ceiling() {
        let file = FileConfig::parse("max_payload_bytes = 3052").expect("parse file");

        assert_eq!(file.into_app_config().expect("config").max_payload_bytes, 3052);
    }

    #[test]
    fn default__should_stay_within_transport_ceiling() {
        assert!(AppConfig::default().max_payload_bytes <= MAX_PUSH_PAYLOAD_BYTES);
    }

    #[test]
    fn parse__should_reject_unknown_keys() {
        assert!(matches!(
            FileConfig::parse("colour = \"red\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
