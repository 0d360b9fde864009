//! Checks applied to a loaded `AppConfig` before anything uses it.

use crate::config::AppConfig;
use thiserror::Error;

/// Largest response body the interceptor will hold in memory.
const MAX_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Accepted fetch deadline range in milliseconds.
const TIMEOUT_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=300_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.to_string(), reason: reason.into() }
}

impl AppConfig {
    /// Reject values the worker cannot run with.
    ///
    /// The origin must be an http(s) URL, the generation a non-empty token
    /// without whitespace, `max_bytes` within 1 byte..=50MB and
    /// `timeout_ms` within 100ms..=5min.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.origin_url()?;

        if self.generation.is_empty() {
            return Err(invalid("generation", "must not be empty"));
        }
        if self.generation.chars().any(char::is_whitespace) {
            return Err(invalid("generation", "must not contain whitespace"));
        }

        if !(1..=MAX_BODY_LIMIT).contains(&self.max_bytes) {
            return Err(invalid("max_bytes", format!("must be between 1 and {MAX_BODY_LIMIT}")));
        }

        if !TIMEOUT_RANGE_MS.contains(&self.timeout_ms) {
            return Err(invalid(
                "timeout_ms",
                format!("must be between {}ms and {}ms", TIMEOUT_RANGE_MS.start(), TIMEOUT_RANGE_MS.end()),
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.build_manifest.is_some() && !(self.build_assets.is_empty() && self.static_files.is_empty()) {
            tracing::warn!(
                build_assets = self.build_assets.len(),
                static_files = self.static_files.len(),
                "build_manifest is set; inline build_assets and static_files are ignored"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected_field(config: AppConfig) -> String {
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => field,
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_bad_origin() {
        let config = AppConfig { origin: "not a url".into(), ..Default::default() };
        assert_eq!(rejected_field(config), "origin");
    }

    #[test]
    fn test_validate_empty_generation() {
        let config = AppConfig { generation: String::new(), ..Default::default() };
        assert_eq!(rejected_field(config), "generation");
    }

    #[test]
    fn test_validate_generation_whitespace() {
        let config = AppConfig { generation: "build 1".into(), ..Default::default() };
        assert_eq!(rejected_field(config), "generation");
    }

    #[test]
    fn test_validate_max_bytes_zero() {
        let config = AppConfig { max_bytes: 0, ..Default::default() };
        assert_eq!(rejected_field(config), "max_bytes");
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert_eq!(rejected_field(config), "timeout_ms");
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert_eq!(rejected_field(config), "timeout_ms");
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        assert_eq!(rejected_field(config), "user_agent");
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let config = AppConfig { max_bytes: 1, timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());

        let config = AppConfig { max_bytes: 50 * 1024 * 1024, timeout_ms: 300_000, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
