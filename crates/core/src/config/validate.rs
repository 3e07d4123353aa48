use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Relay grace period is within a sane range
/// - ffmpeg path is not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Relay validation
    if config.relay.grace_period_ms == 0 {
        return Err(ConfigError::ValidationError(
            "relay.grace_period_ms cannot be 0".to_string(),
        ));
    }
    if config.relay.grace_period_ms > 60_000 {
        return Err(ConfigError::ValidationError(
            "relay.grace_period_ms cannot exceed 60000".to_string(),
        ));
    }
    if config.relay.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "relay.ffmpeg_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use std::net::IpAddr;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            ..Config::default()
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_grace_period_fails() {
        let mut config = Config::default();
        config.relay.grace_period_ms = 0;
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_validate_huge_grace_period_fails() {
        let mut config = Config::default();
        config.relay.grace_period_ms = 120_000;
        assert!(validate_config(&config).is_err());
    }
}
