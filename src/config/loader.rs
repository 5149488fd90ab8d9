//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    let config: ProxyConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;
    use crate::security::headers::DiscardMode;

    #[test]
    fn test_parse_minimal() {
        let config = parse_config(r#"trusted_ips = ["10.0.0.0/24"]"#).unwrap();
        assert_eq!(config.trusted_ips, vec!["10.0.0.0/24"]);
        assert_eq!(config.headers.forwarded_for, "x-forwarded-for");
        assert_eq!(config.discarded_chain, DiscardMode::Reset);
    }

    #[test]
    fn test_parse_full() {
        let config = parse_config(
            r#"
            name = "edge"
            trusted_ips = ["10.0.0.0/8", "fd00::/8"]
            discarded_chain = "remove"

            [listener]
            bind_address = "127.0.0.1:8000"

            [upstream]
            address = "127.0.0.1:9000"

            [headers]
            real_ip = "X-Client-Ip"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.name, "edge");
        assert_eq!(config.discarded_chain, DiscardMode::Remove);
        assert_eq!(config.upstream.address, "127.0.0.1:9000");
        assert_eq!(config.headers.real_ip, "X-Client-Ip");
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_bad_cidr_fails_whole_load() {
        let err = parse_config(r#"trusted_ips = ["10.0.0.0/24", "10.0.0.0/"]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("10.0.0.0/"));
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(
            parse_config("trusted_ips = ["),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_config(Path::new("/nonexistent/real-ip.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
