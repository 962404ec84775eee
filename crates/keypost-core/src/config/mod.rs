mod database;

pub use database::DatabaseConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{KeypostError, Result};

/// Root configuration for the keypost service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeypostConfig {
    /// Service metadata.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration.
    pub database: DatabaseConfig,
}

impl KeypostConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| KeypostError::Config(format!("Failed to read config file: {}", e)))?;

        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self> {
        // Substitute environment variables
        let content = substitute_env_vars(content);

        toml::from_str(&content)
            .map_err(|e| KeypostError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration with defaults.
    pub fn default_with_database_url(url: &str) -> Self {
        Self {
            service: ServiceConfig::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: url.to_string(),
                ..Default::default()
            },
        }
    }
}

/// Service metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name, also the seed for the log color.
    #[serde(default = "default_service_name")]
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
        }
    }
}

fn default_service_name() -> String {
    "keypost".to_string()
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP port.
    #[serde(default = "default_http_port")]
    pub port: u16,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_http_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    1
}

/// Substitute environment variables in the format ${VAR_NAME}.
fn substitute_env_vars(content: &str) -> String {
    let mut result = content.to_string();
    let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(&cap[0], &value);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = KeypostConfig::default_with_database_url("sqlite://keypost.db");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.service.name, "keypost");
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [database]
            url = "sqlite://keypost.db"
        "#;

        let config = KeypostConfig::parse_toml(toml).unwrap();
        assert_eq!(config.database.url, "sqlite://keypost.db");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout_secs, 1);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [service]
            name = "usersvc"

            [server]
            port = 3000
            request_timeout_secs = 5

            [database]
            url = "sqlite:///var/lib/keypost/keypost.db"
            pool_size = 4
        "#;

        let config = KeypostConfig::parse_toml(toml).unwrap();
        assert_eq!(config.service.name, "usersvc");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_secs, 5);
        assert_eq!(config.database.pool_size, 4);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_KEYPOST_DB_URL", "sqlite:///tmp/test.db");

        let toml = r#"
            [database]
            url = "${TEST_KEYPOST_DB_URL}"
        "#;

        let config = KeypostConfig::parse_toml(toml).unwrap();
        assert_eq!(config.database.url, "sqlite:///tmp/test.db");

        std::env::remove_var("TEST_KEYPOST_DB_URL");
    }
}
