//! Configuration management for the access engine
//!
//! This module handles loading and validation of all engine configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{AccessError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the engine
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub service: ServiceConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AccessError::Config(format!("Failed to read config file: {}", e)))?;

        let service: ServiceConfig = serde_yaml::from_str(&content)?;
        let config = Self { service };
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from `ACCESS_*` environment variables (and a `.env` file if present)
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        let _ = dotenvy::dotenv();

        let service = ServiceConfig::from_lookup(|key| std::env::var(key).ok())?;
        let config = Self { service };
        config.validate()?;
        Ok(config)
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.service.auth
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.service.storage
    }

    pub fn events(&self) -> &EventsConfig {
        &self.service.events
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.service.logging
    }

    pub fn seed(&self) -> &SeedConfig {
        &self.service.seed
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.service
            .auth
            .validate()
            .map_err(|e| AccessError::Config(format!("Auth config error: {}", e)))?;
        self.service
            .storage
            .validate()
            .map_err(|e| AccessError::Config(format!("Storage config error: {}", e)))?;
        self.service
            .events
            .validate()
            .map_err(|e| AccessError::Config(format!("Events config error: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_config_from_file() {
        let config_content = r#"
auth:
  jwt_secret: "Test-Secret-That-Is-Long-Enough-1234567890"
  access_expiration: 600
  refresh_expiration: 7200
storage:
  backend: memory
events:
  queue_capacity: 32
logging:
  level: debug
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = Config::from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.auth().access_expiration, 600);
        assert_eq!(config.auth().refresh_expiration, 7200);
        assert_eq!(config.storage().backend, StoreBackend::Memory);
        assert_eq!(config.events().queue_capacity, 32);
        assert_eq!(config.logging().level, "debug");
        assert!(config.seed().template_dir.is_none());
    }

    #[tokio::test]
    async fn test_config_from_file_rejects_short_secret() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"auth:\n  jwt_secret: short\n")
            .unwrap();

        let result = Config::from_file(temp_file.path()).await;
        assert!(matches!(result, Err(AccessError::Config(_))));
    }

    #[tokio::test]
    async fn test_config_from_missing_file() {
        let result = Config::from_file("/definitely/not/here.yaml").await;
        assert!(matches!(result, Err(AccessError::Config(_))));
    }

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage().backend, StoreBackend::Redis);
        assert_eq!(config.auth().jwt_secret.len(), 64);
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("ACCESS_JWT_SECRET", "Another-Secret-That-Is-Long-Enough-0987"),
            ("ACCESS_TOKEN_TTL", "120"),
            ("ACCESS_REFRESH_TTL", "240"),
            ("ACCESS_STORE", "memory"),
            ("ACCESS_EVENT_QUEUE", "8"),
            ("ACCESS_LOG_JSON", "true"),
            ("ACCESS_SEED_DIR", "/srv/templates"),
        ]
        .into_iter()
        .collect();

        let service =
            ServiceConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(service.auth.access_expiration, 120);
        assert_eq!(service.auth.refresh_expiration, 240);
        assert_eq!(service.storage.backend, StoreBackend::Memory);
        assert_eq!(service.events.queue_capacity, 8);
        assert!(service.logging.json);
        assert_eq!(
            service.seed.template_dir.as_deref(),
            Some(Path::new("/srv/templates"))
        );
    }

    #[test]
    fn test_from_lookup_rejects_bad_number() {
        let result = ServiceConfig::from_lookup(|key| {
            (key == "ACCESS_TOKEN_TTL").then(|| "ten".to_string())
        });
        assert!(matches!(result, Err(AccessError::Config(_))));
    }

    #[test]
    fn test_auth_debug_redacts_secret() {
        let config = AuthConfig::default();
        let printed = format!("{:?}", config);
        assert!(printed.contains("[REDACTED]"));
        assert!(!printed.contains(&config.jwt_secret));
    }
}
