// src/core/config_manager.rs
//! Client configuration: `config.yaml` when present, environment otherwise

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

const CONFIG_FILE: &str = "config.yaml";
const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: EnvironmentConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    pub credentials_db_path: PathBuf,
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub api_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, Deserialize)]
struct Section {
    #[serde(flatten)]
    environment: EnvironmentConfig,
    service: ServiceConfig,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: Section,
    production: Section,
}

impl ConfigManager {
    /// Load all configurations
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let env = Self::get_environment();
        info!("Loading client configuration for: {}", env);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::parse(&content, &env)?
        } else {
            Self::defaults()?
        };

        config.apply_env_overrides();
        config.environment.credentials_db_path =
            resolve_path(&config.environment.credentials_db_path)?;
        config.environment.log_file = resolve_path(&config.environment.log_file)?;

        Ok(config)
    }

    fn get_environment() -> String {
        std::env::var("JOBPORTAL_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn parse(content: &str, environment: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;

        let section = match environment {
            "production" => file.production,
            _ => file.local,
        };

        Ok(Self {
            environment: section.environment,
            service: section.service,
        })
    }

    fn defaults() -> Result<Self> {
        let base_dir = std::env::current_dir().context("Failed to get current directory")?;

        Ok(Self {
            environment: EnvironmentConfig {
                credentials_db_path: base_dir.join("data").join("credentials.db"),
                log_file: std::env::temp_dir().join("jobportal.log"),
            },
            service: ServiceConfig {
                api_url: DEFAULT_API_URL.to_string(),
                timeout_seconds: DEFAULT_TIMEOUT_SECS,
                client_id: String::new(),
                client_secret: String::new(),
            },
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("JOBPORTAL_API_URL") {
            self.service.api_url = url;
        }
        if let Ok(id) = std::env::var("JOBPORTAL_CLIENT_ID") {
            self.service.client_id = id;
        }
        if let Ok(secret) = std::env::var("JOBPORTAL_CLIENT_SECRET") {
            self.service.client_secret = secret;
        }
        if let Ok(path) = std::env::var("JOBPORTAL_CREDENTIALS_DB") {
            self.environment.credentials_db_path = PathBuf::from(path);
        }
        if let Some(secs) = std::env::var("JOBPORTAL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.service.timeout_seconds = secs;
        }
    }
}

fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(current_dir.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
local:
  credentials_db_path: data/credentials.db
  log_file: /tmp/jobportal-local.log
  service:
    api_url: http://192.168.1.52:8000
    client_id: local-client
production:
  credentials_db_path: /var/lib/jobportal/credentials.db
  log_file: /var/log/jobportal.log
  service:
    api_url: https://jobs.example.com
    timeout_seconds: 10
    client_id: prod-client
    client_secret: prod-secret
"#;

    #[test]
    fn test_parse_local_section() {
        let config = ConfigManager::parse(SAMPLE, "local").unwrap();
        assert_eq!(config.service.api_url, "http://192.168.1.52:8000");
        assert_eq!(config.service.timeout_seconds, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.service.client_id, "local-client");
        assert_eq!(config.service.client_secret, "");
        assert_eq!(
            config.environment.credentials_db_path,
            PathBuf::from("data/credentials.db")
        );
    }

    #[test]
    fn test_parse_production_section() {
        let config = ConfigManager::parse(SAMPLE, "production").unwrap();
        assert_eq!(config.service.api_url, "https://jobs.example.com");
        assert_eq!(config.service.timeout_seconds, 10);
        assert_eq!(config.service.client_secret, "prod-secret");
    }

    #[test]
    fn test_parse_rejects_missing_section() {
        assert!(ConfigManager::parse("local: {}", "local").is_err());
    }

    #[test]
    fn test_resolve_path_keeps_absolute() {
        let abs = PathBuf::from("/var/lib/x.db");
        assert_eq!(resolve_path(&abs).unwrap(), abs);
        assert!(resolve_path(Path::new("rel.db")).unwrap().is_absolute());
    }
}
