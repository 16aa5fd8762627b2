use crate::core::ConfigError;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;
use url::Url;

fn default_timeout_secs() -> u64 {
    15
}

fn default_listen() -> String {
    "127.0.0.1:8000".to_string()
}

/// Location of the published quotation workbook.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourceConfig {
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Supabase project the rates are persisted into.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: String,
    pub table: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            listen: default_listen(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("uy", "pesotracker", "peso-tracker")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Checks every value the pipeline needs before any I/O happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url(&self.source.url, "source.url")?;
        validate_http_url(&self.store.base_url, "store.base_url")?;
        if self.store.api_key.trim().is_empty() {
            return Err(ConfigError("store.api_key must not be empty".to_string()));
        }
        if self.store.table.trim().is_empty() {
            return Err(ConfigError("store.table must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Parses `raw` as an absolute http(s) URL, naming the offending key on
/// failure.
pub(crate) fn validate_http_url(raw: &str, key: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError(format!("{key} is not a valid URL: {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError(format!(
            "{key} must use http or https, got '{}'",
            url.scheme()
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
source:
  url: "https://example.com/cotizaciones.xlsx"
store:
  base_url: "https://project.supabase.co"
  api_key: "secret"
  table: "exchange_rates"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.source.url, "https://example.com/cotizaciones.xlsx");
        assert_eq!(config.source.timeout_secs, 15);
        assert_eq!(config.store.table, "exchange_rates");
        assert_eq!(config.api.listen, "127.0.0.1:8000");
        config.validate().expect("Config should be valid");

        let yaml_str_with_overrides = r#"
source:
  url: "https://example.com/cotizaciones.xlsx"
  timeout_secs: 30
store:
  base_url: "https://project.supabase.co"
  api_key: "secret"
  table: "exchange_rates"
api:
  listen: "0.0.0.0:9000"
"#;
        let config: AppConfig =
            serde_yaml::from_str(yaml_str_with_overrides).expect("Failed to deserialize");
        assert_eq!(config.source.timeout_secs, 30);
        assert_eq!(config.api.listen, "0.0.0.0:9000");
    }

    #[test]
    fn test_validate_rejects_malformed_url() {
        let config = AppConfig {
            source: SourceConfig {
                url: "not a url".to_string(),
                timeout_secs: 15,
            },
            store: StoreConfig {
                base_url: "https://project.supabase.co".to_string(),
                api_key: "secret".to_string(),
                table: "exchange_rates".to_string(),
            },
            api: ApiConfig::default(),
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("source.url"));
    }

    #[test]
    fn test_validate_rejects_non_http_scheme() {
        let err = validate_http_url("ftp://example.com/file.xlsx", "source.url").unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_validate_rejects_empty_store_values() {
        let mut config = AppConfig {
            source: SourceConfig {
                url: "https://example.com/cotizaciones.xlsx".to_string(),
                timeout_secs: 15,
            },
            store: StoreConfig {
                base_url: "https://project.supabase.co".to_string(),
                api_key: "".to_string(),
                table: "exchange_rates".to_string(),
            },
            api: ApiConfig::default(),
        };
        assert!(config.validate().is_err());

        config.store.api_key = "secret".to_string();
        config.store.table = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
