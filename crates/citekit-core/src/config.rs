use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CitekitError, Result};
use crate::models::Language;

/// Root application configuration, loaded from `~/.config/citekit/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub metadata: MetadataConfig,
    pub cache: CacheConfig,
    pub abbreviation: AbbreviationConfig,
    pub output: OutputConfig,
}

/// Remote metadata service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polite_email: Option<String>,
    pub min_interval_ms: u64,
    pub max_retries: u32,
    /// Worker count for the first fetch pass.
    pub concurrency: usize,
    /// Worker count for the retry pass over failed DOIs.
    pub retry_concurrency: usize,
    /// Shorter leftovers are not sent to the bibliographic search.
    pub min_query_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_hours: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AbbreviationConfig {
    /// Tab-separated word/abbreviation table. The bundled starter table is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub language: Language,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.crossref.org".to_string(),
            polite_email: None,
            min_interval_ms: 100,
            max_retries: 3,
            concurrency: 3,
            retry_concurrency: 2,
            min_query_chars: 30,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_hours: 48,
            directory: None,
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/citekit/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("CITEKIT_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("citekit")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let base = &self.metadata.base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(CitekitError::ConfigError(format!(
                "metadata.base_url must be an http(s) URL, got {base:?}"
            )));
        }
        if self.metadata.concurrency == 0 || self.metadata.retry_concurrency == 0 {
            return Err(CitekitError::ConfigError(
                "metadata concurrency settings must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    // ─── Derived paths ─────────────────────────────────────

    /// Directory holding cached metadata records.
    pub fn cache_dir(&self) -> PathBuf {
        match &self.cache.directory {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join("citekit")
                .join("cache"),
        }
    }

    pub fn cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cache.ttl_hours * 3600)
    }
}
