use crate::constants;
use crate::error::{BrowseError, Result};
use crate::source::{EventSource, HttpEventSource, InMemoryEventSource, JsonFileEventSource};
use crate::types::SortKey;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    pub debounce_ms: u64,
    pub upcoming_cap: usize,
    pub default_sort: SortKey,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Memory,
    File,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            debounce_ms: constants::DEFAULT_DEBOUNCE_MS,
            upcoming_cap: constants::DEFAULT_UPCOMING_CAP,
            default_sort: SortKey::default(),
            source: SourceConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            path: None,
            base_url: None,
            timeout_seconds: constants::DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl BrowseConfig {
    /// Load `browse.toml` from the working directory, then apply env overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(constants::DEFAULT_CONFIG_PATH)
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_from_with(path, |key| std::env::var(key).ok())
    }

    /// [`BrowseConfig::load_from`] with overrides read through `lookup`.
    pub fn load_from_with<F>(path: impl AsRef<Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                BrowseError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
            })?;
            info!("Loaded config from {}", path.display());
            Self::from_toml(&content)?
        } else {
            debug!("No config at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `EVENT_BROWSE_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(constants::ENV_DEBOUNCE_MS) {
            self.debounce_ms = parse_var(constants::ENV_DEBOUNCE_MS, &value)?;
        }
        if let Some(value) = lookup(constants::ENV_UPCOMING_CAP) {
            self.upcoming_cap = parse_var(constants::ENV_UPCOMING_CAP, &value)?;
        }
        if let Some(value) = lookup(constants::ENV_SORT) {
            self.default_sort = parse_var(constants::ENV_SORT, &value)?;
        }
        if let Some(url) = lookup(constants::ENV_SOURCE_URL).filter(|u| !u.trim().is_empty()) {
            self.source.kind = SourceKind::Http;
            self.source.base_url = Some(url.trim().to_string());
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Build the configured event source.
    pub fn build_source(&self) -> Result<Arc<dyn EventSource>> {
        match self.source.kind {
            SourceKind::Memory => Ok(Arc::new(InMemoryEventSource::default())),
            SourceKind::File => {
                let path = self.source.path.clone().ok_or_else(|| {
                    BrowseError::Config("source.path is required for a file source".to_string())
                })?;
                Ok(Arc::new(JsonFileEventSource::new(path)))
            }
            SourceKind::Http => {
                let base_url = self.source.base_url.clone().ok_or_else(|| {
                    BrowseError::Config("source.base_url is required for an http source".to_string())
                })?;
                let timeout = Duration::from_secs(self.source.timeout_seconds);
                Ok(Arc::new(HttpEventSource::new(base_url, timeout)?))
            }
        }
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| BrowseError::Config(format!("Invalid {} value '{}': {}", key, value, e)))
}
