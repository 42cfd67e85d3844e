//! Configuration stored in `walkmate.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::{service::FeedSettings, validators::is_valid_url};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "WALKMATE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "walkmate.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkmateConfig {
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    Redis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: default_redis_url(),
            prefix: default_prefix(),
        }
    }
}

fn default_redis_url() -> String {
    "${REDIS_URL}".to_string()
}

fn default_prefix() -> String {
    "walkmate".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `env_logger` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Where the CLI keeps its session token; defaults to `.walkmate-session.toml` in the
    /// current directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl SessionSettings {
    pub fn path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(".walkmate-session.toml"))
    }
}

impl WalkmateConfig {
    /// `explicit`, else `$WALKMATE_CONFIG`, else `./walkmate.toml` if present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The Redis URL with a `${VAR}` value expanded from the environment.
    pub fn redis_url(&self) -> Result<String> {
        let url = self.store.url.as_str();
        let resolved = if url.starts_with("${") && url.ends_with('}') {
            let var_name = &url[2..url.len() - 1];
            std::env::var(var_name).with_context(|| format!("Environment variable {var_name} not set"))?
        } else {
            url.to_string()
        };

        if !is_valid_url(&resolved) {
            bail!("Invalid Redis URL: {resolved}");
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;
    use crate::service::FeedOrdering;

    #[test]
    fn test_default_config() {
        let config = WalkmateConfig::default();
        assert_eq!(config.store.backend, StoreBackend::Redis);
        assert_eq!(config.store.url, "${REDIS_URL}");
        assert_eq!(config.store.prefix, "walkmate");
        assert_eq!(config.feed, FeedSettings::default());
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn parses_partial_files() {
        let config = WalkmateConfig::from_toml(
            r#"
            [store]
            backend = "memory"

            [feed]
            per_followee_limit = 3
            ordering = "recency"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.prefix, "walkmate");
        assert_eq!(config.feed.per_followee_limit, Some(3));
        assert_eq!(config.feed.ordering, FeedOrdering::Recency);
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = toml::to_string_pretty(&WalkmateConfig::default()).unwrap();
        assert!(toml_str.contains("backend"));
        assert!(toml_str.contains("prefix"));
    }

    #[test]
    fn reads_explicit_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walkmate.toml");
        std::fs::write(&path, "[store]\nurl = \"redis://10.0.0.5:6379\"\n").unwrap();
        let config = WalkmateConfig::load(Some(&path)).unwrap();
        assert_eq!(config.redis_url().unwrap(), "redis://10.0.0.5:6379");
    }

    #[test]
    #[serial]
    fn expands_redis_url_from_environment() {
        let config = WalkmateConfig::default();
        // SAFETY: serialized with every other test touching the process environment.
        unsafe { std::env::set_var("REDIS_URL", "redis://127.0.0.1:6379") };
        assert_eq!(config.redis_url().unwrap(), "redis://127.0.0.1:6379");

        unsafe { std::env::remove_var("REDIS_URL") };
        assert!(config.redis_url().is_err());
    }

    #[test]
    #[serial]
    fn config_env_points_at_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[store]\nprefix = \"walks\"\n").unwrap();
        unsafe { std::env::set_var(CONFIG_ENV, &path) };
        let config = WalkmateConfig::load(None);
        unsafe { std::env::remove_var(CONFIG_ENV) };
        assert_eq!(config.unwrap().store.prefix, "walks");
    }
}
