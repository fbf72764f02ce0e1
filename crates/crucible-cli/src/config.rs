//! CLI configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use crucible_core::limits::{
    validate_concurrency, validate_graph_budget, DEFAULT_CONCURRENCY, DEFAULT_MAX_GRAPH_NODES,
};
use crucible_core::BuildOptions;
use crucible_search::{EngineConfig, MultiPathConfig};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "CRUCIBLE_CONFIG_DIR";

/// Default address for `crucible serve`
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Get the config directory
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crucible")
}

/// Get the config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get default rule table location
pub fn default_rules_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crucible")
        .join("recipes.json")
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rule table JSON file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_path: Option<PathBuf>,

    /// Worker pool size for multi-path searches
    pub concurrency: usize,

    /// Wall-clock limit for multi-path searches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Node budget for derivation graph builds
    pub max_graph_nodes: usize,

    /// Listen address for the HTTP server
    pub bind: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules_path: None,
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: None,
            max_graph_nodes: DEFAULT_MAX_GRAPH_NODES,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        let path = config_file_path();
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|e| {
            tracing::warn!("Ignoring config file {}: {:#}", path.display(), e);
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Save to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// All settable keys
    pub fn keys() -> &'static [&'static str] {
        &[
            "rules_path",
            "concurrency",
            "timeout_secs",
            "max_graph_nodes",
            "bind",
        ]
    }

    pub fn is_key(key: &str) -> bool {
        Self::keys().contains(&key)
    }

    /// Current value of a key; None for unknown keys and unset optional ones
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "rules_path" => self.rules_path.as_ref().map(|p| p.display().to_string()),
            "concurrency" => Some(self.concurrency.to_string()),
            "timeout_secs" => self.timeout_secs.map(|t| t.to_string()),
            "max_graph_nodes" => Some(self.max_graph_nodes.to_string()),
            "bind" => Some(self.bind.clone()),
            _ => None,
        }
    }

    /// Set a key from its string form; "none" clears optional keys
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let cleared = value.is_empty() || value.eq_ignore_ascii_case("none");
        match key {
            "rules_path" => {
                self.rules_path = (!cleared).then(|| PathBuf::from(value));
            }
            "concurrency" => {
                let concurrency: usize = value.parse().context("concurrency must be a number")?;
                validate_concurrency(concurrency)?;
                self.concurrency = concurrency;
            }
            "timeout_secs" => {
                self.timeout_secs = if cleared {
                    None
                } else {
                    Some(value.parse().context("timeout_secs must be a number")?)
                };
            }
            "max_graph_nodes" => {
                let nodes: usize = value.parse().context("max_graph_nodes must be a number")?;
                validate_graph_budget(nodes)?;
                self.max_graph_nodes = nodes;
            }
            "bind" => self.bind = value.to_string(),
            _ => anyhow::bail!(
                "Unknown config key: {} (available: {})",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }

    /// Search engine settings derived from this config
    pub fn engine_config(&self) -> EngineConfig {
        let mut multi_path = MultiPathConfig::default().with_concurrency(self.concurrency);
        if let Some(secs) = self.timeout_secs {
            multi_path = multi_path.with_timeout(Duration::from_secs(secs));
        }
        EngineConfig {
            build: BuildOptions::default().with_max_nodes(self.max_graph_nodes),
            multi_path,
        }
    }
}
