use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sesslog_providers::{ProviderSet, SessionSource};
use sesslog_providers::claude::ClaudeSource;
use sesslog_providers::codex::CodexSource;
use std::path::{Path, PathBuf};

/// Optional on-disk configuration.
///
/// Everything has a working default; the file only pins down what the user
/// wants to override. Resolution order for each setting is CLI flag, then
/// environment, then this file, then the platform default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Index database location.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Claude Code projects directory.
    #[serde(default)]
    pub claude_root: Option<PathBuf>,
    /// Codex sessions directory.
    #[serde(default)]
    pub codex_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Listing limit when no filter is active.
    #[serde(default)]
    pub default_limit: Option<usize>,
}

impl Config {
    /// Load from the default location; a missing file is the default config.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// `SESSLOG_CONFIG` override, else `<config_dir>/sesslog/config.toml`.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("SESSLOG_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sesslog")
            .join("config.toml")
    }

    /// Index db path: explicit flag, `SESSLOG_DB`, config file, then the
    /// platform cache directory.
    pub fn resolve_db_path(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Ok(path) = std::env::var("SESSLOG_DB") {
            return PathBuf::from(path);
        }
        if let Some(path) = &self.index.db_path {
            return path.clone();
        }
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("sesslog")
            .join("index.db")
    }

    /// Source registry honoring configured roots; unset roots fall back to
    /// each source's env-overridable default.
    pub fn provider_set(&self) -> ProviderSet {
        let claude = match &self.providers.claude_root {
            Some(root) => ClaudeSource::with_root(root.clone()),
            None => ClaudeSource::new(),
        };
        let codex = match &self.providers.codex_root {
            Some(root) => CodexSource::with_root(root.clone()),
            None => CodexSource::new(),
        };
        let sources: Vec<Box<dyn SessionSource>> = vec![Box::new(claude), Box::new(codex)];
        ProviderSet::new(sources)
    }
}
