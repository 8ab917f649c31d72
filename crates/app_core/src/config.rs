//! Engine configuration

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cache: CacheConfig,
    pub prefetch: PrefetchConfig,
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Root of the durable thumbnail store; defaults to the user cache dir
    pub cache_root: Option<PathBuf>,
    /// Default thumbnail bounding dimension in pixels
    pub thumbnail_dim: u32,
    /// Capacity of the decoded full-resolution image cache
    pub full_image_capacity: usize,
    /// Capacity of the render-ready thumbnail cache
    pub thumbnail_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_root: None,
            thumbnail_dim: 192,
            full_image_capacity: 2_000,
            thumbnail_capacity: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefetchConfig {
    /// Idle re-scan interval once a pass is exhausted
    pub idle_poll_ms: u64,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self { idle_poll_ms: 2_000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Quiet period before a burst of change events settles
    pub settle_quiet_ms: u64,
    /// Completion queue drain interval for the consumer tick
    pub drain_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            settle_quiet_ms: 100,
            drain_interval_ms: 50,
        }
    }
}

impl EngineConfig {
    /// Load configuration from file
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "LightningGallery", "LightningGallery")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    /// Resolved thumbnail store root
    pub fn cache_root(&self) -> PathBuf {
        self.cache.cache_root.clone().unwrap_or_else(|| {
            ProjectDirs::from("com", "LightningGallery", "LightningGallery")
                .map(|dirs| dirs.cache_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("./cache"))
        })
    }
}
