//! Highlighter configuration
//!
//! Read from `~/.config/token-highlight/config.yaml`:
//!
//! ```yaml
//! size_limit: 1048576
//! cache_capacity: 512
//! block_size: 8192
//! mapping:
//!   tmpl: go
//!   .inc: php
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::resolver::normalize_extension;

/// Largest input that is highlighted (1 MiB); bigger inputs are escaped only
pub const DEFAULT_SIZE_LIMIT: usize = 1024 * 1024;
/// Bytes pulled from a stream per read (also the sniff window)
pub const DEFAULT_BLOCK_SIZE: usize = 8 * 1024;

/// Tunables and the extension mapping for a [`Highlighter`](crate::Highlighter)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Inputs longer than this skip highlighting
    pub size_limit: usize,
    /// Filenames remembered by the grammar cache
    pub cache_capacity: usize,
    /// Read granularity for streams
    pub block_size: usize,
    /// Extension (`.ext`) to language name
    pub mapping: HashMap<String, String>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            size_limit: DEFAULT_SIZE_LIMIT,
            cache_capacity: crate::cache::DEFAULT_CAPACITY,
            block_size: DEFAULT_BLOCK_SIZE,
            mapping: HashMap::new(),
        }
    }
}

impl HighlightConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{}", e);
                Self::default()
            }
        }
    }

    /// Read and validate a config file
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
        Self::from_yaml(&content)
            .map_err(|e| format!("Invalid config at {}: {}", path.display(), e))
    }

    /// Parse, normalize and validate YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        let mut config: Self =
            serde_yaml::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))?;
        config.mapping = config
            .mapping
            .into_iter()
            .map(|(ext, lang)| (normalize_extension(&ext), lang))
            .collect();
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the highlighter can't run with
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_capacity == 0 {
            return Err("cache_capacity must be greater than zero".to_string());
        }
        if self.block_size == 0 {
            return Err("block_size must be greater than zero".to_string());
        }
        if let Some(ext) = self.mapping.keys().find(|ext| ext.len() < 2) {
            return Err(format!("mapping has an empty extension: {:?}", ext));
        }
        Ok(())
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}
