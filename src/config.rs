use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_DOWN_THRESHOLD: f64 = 150.0;
pub const DEFAULT_UP_THRESHOLD: f64 = 300.0;
pub const DEFAULT_FOLD_LEVEL: u8 = 3;
pub const DEFAULT_SUPPRESSION_MS: u64 = 100;
pub const DEFAULT_SCROLL_OFFSET_KEY: &str = "sidebar-scroll-offset";

/// Tunables for header tracking and sidebar synchronisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Distance in px from the viewport top where a header becomes current when scrolling down
    pub down_threshold: f64,
    /// Same as `down_threshold`, used while scrolling up
    pub up_threshold: f64,
    /// Heading level from which sidebar sub-navigation starts collapsed
    pub fold_level: u8,
    /// How long scroll-driven updates are ignored after a sidebar click
    pub suppression_ms: u64,
    /// Session storage key holding the sidebar offset of the last clicked link
    pub scroll_offset_key: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            down_threshold: DEFAULT_DOWN_THRESHOLD,
            up_threshold: DEFAULT_UP_THRESHOLD,
            fold_level: DEFAULT_FOLD_LEVEL,
            suppression_ms: DEFAULT_SUPPRESSION_MS,
            scroll_offset_key: DEFAULT_SCROLL_OFFSET_KEY.to_string(),
        }
    }
}

impl NavConfig {
    pub fn load_or_default(file_path: Option<&str>) -> Self {
        match file_path {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                log::error!("Failed to load navigation config from {path}: {e}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let path = Path::new(file_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config = match serde_json::from_str::<Self>(content) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to parse navigation config: {e}");
                return Err(anyhow::anyhow!("Failed to parse navigation config: {}", e));
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(2..=7).contains(&self.fold_level) {
            anyhow::bail!("fold_level must be between 2 and 7, got {}", self.fold_level);
        }
        if self.down_threshold < 0.0 || self.up_threshold < 0.0 {
            anyhow::bail!("thresholds must not be negative");
        }
        if self.up_threshold < self.down_threshold {
            anyhow::bail!(
                "up_threshold ({}) must not be smaller than down_threshold ({})",
                self.up_threshold,
                self.down_threshold
            );
        }
        if self.scroll_offset_key.is_empty() {
            anyhow::bail!("scroll_offset_key must not be empty");
        }
        Ok(())
    }
}
