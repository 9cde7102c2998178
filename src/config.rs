use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::ChartKind;

pub const APP_NAME: &str = "poverty-dashboard";

/// Checked before the per-user config directory.
pub const LOCAL_CONFIG_FILE: &str = "poverty-dashboard.toml";

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DashboardConfig {
    pub data: DataConfig,
    pub window: WindowConfig,
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Record dataset (`.json`, `.csv` or `.parquet`).
    pub records_path: PathBuf,
    /// GeoJSON region boundaries.
    pub boundaries_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            records_path: PathBuf::from("data_kemiskinan_jabar_2010_2024.json"),
            boundaries_path: PathBuf::from("jawa_barat.geojson"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 860.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChartConfig {
    pub default_kind: ChartKind,
}

impl DashboardConfig {
    /// Load from the first existing candidate file, or defaults when none
    /// exists. A file that fails to parse is logged and ignored.
    pub fn load() -> Self {
        for path in Self::candidate_paths() {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    log::info!("Using config {}", path.display());
                    return config;
                }
                Err(e) => {
                    log::warn!("Ignoring config {}: {e:#}", path.display());
                    return Self::default();
                }
            }
        }
        Self::default()
    }

    /// `./poverty-dashboard.toml`, then `<config_dir>/poverty-dashboard/config.toml`.
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(APP_NAME).join("config.toml"));
        }
        paths
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("parsing TOML config")
    }
}
