use anyhow::{Context, Result};
use directories::{ProjectDirs, UserDirs};
use emojify_vision::HeightScaling;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("", "", "emojify"));

pub static CONFIG_PATH: Lazy<PathBuf> = Lazy::new(|| match option_env!("EMOJIFY_CONFIG_PATH") {
    Some(p) => PathBuf::from(p),
    None => PROJECT_DIRS
        .as_ref()
        .map(|d| d.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("emojify.toml")),
});

pub static DEFAULT_ASSETS_DIR: Lazy<PathBuf> =
    Lazy::new(|| match option_env!("EMOJIFY_ASSETS_DIR") {
        Some(p) => PathBuf::from(p),
        None => PROJECT_DIRS
            .as_ref()
            .map(|d| d.data_dir().join("assets"))
            .unwrap_or_else(|| PathBuf::from("assets")),
    });

/// Saved photos go to Pictures/Emojify.
pub static DEFAULT_OUTPUT_DIR: Lazy<PathBuf> = Lazy::new(|| {
    UserDirs::new()
        .and_then(|d| d.picture_dir().map(|p| p.join("Emojify")))
        .unwrap_or_else(|| PathBuf::from("Emojify"))
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding one `<expression>.png` per expression
    pub assets_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Captured photos larger than this on either side are scaled down
    pub max_dimension: u32,
    pub height_scaling: HeightScaling,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assets_dir: DEFAULT_ASSETS_DIR.clone(),
            output_dir: DEFAULT_OUTPUT_DIR.clone(),
            max_dimension: 2048,
            height_scaling: HeightScaling::Inherited,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or(&CONFIG_PATH);
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<()> {
    let path = path.unwrap_or(&CONFIG_PATH);
    let data = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)?;
    Ok(())
}
