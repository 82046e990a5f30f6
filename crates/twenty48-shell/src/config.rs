use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct ShellConfig {
    /// Directory holding `scores.db`.
    #[serde(default = "defaults::store_dir")]
    pub store_dir: PathBuf,

    /// Persist the best score and finished games between runs.
    #[serde(default = "defaults::persist")]
    pub persist: bool,

    /// Default log filter, e.g. "info", "debug". `RUST_LOG` still wins.
    #[serde(default = "defaults::log_level")]
    pub log_level: String,

    #[serde(default)]
    pub render: Render,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Render {
    /// Characters per board cell; tiles wider than this overflow the cell.
    #[serde(default = "defaults::cell_width")]
    pub cell_width: usize,
    /// Print slides/merges/spawn after each move.
    #[serde(default)]
    pub show_events: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            store_dir: defaults::store_dir(),
            persist: defaults::persist(),
            log_level: defaults::log_level(),
            render: Render::default(),
        }
    }
}

impl Default for Render {
    fn default() -> Self {
        Self { cell_width: defaults::cell_width(), show_events: false }
    }
}

impl ShellConfig {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let cfg: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(cfg)
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn store_dir() -> PathBuf { PathBuf::from(".twenty48") }
    pub fn persist() -> bool { true }
    pub fn log_level() -> String { "info".to_string() }
    pub fn cell_width() -> usize { 7 }
}
