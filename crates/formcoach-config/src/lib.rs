mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Platform configuration directory for formcoach, created on demand.
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .context("could not determine the platform config directory")?
        .join("formcoach");
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(dir)
}

/// Path of the settings file, `config.toml` inside [`config_dir`].
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load the settings file, or fall back to defaults when none exists yet.
pub fn load_config() -> Result<AppConfig> {
    load_from(&config_path()?)
}

/// Persist the settings. The application saves at session end, which also
/// creates the editable file on first run.
pub fn save_config(config: &AppConfig) -> Result<()> {
    save_to(&config_path()?, config)
}

fn load_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        info!("No config found, using defaults");
        return Ok(AppConfig::default());
    }
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
    info!(?path, "Loaded config");
    Ok(config)
}

fn save_to(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    info!(?path, "Saved config");
    Ok(())
}
