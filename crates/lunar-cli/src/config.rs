//! Configuration file parsing for lunar.toml.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Defaults for `lunar list`
    #[serde(default)]
    pub listing: ListingConfig,

    /// Defaults for `lunar dump`
    #[serde(default)]
    pub dump: DumpConfig,
}

/// Listing detail sections shown by default.
#[derive(Debug, Default, Deserialize)]
pub struct ListingConfig {
    /// Print each function's constant pool
    #[serde(default)]
    pub constants: bool,

    /// Print each function's local variables
    #[serde(default)]
    pub locals: bool,

    /// Print each function's upvalues
    #[serde(default)]
    pub upvalues: bool,
}

/// JSON dump settings.
#[derive(Debug, Default, Deserialize)]
pub struct DumpConfig {
    /// Indent the JSON output
    #[serde(default)]
    pub pretty: bool,
}

/// Load configuration from a file or search for default config files.
///
/// An explicitly given path must exist; a missing default file falls back to
/// [`Config::default`].
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path.filter(|p| !p.exists()) {
        anyhow::bail!("Config file not found: {}", path.display());
    }

    let config_path = path.map(PathBuf::from).or_else(find_config_file);

    match config_path {
        Some(path) if path.exists() => {
            let content = std::fs::read_to_string(&path)?;
            let config = parse_config(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
            tracing::debug!(path = %path.display(), "loaded config");
            Ok(config)
        }
        _ => Ok(Config::default()),
    }
}

/// Parse configuration text.
pub fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

/// Search for configuration file in the current directory and parent directories.
fn find_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_ancestors(&cwd)
}

fn find_config_in_ancestors(start: &Path) -> Option<PathBuf> {
    const CONFIG_NAMES: &[&str] = &["lunar.toml", ".lunarrc.toml"];

    let mut dir = Some(start);
    while let Some(current) = dir {
        for name in CONFIG_NAMES {
            let path = current.join(name);
            if path.exists() {
                return Some(path);
            }
        }
        dir = current.parent();
    }

    None
}
