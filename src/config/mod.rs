mod schema;

pub use schema::{Config, ContentSettings, DEFAULT_FLAG_FILE};

use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_ENV_VAR: &str = "DYNIF_CONFIG";

pub fn get_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }

    // default location: ~/.dynif/config.json
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dynif")
        .join("config.json")
}

/// resolve the config path, preferring an explicit CLI override
pub fn resolve_config_path(override_path: Option<&Path>) -> PathBuf {
    match override_path {
        Some(p) => p.to_path_buf(),
        None => get_config_path(),
    }
}

pub fn load() -> Result<Config> {
    load_with_override(None)
}

/// load the config, creating a default file on first use at the default
/// location; an explicitly named file must exist
pub fn load_with_override(override_path: Option<&Path>) -> Result<Config> {
    let path = resolve_config_path(override_path);

    if !path.exists() {
        if override_path.is_some() {
            return Err(anyhow!("config file not found: {}", path.display()));
        }
        let config = Config::default();
        save(&config)?;
        return Ok(config);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    // json5: comments and trailing commas are fine in config files
    let config: Config = json5::from_str(&content)
        .map_err(|e| anyhow!("failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
}

pub fn save(config: &Config) -> Result<()> {
    let path = get_config_path();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory: {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(config).context("failed to serialize config")?;

    fs::write(&path, content)
        .with_context(|| format!("failed to write config file: {}", path.display()))?;

    Ok(())
}

/// verify a configuration file and return a list of errors
pub fn verify(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(anyhow!("config file not found: {}", path.display()));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: Config = match json5::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            return Err(anyhow!("invalid config: {}", e));
        }
    };

    let mut errors = Vec::new();

    if config.content.extensions.is_empty() {
        errors.push("content.extensions: must name at least one extension".to_string());
    }
    for (i, ext) in config.content.extensions.iter().enumerate() {
        if ext.is_empty() {
            errors.push(format!("content.extensions[{}]: empty extension", i));
        } else if ext.starts_with('.') {
            errors.push(format!(
                "content.extensions[{}]: write '{}' without the leading dot",
                i,
                ext.trim_start_matches('.')
            ));
        }
    }

    if let Some(flag_file) = &config.content.flag_file {
        if flag_file.as_os_str().is_empty() {
            errors.push("content.flag_file: must not be empty".to_string());
        }
    }

    Ok(errors)
}
