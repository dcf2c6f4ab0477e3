//! Configuration loading

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::Config;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "CONNECTVIEW_CONFIG_PATH";

/// Load configuration from a config file or environment variables
///
/// Config file search order:
/// 1. `explicit` (e.g. a `--config` flag)
/// 2. `CONNECTVIEW_CONFIG_PATH` environment variable
/// 3. ./config.yaml (current working directory)
/// 4. /config/config.yaml (Kubernetes mount path)
/// 5. Fall back to environment variables only
///
/// A config file that exists but fails to parse is an error, not a fallback.
pub fn load_config(explicit: Option<&str>) -> Result<Config> {
    let config_path = find_config_path(explicit)?;

    let config = match &config_path {
        Some(path) => Config::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config from {path}: {e}"))?,
        None => Config::from_env()?,
    };

    if let Err(errors) = config.validate() {
        for error in &errors {
            tracing::error!("Config validation error: {}", error);
        }
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s): {}",
            errors.len(),
            errors.join("; ")
        ));
    }

    info!(
        path = config_path.as_deref().unwrap_or("<env>"),
        clusters = config.clusters.len(),
        cache_enabled = config.cache.enabled,
        "Configuration loaded and validated"
    );

    Ok(config)
}

fn find_config_path(explicit: Option<&str>) -> Result<Option<String>> {
    if let Some(path) = explicit {
        if !Path::new(path).exists() {
            anyhow::bail!("Config file {path} does not exist");
        }
        return Ok(Some(path.to_string()));
    }

    let candidate = std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|p| Path::new(p).exists())
        .or_else(|| {
            ["config.yaml", "/config/config.yaml"]
                .into_iter()
                .find(|p| Path::new(p).exists())
                .map(ToString::to_string)
        });

    Ok(candidate)
}
