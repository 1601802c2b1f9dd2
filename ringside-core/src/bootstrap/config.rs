use anyhow::Result;
use tracing::info;

use crate::Config;

const CONFIG_PATH_ENV: &str = "RINGSIDE_CONFIG_PATH";

/// Pick the config file to read.
///
/// Search order: explicit path, `RINGSIDE_CONFIG_PATH`, `./config.yaml`,
/// `/config/config.yaml`. `None` means environment variables only.
fn resolve_config_path(explicit: Option<&str>) -> Option<String> {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .into_iter()
        .chain(["config.yaml".to_string(), "/config/config.yaml".to_string()])
        .find(|p| std::path::Path::new(p).exists())
}

/// Load and validate configuration, failing fast on any invalid value
pub fn load_config(explicit_path: Option<&str>) -> Result<Config> {
    let config = match resolve_config_path(explicit_path) {
        Some(path) => {
            eprintln!("Loading config from {path}");
            Config::from_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config from {path}: {e}"))?
        }
        None => {
            eprintln!("No config file found, using environment variables");
            Config::from_env()
                .map_err(|e| anyhow::anyhow!("Failed to load config from environment: {e}"))?
        }
    };

    if let Err(errors) = config.validate() {
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s): {}",
            errors.len(),
            errors.join("; ")
        ));
    }

    info!(
        http_address = %config.http_address(),
        storage = ?config.storage.backend,
        "Configuration loaded"
    );
    Ok(config)
}
