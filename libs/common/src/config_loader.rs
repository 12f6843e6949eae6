//! Configuration loading helper functions
//!
//! Layers a typed configuration from defaults, a file and the environment.

use errors::{OutageError, OutageResult};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Directory searched for `{service}.yaml` when no file is given
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Separator for nested keys in environment variables (`OUTAGE_RETRY__MAX_RETRIES`)
pub const ENV_NESTING_SEPARATOR: &str = "__";

/// Load configuration from multiple sources
///
/// Priority (highest to lowest):
/// 1. Environment variables starting with `env_prefix`
/// 2. `explicit_path` if given, otherwise `config/{service_name}.yaml` when present
/// 3. `T::default()`
///
/// A missing default file is fine; a missing explicit file is an error.
pub fn load_config<T>(
    service_name: &str,
    env_prefix: &str,
    explicit_path: Option<&Path>,
) -> OutageResult<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    let mut figment = Figment::from(Serialized::defaults(T::default()));

    match explicit_path {
        Some(path) => {
            if !path.exists() {
                return Err(OutageError::Configuration(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            info!("Loading configuration from {}", path.display());
            figment = merge_file(figment, path)?;
        },
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_DIR).join(format!("{}.yaml", service_name));
            if default_path.exists() {
                info!("Loading configuration from {}", default_path.display());
                figment = figment.merge(Yaml::file(default_path));
            } else {
                debug!("No config file at {}, using defaults", default_path.display());
            }
        },
    }

    figment
        .merge(Env::prefixed(env_prefix).split(ENV_NESTING_SEPARATOR))
        .extract()
        .map_err(|e| OutageError::Configuration(format!("Failed to load configuration: {}", e)))
}

fn merge_file(figment: Figment, path: &Path) -> OutageResult<Figment> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| OutageError::Configuration("Config file must have an extension".to_string()))?;

    match extension {
        "toml" => Ok(figment.merge(Toml::file(path))),
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        "json" => Ok(figment.merge(Json::file(path))),
        _ => Err(OutageError::Configuration(format!(
            "Unsupported config file format: {}",
            extension
        ))),
    }
}
