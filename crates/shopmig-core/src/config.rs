use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load process configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load process configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let non_empty = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        if raw.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "value must not be empty".to_string(),
            });
        }
        Ok(raw)
    };

    let input_dir = PathBuf::from(non_empty("SHOPMIG_INPUT_DIR", "./products")?);
    let output_dir = PathBuf::from(non_empty("SHOPMIG_OUTPUT_DIR", "./output")?);
    let profile_path = lookup("SHOPMIG_PROFILE_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let log_level = or_default("SHOPMIG_LOG_LEVEL", "info");
    let assembly_concurrency = parse_usize("SHOPMIG_ASSEMBLY_CONCURRENCY", "4")?.max(1);
    let output_prefix = non_empty("SHOPMIG_OUTPUT_PREFIX", "matrixify")?;

    Ok(AppConfig {
        input_dir,
        output_dir,
        profile_path,
        log_level,
        assembly_concurrency,
        output_prefix,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
