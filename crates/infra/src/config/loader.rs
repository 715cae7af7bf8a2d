//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `SHOWINGS_DB_PATH`: Database file path
//! - `SHOWINGS_DB_POOL_SIZE`: Connection pool size
//! - `SHOWINGS_DEFAULT_DURATION`: Default visit duration in minutes
//! - `SHOWINGS_OPEN_TIME`: Opening time (HH:MM)
//! - `SHOWINGS_CLOSE_TIME`: Closing time (HH:MM)
//! - `SHOWINGS_SLOT_MINUTES`: Slot granularity in minutes
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./showings.json` or `./showings.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use showings_domain::{
    Config, DatabaseConfig, OperatingHours, Result, SchedulingConfig, SchedulingError,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `SchedulingError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present. Returns an error
/// if any are missing.
///
/// # Errors
/// Returns `SchedulingError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("SHOWINGS_DB_PATH")?;
    let db_pool_size = env_var("SHOWINGS_DB_POOL_SIZE").and_then(|s| {
        s.parse::<u32>().map_err(|e| SchedulingError::Config(format!("Invalid pool size: {e}")))
    })?;

    let default_duration = env_var("SHOWINGS_DEFAULT_DURATION").and_then(|s| {
        s.parse::<u32>()
            .map_err(|e| SchedulingError::Config(format!("Invalid default duration: {e}")))
    })?;
    let open = env_time("SHOWINGS_OPEN_TIME")?;
    let close = env_time("SHOWINGS_CLOSE_TIME")?;
    let slot_minutes = env_var("SHOWINGS_SLOT_MINUTES").and_then(|s| {
        s.parse::<u32>()
            .map_err(|e| SchedulingError::Config(format!("Invalid slot granularity: {e}")))
    })?;

    let operating_hours = OperatingHours { open, close, slot_minutes };
    operating_hours
        .validate()
        .map_err(|e| SchedulingError::Config(format!("Invalid operating hours: {e}")))?;

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        scheduling: SchedulingConfig {
            default_duration_minutes: default_duration,
            operating_hours,
        },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `SchedulingError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SchedulingError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SchedulingError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SchedulingError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let config: Config = match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SchedulingError::Config(format!("Invalid TOML format: {e}")))?,
        "json" => serde_json::from_str(contents)
            .map_err(|e| SchedulingError::Config(format!("Invalid JSON format: {e}")))?,
        _ => {
            return Err(SchedulingError::Config(format!(
                "Unsupported config format: {extension}"
            )))
        }
    };

    config
        .scheduling
        .operating_hours
        .validate()
        .map_err(|e| SchedulingError::Config(format!("Invalid operating hours: {e}")))?;
    Ok(config)
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, up to two parent levels, and the
/// executable's directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("showings.json"),
            cwd.join("showings.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
            cwd.join("../../config.json"),
            cwd.join("../../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("showings.json"),
                exe_dir.join("showings.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        SchedulingError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn env_time(key: &str) -> Result<NaiveTime> {
    let raw = env_var(key)?;
    NaiveTime::parse_from_str(&raw, "%H:%M")
        .map_err(|e| SchedulingError::Config(format!("Invalid time for {key}: {e}")))
}
