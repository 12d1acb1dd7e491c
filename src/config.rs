//! Configuration management for the administration client.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. Values are resolved in this order:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8787";

fn app_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("lmsadm");
    path
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/lmsadm/.env`
/// - macOS: `~/Library/Application Support/lmsadm/.env`
/// - Windows: `%LOCALAPPDATA%/lmsadm/.env`
///
/// A missing file is not an error; every setting has an environment variable
/// and most have a default. A file that exists but cannot be parsed is.
///
/// # Example
///
/// ```
/// if let Err(e) = config::load_env().await {
///     eprintln!("Configuration error: {}", e);
/// }
/// ```
pub async fn load_env() -> Result<(), String> {
    let path = app_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
    }
    Ok(())
}

/// Base URL of the remote REST API, e.g. `https://lms.example.com/api`.
///
/// Reads `LMSADM_API_URL`. `None` means no backend is configured and the
/// client has to run in offline mode.
///
/// # Returns
///
/// The URL without trailing slashes, or `None` when the variable is unset or
/// empty.
///
/// # Example
///
/// ```
/// // LMSADM_API_URL=https://lms.example.com/api/
/// assert_eq!(config::api_url().as_deref(), Some("https://lms.example.com/api"));
/// ```
pub fn api_url() -> Option<String> {
    env::var("LMSADM_API_URL")
        .ok()
        .map(|url| url.trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty())
}

/// Bearer token sent with every API request (`LMSADM_API_TOKEN`).
pub fn api_token() -> Option<String> {
    env::var("LMSADM_API_TOKEN").ok().filter(|t| !t.is_empty())
}

/// Number of entities per page (`LMSADM_PAGE_SIZE`, default 10).
///
/// Values that are not a positive integer fall back to the default, so the
/// result is always at least 1.
///
/// # Example
///
/// ```
/// let courses = EntityManager::new(EntityKind::Course, remote, config::page_size());
/// ```
pub fn page_size() -> usize {
    env::var("LMSADM_PAGE_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

/// Whether to use the local store as the system of record (`LMSADM_OFFLINE`).
///
/// Accepts `true/false`, `yes/no`, `on/off` and `1/0`; anything else counts
/// as `false`. The `--offline` flag forces offline mode regardless.
pub fn offline() -> bool {
    env_flag("LMSADM_OFFLINE")
}

/// Directory of the local store and uploaded media (`LMSADM_DATA_DIR`).
///
/// Defaults to `<local data dir>/lmsadm/data`.
pub fn data_dir() -> PathBuf {
    match env::var("LMSADM_DATA_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => app_dir().join("data"),
    }
}

/// Bind address of the mock backend (`LMSADM_SERVER_ADDRESS`).
///
/// Defaults to `127.0.0.1:8787`. Overridden by `lmsadm serve --addr`.
pub fn server_addr() -> String {
    env::var("LMSADM_SERVER_ADDRESS").unwrap_or_else(|_| DEFAULT_SERVER_ADDRESS.to_string())
}

/// Whether diagnostic lines are printed (`LMSADM_DEBUG`).
pub fn debug_enabled() -> bool {
    env_flag("LMSADM_DEBUG")
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| crate::utils::parse_bool(&v))
        .unwrap_or(false)
}
