/// Configuration resolution module
///
/// This module handles:
/// - Building an AppConfig from CLI arguments
/// - Resolving the acting user from flags and the environment
/// - Resolving the data directory and the uploads directory under it
use crate::cli::{self, CliArgs};
use crate::types::OwnerId;
use log::debug;
use std::env;
use std::path::PathBuf;

/// Environment variable naming the acting user
pub const USER_ENV: &str = "EQUIPMENT_SUMMARY_USER";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "EQUIPMENT_SUMMARY_DATA_DIR";

/// Subdirectory of the data directory holding retained uploads
pub const UPLOADS_DIR: &str = "uploads";

/// Fully resolved settings for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub owner: OwnerId,
    pub data_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub use_colors: bool,
}

/// Build a complete AppConfig from CLI arguments and the process environment
pub fn build_app_config(args: &CliArgs) -> Result<AppConfig, String> {
    build_app_config_with(args, |key| env::var(key).ok())
}

/// Build an AppConfig, reading environment variables through `lookup`
///
/// Resolution order:
/// - owner: `--user`, `$EQUIPMENT_SUMMARY_USER`, `$USER`, `$USERNAME`
/// - data dir: `--data-dir`, `$EQUIPMENT_SUMMARY_DATA_DIR`, platform data dir
pub fn build_app_config_with<F>(args: &CliArgs, lookup: F) -> Result<AppConfig, String>
where
    F: Fn(&str) -> Option<String>,
{
    debug!("Building app config from CLI args");

    let owner = resolve_owner(args, &lookup)?;
    debug!("Acting as {}", owner);

    let data_dir = resolve_data_dir(args, &lookup);
    debug!("Using data directory {:?}", data_dir);

    Ok(AppConfig { owner, uploads_dir: data_dir.join(UPLOADS_DIR), data_dir, use_colors: args.use_colors() })
}

fn resolve_owner<F>(args: &CliArgs, lookup: &F) -> Result<OwnerId, String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(ref user) = args.user {
        return Ok(OwnerId::new(user.trim()));
    }

    [USER_ENV, "USER", "USERNAME"]
        .iter()
        .filter_map(|&key| lookup(key).map(|v| (key, v)))
        .find(|(_, v)| !v.trim().is_empty())
        .map(|(key, v)| {
            debug!("User taken from ${}", key);
            OwnerId::new(v.trim())
        })
        .ok_or_else(|| format!("No user given; pass --user or set {}", USER_ENV))
}

fn resolve_data_dir<F>(args: &CliArgs, lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(ref dir) = args.data_dir {
        return dir.clone();
    }

    match lookup(DATA_DIR_ENV) {
        Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => cli::default_data_dir(),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
