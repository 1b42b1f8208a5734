//! Config loading pipeline.
//!
//! Precedence, highest first:
//! 1. `DD_API_KEY` / `DD_APP_KEY` / `DD_SITE` environment variables
//! 2. the selected profile (`--profile` flag > `DOGCTL_PROFILE` env >
//!    `active_profile` in the config file)
//! 3. defaults (site only; there is no default credential)

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::store::config_file_path_with_root;
use super::{expand_site, Config, FileConfig};

/// Load configuration from disk and environment.
///
/// `profile_override` is an explicit profile name (from the `--profile`
/// flag).
pub fn load_config(profile_override: Option<&str>) -> Result<Config, ConfigError> {
    load_config_from_sources(
        profile_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        super::store::config_root_dir,
    )
}

/// Loader with injectable file/env/home sources so precedence is testable
/// without touching the real environment.
pub fn load_config_from_sources<FRead, FEnv, FRoot>(
    profile_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<Config, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let file = read_optional_file_config(&read_file, &config_root)?;
    let mut config = Config::default();

    let requested = profile_override
        .map(str::to_string)
        .or_else(|| env_lookup("DOGCTL_PROFILE").filter(|v| !v.trim().is_empty()));
    let selected = match (&requested, &file) {
        (Some(name), Some(file)) => match file.profiles.get(name.trim()) {
            Some(profile) => Some((name.trim().to_string(), profile.clone())),
            None => {
                return Err(ConfigError::Invalid(format!(
                    "profile '{}' not found",
                    name.trim()
                )))
            }
        },
        (Some(name), None) => {
            return Err(ConfigError::Invalid(format!(
                "profile '{}' not found (config file missing)",
                name.trim()
            )))
        }
        (None, Some(file)) => file
            .active_profile
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .and_then(|name| {
                file.profiles
                    .get(name)
                    .map(|profile| (name.to_string(), profile.clone()))
            }),
        (None, None) => None,
    };

    if let Some(file) = &file {
        config.timeout_secs = file.client.timeout_secs;
        config.retry_attempts = file.client.retry_attempts;
        config.retry_base_delay_secs = file.client.retry_base_delay_secs;
    }

    if let Some((name, profile)) = selected {
        config.api_key = profile.api_key;
        config.app_key = profile.app_key;
        if let Some(site) = profile.site {
            config.site = expand_site(&site);
        }
        config.profile = Some(name);
    }

    // Environment variables override whatever the profile supplied.
    if let Some(api_key) = env_lookup("DD_API_KEY").filter(|v| !v.trim().is_empty()) {
        config.api_key = api_key.trim().to_string();
    }
    if let Some(app_key) = env_lookup("DD_APP_KEY").filter(|v| !v.trim().is_empty()) {
        config.app_key = app_key.trim().to_string();
    }
    if let Some(site) = env_lookup("DD_SITE").filter(|v| !v.trim().is_empty()) {
        config.site = expand_site(&site);
    }

    if config.api_key.is_empty() || config.app_key.is_empty() {
        return Err(ConfigError::Invalid(
            "missing credentials: set DD_API_KEY and DD_APP_KEY or run `dogctl config init`"
                .to_string(),
        ));
    }

    Ok(config)
}

fn read_optional_file_config<FRead, FRoot>(
    read_file: &FRead,
    config_root: &FRoot,
) -> Result<Option<FileConfig>, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let Some(path) = config_file_path_with_root(config_root) else {
        return Ok(None);
    };
    match read_file(&path) {
        Ok(text) => Ok(Some(toml::from_str(&text)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfigError::Io(e)),
    }
}
