//! Config-path helpers and profile persistence.

use std::path::PathBuf;

use crate::error::ConfigError;

use super::FileConfig;

/// Resolve the base config directory from env/home conventions.
pub fn config_root_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".config"))
        .or_else(dirs::config_dir)
}

/// Return the default per-user config path (`~/.config/dogctl/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    config_file_path_with_root(&config_root_dir)
}

pub(super) fn config_file_path_with_root<FRoot>(config_root: &FRoot) -> Option<PathBuf>
where
    FRoot: Fn() -> Option<PathBuf>,
{
    config_root().map(|dir| dir.join("dogctl").join("config.toml"))
}

/// Read the profile store, returning an empty one when the file is absent.
pub fn read_file_config() -> Result<FileConfig, ConfigError> {
    let Some(path) = default_config_path() else {
        return Ok(FileConfig::default());
    };
    match std::fs::read_to_string(&path) {
        Ok(text) => Ok(toml::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
        Err(e) => Err(ConfigError::Io(e)),
    }
}

/// Persist the profile store, creating the directory as needed.
///
/// The file holds credentials, so it is written owner-readable only.
pub fn write_file_config(file: &FileConfig) -> Result<PathBuf, ConfigError> {
    let path = default_config_path().ok_or_else(|| {
        ConfigError::Invalid(
            "unable to resolve config path for ~/.config/dogctl/config.toml".to_string(),
        )
    })?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(file)
        .map_err(|e| ConfigError::Invalid(format!("failed to serialize config: {e}")))?;
    std::fs::write(&path, text)?;
    restrict_permissions(&path)?;
    Ok(path)
}

#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_lands_under_the_root() {
        let path =
            config_file_path_with_root(&|| Some(PathBuf::from("/home/u/.config"))).unwrap();
        assert_eq!(path, PathBuf::from("/home/u/.config/dogctl/config.toml"));
    }

    #[test]
    fn missing_root_yields_no_path() {
        assert!(config_file_path_with_root(&|| None).is_none());
    }
}
