//! Configuration data model.
//!
//! This module holds struct/enum definitions plus default values. Loader and
//! precedence logic lives in `config::loader`; on-disk profile persistence in
//! `config::store`.

mod loader;
mod store;

pub use loader::{load_config, load_config_from_sources};
pub use store::{
    config_root_dir, default_config_path, read_file_config, write_file_config,
};

use crate::api::executor::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_SITE: &str = "datadoghq.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved runtime configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub app_key: String,
    /// API site domain, e.g. `datadoghq.com` or `datadoghq.eu`.
    pub site: String,
    pub timeout_secs: u64,
    pub retry_attempts: u32,
    pub retry_base_delay_secs: f64,
    /// Profile the credentials came from, when any.
    pub profile: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            app_key: String::new(),
            site: DEFAULT_SITE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_attempts: 3,
            retry_base_delay_secs: 1.0,
            profile: None,
        }
    }
}

impl Config {
    /// Retry policy derived from the client tuning fields.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.retry_base_delay_secs.max(f64::MIN_POSITIVE)),
            backoff_multiplier: 2.0,
        }
    }
}

/// On-disk config file shape (`~/.config/dogctl/config.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub active_profile: Option<String>,
    pub profiles: BTreeMap<String, ProfileConfig>,
    pub client: ClientSettings,
}

/// Credentials stored under `[profiles.<name>]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub api_key: String,
    pub app_key: String,
    pub site: Option<String>,
}

/// Optional `[client]` tuning block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub timeout_secs: u64,
    pub retry_attempts: u32,
    pub retry_base_delay_secs: f64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_attempts: 3,
            retry_base_delay_secs: 1.0,
        }
    }
}

/// Expand dogshell-style region shortcuts to full site domains.
///
/// Unrecognized values pass through unchanged so explicit domains keep
/// working.
pub fn expand_site(site: &str) -> String {
    match site.trim().to_ascii_lowercase().as_str() {
        "us" => "datadoghq.com".to_string(),
        "eu" => "datadoghq.eu".to_string(),
        "us3" => "us3.datadoghq.com".to_string(),
        "us5" => "us5.datadoghq.com".to_string(),
        "ap1" => "ap1.datadoghq.com".to_string(),
        "gov" => "ddog-gov.com".to_string(),
        _ => site.trim().to_string(),
    }
}
