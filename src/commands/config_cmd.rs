//! Configuration and profile management commands.

use crate::cli::ConfigCommand;
use crate::config::{
    expand_site, load_config, read_file_config, write_file_config, ProfileConfig,
};
use crate::error::CliError;
use crate::output;
use crate::textutil::mask_key;
use std::io::{BufRead, Write};

pub fn run(cmd: ConfigCommand, profile_override: Option<&str>) -> Result<(), CliError> {
    match cmd {
        ConfigCommand::Init => init_wizard(),

        ConfigCommand::SetProfile {
            name,
            api_key,
            app_key,
            site,
        } => {
            save_profile(&name, api_key, app_key, &site)?;
            output::success(&format!("Profile '{name}' saved"));
            Ok(())
        }

        ConfigCommand::UseProfile { name } => {
            let mut file = read_file_config()?;
            if !file.profiles.contains_key(&name) {
                return Err(CliError::Config(crate::error::ConfigError::Invalid(
                    format!("profile '{name}' not found"),
                )));
            }
            file.active_profile = Some(name.clone());
            write_file_config(&file)?;
            output::success(&format!("Active profile set to '{name}'"));
            Ok(())
        }

        ConfigCommand::List => {
            let file = read_file_config()?;
            if file.profiles.is_empty() {
                output::warn("No profiles configured. Run `dogctl config init` first.");
                return Ok(());
            }
            let mut table = output::new_table(&["Profile", "Site", "API Key", "App Key"]);
            let active = file.active_profile.as_deref().unwrap_or("");
            for (name, profile) in &file.profiles {
                let label = if name == active {
                    format!("* {name}")
                } else {
                    name.clone()
                };
                table.add_row(vec![
                    label,
                    profile
                        .site
                        .clone()
                        .unwrap_or_else(|| crate::config::DEFAULT_SITE.to_string()),
                    mask_key(&profile.api_key),
                    mask_key(&profile.app_key),
                ]);
            }
            println!("{table}");
            Ok(())
        }

        ConfigCommand::Show => {
            let config = load_config(profile_override)?;
            output::field(
                "Profile",
                config.profile.as_deref().unwrap_or("(env only)"),
            );
            output::field("Site", &config.site);
            output::field("API Key", &mask_key(&config.api_key));
            output::field("App Key", &mask_key(&config.app_key));
            output::field("Timeout", &format!("{}s", config.timeout_secs));
            output::field("Retry attempts", &config.retry_attempts.to_string());
            Ok(())
        }
    }
}

/// Interactive setup wizard: prompts for keys (hidden), site, and profile
/// name, then persists the profile.
fn init_wizard() -> Result<(), CliError> {
    output::title("dogctl configuration wizard");

    let api_key = rpassword::prompt_password("API Key: ")
        .map_err(|e| CliError::General(format!("failed to read API key: {e}")))?;
    let app_key = rpassword::prompt_password("App Key: ")
        .map_err(|e| CliError::General(format!("failed to read app key: {e}")))?;
    let site = prompt_with_default("Site (us, eu, us3, us5, ap1, gov, or full domain)", "us")?;
    let name = prompt_with_default("Profile name", "default")?;

    if api_key.trim().is_empty() || app_key.trim().is_empty() {
        return Err(CliError::Usage("API key and app key are required".to_string()));
    }

    let path = save_profile(&name, api_key, app_key, &site)?;
    println!();
    output::success(&format!("Profile '{name}' saved"));
    output::note(&format!("Config file: {}", path.display()));
    Ok(())
}

fn prompt_with_default(label: &str, default: &str) -> Result<String, CliError> {
    eprint!("{label} [{default}]: ");
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| CliError::General(format!("failed to read input: {e}")))?;
    let trimmed = line.trim();
    Ok(if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    })
}

fn save_profile(
    name: &str,
    api_key: String,
    app_key: String,
    site: &str,
) -> Result<std::path::PathBuf, CliError> {
    let mut file = read_file_config()?;
    file.profiles.insert(
        name.to_string(),
        ProfileConfig {
            api_key: api_key.trim().to_string(),
            app_key: app_key.trim().to_string(),
            site: Some(expand_site(site)),
        },
    );
    // First profile becomes active automatically.
    if file
        .active_profile
        .as_deref()
        .is_none_or(|active| active.is_empty())
    {
        file.active_profile = Some(name.to_string());
    }
    Ok(write_file_config(&file)?)
}
