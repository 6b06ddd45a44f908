//! Profile management command implementations

use cloudctl_core::{Config, Profile};
use serde_json::json;
use tracing::debug;

use crate::cli::ProfileCommands;
use crate::connection::ConnectionManager;
use crate::error::{CliError, Result as CliResult};
use crate::output::{OutputFormat, print_output};

/// Handle profile management commands
pub async fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &ConnectionManager,
    output_format: OutputFormat,
) -> CliResult<()> {
    use ProfileCommands::*;

    match profile_cmd {
        List => handle_list(conn_mgr, output_format),
        Path => handle_path(conn_mgr, output_format),
        Show { name } => handle_show(conn_mgr, name, output_format),
        Set {
            name,
            api_url,
            token,
            wait_timeout,
        } => handle_set(conn_mgr, name, api_url.as_deref(), token.as_deref(), *wait_timeout),
        Remove { name } => handle_remove(conn_mgr, name),
        Default { name } => handle_default(conn_mgr, name),
    }
}

fn redact(token: Option<&str>) -> &'static str {
    match token {
        Some(_) => "********",
        None => "(not set)",
    }
}

fn profile_json(conn_mgr: &ConnectionManager, name: &str, profile: &Profile) -> serde_json::Value {
    json!({
        "name": name,
        "api_url": profile.api_url,
        "token": redact(profile.token.as_deref()),
        "wait_timeout_secs": profile.wait_timeout_secs,
        "default": conn_mgr.config.default_profile.as_deref() == Some(name),
    })
}

fn handle_list(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    debug!("Listing all configured profiles");
    let profiles: Vec<_> = conn_mgr
        .config
        .list_profiles()
        .into_iter()
        .map(|(name, profile)| profile_json(conn_mgr, name, profile))
        .collect();

    if profiles.is_empty() && !output_format.is_json() {
        println!("No profiles configured.");
        println!("Create one with: cloudctl profile set <name> --token <token>");
        return Ok(());
    }
    print_output(profiles, output_format)?;
    Ok(())
}

fn handle_path(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    let config_path = match &conn_mgr.config_path {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };

    if output_format.is_json() {
        print_output(json!({ "config_path": config_path }), output_format)?;
    } else {
        println!("{}", config_path.display());
    }
    Ok(())
}

fn handle_show(
    conn_mgr: &ConnectionManager,
    name: &str,
    output_format: OutputFormat,
) -> CliResult<()> {
    let profile = conn_mgr
        .config
        .profiles
        .get(name)
        .ok_or_else(|| CliError::ProfileNotFound { name: name.into() })?;
    print_output(profile_json(conn_mgr, name, profile), output_format)?;
    Ok(())
}

fn handle_set(
    conn_mgr: &ConnectionManager,
    name: &str,
    api_url: Option<&str>,
    token: Option<&str>,
    wait_timeout: Option<u64>,
) -> CliResult<()> {
    debug!("Setting profile: {}", name);

    let mut config = conn_mgr.config.clone();
    let mut profile = config.profiles.get(name).cloned().unwrap_or_default();
    if let Some(api_url) = api_url {
        profile.api_url = api_url.to_string();
    }
    if let Some(token) = token {
        profile.token = Some(token.to_string());
    }
    if wait_timeout.is_some() {
        profile.wait_timeout_secs = wait_timeout;
    }
    config.set_profile(name.to_string(), profile);
    if config.profiles.len() == 1 && config.default_profile.is_none() {
        config.default_profile = Some(name.to_string());
    }

    conn_mgr.save_config(&config)?;
    println!("Profile '{}' saved.", name);
    Ok(())
}

fn handle_remove(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    debug!("Removing profile: {}", name);

    let mut config = conn_mgr.config.clone();
    if config.remove_profile(name).is_none() {
        return Err(CliError::ProfileNotFound { name: name.into() });
    }

    conn_mgr.save_config(&config)?;
    println!("Profile '{}' removed.", name);
    Ok(())
}

fn handle_default(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    if !conn_mgr.config.profiles.contains_key(name) {
        return Err(CliError::ProfileNotFound { name: name.into() });
    }

    let mut config = conn_mgr.config.clone();
    config.default_profile = Some(name.to_string());
    conn_mgr.save_config(&config)?;

    println!("Default profile set to '{}'.", name);
    Ok(())
}
