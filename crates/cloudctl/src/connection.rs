//! Connection management for the control-plane API

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use cloudctl_core::{ApiClient, Config, DEFAULT_API_URL};
use tracing::{debug, info, trace};

use crate::error::{CliError, Result as CliResult};

/// Environment variable overriding the profile's API URL
pub const ENV_API_URL: &str = "CLOUDCTL_API_URL";

/// Environment variable overriding the profile's token
pub const ENV_TOKEN: &str = "CLOUDCTL_TOKEN";

/// Endpoint, credentials and wait default after profile and environment resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub api_url: String,
    pub token: String,
    pub wait_timeout: Option<Duration>,
}

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl ConnectionManager {
    /// Create a new connection manager with a custom config path
    pub fn with_config_path(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Save `config` to the file this manager was loaded from
    pub fn save_config(&self, config: &Config) -> CliResult<()> {
        if let Some(ref path) = self.config_path {
            config
                .save_to_path(path)
                .context("Failed to save configuration")?;
        } else {
            config.save().context("Failed to save configuration")?;
        }
        Ok(())
    }

    /// Resolve the connection from profile settings with environment variable overrides
    ///
    /// When --config-file is explicitly specified, environment variables are ignored to provide
    /// true configuration isolation.
    pub fn resolve(&self, profile_name: Option<&str>) -> CliResult<Connection> {
        trace!("Profile name: {:?}", profile_name);

        let use_env_vars = self.config_path.is_none();
        if !use_env_vars {
            info!("--config-file specified explicitly, ignoring environment variables");
        }
        let env = |name: &str| {
            if use_env_vars {
                std::env::var(name).ok().filter(|v| !v.is_empty())
            } else {
                None
            }
        };
        self.resolve_with(profile_name, env(ENV_API_URL), env(ENV_TOKEN))
    }

    fn resolve_with(
        &self,
        profile_name: Option<&str>,
        env_api_url: Option<String>,
        env_token: Option<String>,
    ) -> CliResult<Connection> {
        let profile = self.config.resolve_profile(profile_name)?;
        match &profile {
            Some((name, _)) => info!("Using profile: {}", name),
            None => debug!("No profile configured"),
        }

        if env_api_url.is_some() {
            debug!("Found {} environment variable", ENV_API_URL);
        }
        if env_token.is_some() {
            debug!("Found {} environment variable", ENV_TOKEN);
        }

        let api_url = env_api_url
            .or_else(|| profile.map(|(_, p)| p.api_url.clone()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let token = env_token
            .or_else(|| profile.and_then(|(_, p)| p.token.clone()))
            .ok_or(CliError::MissingCredentials)?;
        let wait_timeout = profile.and_then(|(_, p)| p.wait_timeout());

        Ok(Connection {
            api_url,
            token,
            wait_timeout,
        })
    }

    /// Create an API client for the resolved connection
    pub fn create_client(&self, profile_name: Option<&str>) -> CliResult<(ApiClient, Connection)> {
        let connection = self.resolve(profile_name)?;
        debug!("Creating API client for {}", connection.api_url);
        let client = ApiClient::new(&connection.api_url, Some(connection.token.clone()))?;
        Ok((client, connection))
    }
}
