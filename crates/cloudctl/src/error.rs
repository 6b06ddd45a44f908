//! Error types for cloudctl
//!
//! Every failure surfaces to the user as a [`CliError`], printed as a
//! cargo-style diagnostic with suggestions.

use cloudctl_core::{ApiError, ConfigError, CoreError};
use colored::Colorize;
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Profile 'prod' not found
///
///   tip: List available profiles: cloudctl profile list
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    /// Add a detail line below the error message.
    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    /// Add a tip with optional example commands.
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            eprintln!("  {}", detail);
        }

        for (description, commands) in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
            for cmd in commands {
                eprintln!("      {}", cmd);
            }
        }
    }
}

/// Main error type for the cloudctl application
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No API token configured")]
    MissingCredentials,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("{message}")]
    Timeout { message: String },

    #[error("{message}")]
    OperationFailed { message: String },

    #[error("{message}")]
    Denied { message: String },

    #[error("{message}")]
    NothingToDo { message: String },

    #[error("{message}")]
    PartialFailure { message: String, failed: Vec<String> },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for cloudctl operations
pub type Result<T> = std::result::Result<T, CliError>;

impl CliError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            CliError::ProfileNotFound { name } => vec![
                "List available profiles: cloudctl profile list".to_string(),
                format!("Create profile '{}': cloudctl profile set {} --token <token>", name, name),
            ],
            CliError::MissingCredentials => vec![
                "Create a profile: cloudctl profile set <name> --token <token>".to_string(),
                "Or export CLOUDCTL_TOKEN (ignored when --config-file is given)".to_string(),
            ],
            CliError::AuthenticationFailed { .. } => vec![
                "Check your token: cloudctl profile show <profile>".to_string(),
                "Ensure the API endpoint URL is correct".to_string(),
            ],
            CliError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the API URL is correct: cloudctl profile show <profile>".to_string(),
            ],
            CliError::NotFound { .. } => vec![
                "Verify the resource ID is correct".to_string(),
                "List available resources to find the correct ID".to_string(),
            ],
            CliError::Timeout { .. } => vec![
                "The operation may still finish; check it later with: cloudctl request get <id>"
                    .to_string(),
                "Wait longer with --timeout <seconds>".to_string(),
            ],
            CliError::Denied { .. } => {
                vec!["Pass --force to skip confirmation prompts".to_string()]
            }
            CliError::PartialFailure { .. } => {
                vec!["Items not listed above completed successfully".to_string()]
            }
            CliError::InvalidInput { .. } => {
                vec!["Check the command syntax: cloudctl <command> --help".to_string()]
            }
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&format!("{}", self));

        if let CliError::PartialFailure { failed, .. } = self {
            diag = diag.detail(&format!("failed: {}", failed.join(", ")));
        }

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion, &[]);
        }

        diag.print();
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound { .. } => CliError::NotFound {
                message: err.to_string(),
            },
            ApiError::Status { code: 401, message } | ApiError::Status { code: 403, message } => {
                CliError::AuthenticationFailed { message }
            }
            ApiError::Transport(e) => CliError::ConnectionError {
                message: e.to_string(),
            },
            ApiError::InvalidUrl(url) => {
                CliError::Configuration(format!("invalid API URL '{}'", url))
            }
            _ => CliError::ApiError {
                message: err.to_string(),
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Api(api_err) => CliError::from(api_err),
            CoreError::Timeout { .. } => CliError::Timeout {
                message: err.to_string(),
            },
            CoreError::OperationFailed { .. } => CliError::OperationFailed {
                message: err.to_string(),
            },
            CoreError::Declined { .. } => CliError::Denied {
                message: err.to_string(),
            },
            CoreError::NoItems { .. } => CliError::NothingToDo {
                message: err.to_string(),
            },
            CoreError::Bulk(failure) => CliError::PartialFailure {
                failed: failure.failed_ids().map(str::to_string).collect(),
                message: failure.to_string(),
            },
            CoreError::Validation(message) => CliError::InvalidInput { message },
            CoreError::Confirmation(message) => CliError::InvalidInput {
                message: format!("could not read confirmation: {}", message),
            },
            CoreError::Config(config_err) => CliError::from(config_err),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound { name },
            _ => CliError::Configuration(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::Configuration(format!("{:#}", err))
    }
}
