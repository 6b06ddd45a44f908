use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use cloudctl_core::{Config, ResourceKind};
use tracing::{debug, error, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod confirm;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands};
use commands::CommandContext;
use connection::ConnectionManager;
use error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli).await {
        e.print_diagnostic();
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    // Check for RUST_LOG env var first, then fall back to verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "cloudctl=warn,cloudctl_core=warn",
            1 => "cloudctl=info,cloudctl_core=info",
            2 => "cloudctl=debug,cloudctl_core=debug",
            _ => "cloudctl=trace,cloudctl_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    // Load configuration from specified path or default location
    let (config, config_path) = if let Some(config_file) = &cli.config_file {
        let path = std::path::PathBuf::from(config_file);
        debug!("Loading config from explicit path: {:?}", path);
        let config = Config::load_from_path(&path)?;
        (config, Some(path))
    } else {
        debug!("Loading config from default location");
        (Config::load()?, None)
    };
    let conn_mgr = ConnectionManager::with_config_path(config, config_path);

    execute_command(cli, &conn_mgr).await
}

async fn execute_command(cli: &Cli, conn_mgr: &ConnectionManager) -> Result<(), CliError> {
    trace!("Executing command: {:?}", cli.command);
    info!("Command: {}", format_command(&cli.command));

    let ctx = CommandContext {
        conn_mgr,
        profile: cli.profile.as_deref(),
        output: output::OutputFormat::resolve(cli.output),
    };

    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => {
            if ctx.output.is_json() {
                let output_data = serde_json::json!({
                    "version": env!("CARGO_PKG_VERSION"),
                    "name": env!("CARGO_PKG_NAME"),
                });
                output::print_output(&output_data, ctx.output)?;
            } else {
                println!("cloudctl {}", env!("CARGO_PKG_VERSION"));
            }
            Ok(())
        }
        Commands::Completions { shell } => {
            debug!("Generating completions for {:?}", shell);
            generate_completions(*shell);
            Ok(())
        }
        Commands::Profile(profile_cmd) => {
            commands::profile::handle_profile_command(profile_cmd, conn_mgr, ctx.output).await
        }
        Commands::LoadBalancer(cmd) => {
            commands::handle_datacenter_command(&ctx, cmd, |datacenter_id| {
                ResourceKind::NetworkLoadBalancer { datacenter_id }
            })
            .await
        }
        Commands::NatGateway(cmd) => {
            commands::handle_datacenter_command(&ctx, cmd, |datacenter_id| {
                ResourceKind::NatGateway { datacenter_id }
            })
            .await
        }
        Commands::FlowLog(cmd) => commands::handle_flowlog_command(&ctx, cmd).await,
        Commands::Postgres(cmd) => commands::handle_postgres_command(&ctx, cmd).await,
        Commands::Token(cmd) => commands::handle_token_command(&ctx, cmd).await,
        Commands::Request(cmd) => commands::handle_request_command(&ctx, cmd).await,
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Generate shell completions
fn generate_completions(shell: cli::Shell) {
    let mut cmd = cli::Cli::command();
    let name = cmd.get_name().to_string();

    match shell {
        cli::Shell::Bash => generate(shells::Bash, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Zsh => generate(shells::Zsh, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Fish => generate(shells::Fish, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, name, &mut std::io::stdout())
        }
        cli::Shell::Elvish => generate(shells::Elvish, &mut cmd, name, &mut std::io::stdout()),
    }
}

/// Format command for human-readable logging (without sensitive data)
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Version => "version".to_string(),
        Commands::Completions { shell } => format!("completions {:?}", shell),
        Commands::Profile(cmd) => {
            use cli::ProfileCommands::*;
            match cmd {
                List => "profile list".to_string(),
                Path => "profile path".to_string(),
                Show { name } => format!("profile show {}", name),
                Set { name, .. } => format!("profile set {} [token redacted]", name),
                Remove { name } => format!("profile remove {}", name),
                Default { name } => format!("profile default {}", name),
            }
        }
        Commands::LoadBalancer(cmd) => format!("loadbalancer {:?}", cmd),
        Commands::NatGateway(cmd) => format!("natgateway {:?}", cmd),
        Commands::FlowLog(cmd) => format!("flowlog {:?}", cmd),
        Commands::Postgres(cmd) => format!("postgres {:?}", cmd),
        Commands::Token(cmd) => format!("token {:?}", cmd),
        Commands::Request(cmd) => format!("request {:?}", cmd),
    }
}
