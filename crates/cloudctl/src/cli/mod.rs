//! CLI structure and command definitions
//!
//! Resource commands follow the same shape: `list`, and `delete` for one item
//! (`--id`) or every item in the scope (`--all`), optionally waiting for the
//! control plane to finish.

use clap::{Parser, Subcommand};

pub mod resources;

pub use resources::*;

/// Control-plane CLI that can wait for asynchronous operations to finish
#[derive(Parser, Debug)]
#[command(name = "cloudctl")]
#[command(
    version,
    about = "Cloud control-plane CLI with wait-for-completion and bulk operations"
)]
#[command(long_about = "
Cloud control-plane CLI with wait-for-completion and bulk operations

Mutations are accepted asynchronously by the control plane. Pass --wait to
block until they have actually finished, and --all to apply a delete to every
resource in scope.

EXAMPLES:
    # Configure a profile
    cloudctl profile set prod --token $TOKEN

    # Delete one load balancer and wait for the request to finish
    cloudctl loadbalancer delete --datacenter-id DC --id LB --wait

    # Delete every NAT gateway in a datacenter without prompting
    cloudctl natgateway delete --datacenter-id DC --all --force

    # Scale a PostgreSQL cluster and wait until it is AVAILABLE again
    cloudctl postgres update --id CLUSTER --instances 3 --wait-for-state

    # Wait for a request issued earlier
    cloudctl request wait REQUEST_ID --timeout 600

For more help on a specific command, run:
    cloudctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "CLOUDCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "CLOUDCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Table on a terminal, JSON otherwise
    Auto,
    /// JSON output
    Json,
    /// Human-readable table format
    Table,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Network load balancers in a datacenter
    #[command(subcommand, name = "loadbalancer", visible_alias = "nlb")]
    LoadBalancer(DatacenterCommands),

    /// NAT gateways in a datacenter
    #[command(subcommand, name = "natgateway", visible_alias = "nat")]
    NatGateway(DatacenterCommands),

    /// Flow logs of a NAT gateway
    #[command(subcommand, name = "flowlog")]
    FlowLog(FlowLogCommands),

    /// PostgreSQL clusters
    #[command(subcommand, name = "postgres", visible_alias = "pg")]
    Postgres(PostgresCommands),

    /// API tokens
    #[command(subcommand)]
    Token(TokenCommands),

    /// Asynchronous requests issued by earlier mutations
    #[command(subcommand, visible_alias = "req")]
    Request(RequestCommands),

    /// Profile management
    #[command(subcommand, visible_alias = "prof")]
    Profile(ProfileCommands),

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    #[command(visible_alias = "ver")]
    Version,
}

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bourne Again Shell
    Bash,
    /// Z Shell
    Zsh,
    /// Friendly Interactive Shell
    Fish,
    /// PowerShell
    #[value(name = "powershell", alias = "power-shell")]
    PowerShell,
    /// Elvish
    Elvish,
}

/// Profile management commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "get")]
    Show {
        /// Profile name to show
        name: String,
    },

    /// Set or create a profile
    #[command(visible_alias = "add")]
    #[command(after_help = "EXAMPLES:
    # Profile using the default endpoint
    cloudctl profile set prod --token $TOKEN

    # Profile for a different endpoint with a longer default wait
    cloudctl profile set staging --api-url https://api.staging.example.com \\
        --token $TOKEN --wait-timeout 900
")]
    Set {
        /// Profile name
        name: String,

        /// Base URL of the control-plane API
        #[arg(long)]
        api_url: Option<String>,

        /// API token
        #[arg(long)]
        token: Option<String>,

        /// Default --timeout for waiting commands, in seconds
        #[arg(long, value_name = "SECONDS")]
        wait_timeout: Option<u64>,
    },

    /// Remove a profile
    #[command(visible_alias = "rm")]
    Remove {
        /// Profile name to remove
        name: String,
    },

    /// Use a profile when --profile is not given
    Default {
        /// Profile name
        name: String,
    },
}
