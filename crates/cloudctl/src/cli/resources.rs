//! Resource command definitions

use std::time::Duration;

use clap::{Args, Subcommand};
use cloudctl_core::{DEFAULT_TIMEOUT, PollConfig};

/// Which items a delete applies to
#[derive(Args, Debug, Clone)]
pub struct DeleteTarget {
    /// ID of the resource to delete
    #[arg(long, short = 'i', required_unless_present = "all", conflicts_with = "all")]
    pub id: Option<String>,

    /// Delete every resource in scope
    #[arg(long, short = 'a')]
    pub all: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'f')]
    pub force: bool,
}

/// Whether and how long to wait for a mutation to finish
#[derive(Args, Debug, Clone, Default)]
pub struct WaitArgs {
    /// Wait for the operation to complete
    #[arg(
        long,
        short = 'w',
        aliases = ["wait-for-request", "wait-for-state", "wait-for-deletion"]
    )]
    pub wait: bool,

    /// Maximum time to wait in seconds [default: profile setting or 60]
    #[arg(long, short = 't', value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl WaitArgs {
    /// Poll settings: `--timeout`, then the profile default, then the built-in default
    pub fn poll_config(&self, profile_timeout: Option<Duration>) -> PollConfig {
        let timeout = self
            .timeout
            .map(Duration::from_secs)
            .or(profile_timeout)
            .unwrap_or(DEFAULT_TIMEOUT);
        PollConfig::new(self.wait, timeout)
    }
}

/// Commands for resources scoped to a datacenter
#[derive(Subcommand, Debug)]
pub enum DatacenterCommands {
    /// List resources in a datacenter
    #[command(visible_alias = "ls")]
    List {
        /// Datacenter ID
        #[arg(long)]
        datacenter_id: String,
    },

    /// Delete one or all resources in a datacenter
    #[command(visible_alias = "rm")]
    #[command(after_help = "EXAMPLES:
    # Delete one resource and wait for the request to finish
    cloudctl loadbalancer delete --datacenter-id DC --id ID --wait-for-request

    # Delete everything in the datacenter, prompting for each item
    cloudctl natgateway delete --datacenter-id DC --all
")]
    Delete {
        /// Datacenter ID
        #[arg(long)]
        datacenter_id: String,
        #[command(flatten)]
        target: DeleteTarget,
        #[command(flatten)]
        wait: WaitArgs,
    },
}

/// Commands for flow logs of a NAT gateway
#[derive(Subcommand, Debug)]
pub enum FlowLogCommands {
    /// List flow logs of a NAT gateway
    #[command(visible_alias = "ls")]
    List {
        /// Datacenter ID
        #[arg(long)]
        datacenter_id: String,
        /// NAT gateway ID
        #[arg(long)]
        natgateway_id: String,
    },

    /// Delete one or all flow logs of a NAT gateway
    #[command(visible_alias = "rm")]
    Delete {
        /// Datacenter ID
        #[arg(long)]
        datacenter_id: String,
        /// NAT gateway ID
        #[arg(long)]
        natgateway_id: String,
        #[command(flatten)]
        target: DeleteTarget,
        #[command(flatten)]
        wait: WaitArgs,
    },
}

/// PostgreSQL cluster commands
#[derive(Subcommand, Debug)]
pub enum PostgresCommands {
    /// List PostgreSQL clusters
    #[command(visible_alias = "ls")]
    List,

    /// Delete one or all PostgreSQL clusters
    ///
    /// Waiting blocks until the cluster can no longer be fetched.
    #[command(visible_alias = "rm")]
    Delete {
        #[command(flatten)]
        target: DeleteTarget,
        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Change the size of a PostgreSQL cluster
    ///
    /// Waiting blocks until the cluster is AVAILABLE again.
    #[command(after_help = "EXAMPLES:
    # Scale out and wait up to 20 minutes
    cloudctl postgres update --id ID --instances 3 --wait-for-state --timeout 1200
")]
    Update {
        /// Cluster ID
        #[arg(long, short = 'i')]
        id: String,
        /// Number of instances
        #[arg(long)]
        instances: Option<u32>,
        /// CPU cores per instance
        #[arg(long)]
        cores: Option<u32>,
        /// Memory per instance, in MB
        #[arg(long)]
        ram: Option<u32>,
        #[command(flatten)]
        wait: WaitArgs,
    },
}

/// API token commands
///
/// Token deletes take effect immediately, so there is nothing to wait for.
#[derive(Subcommand, Debug)]
pub enum TokenCommands {
    /// List API tokens
    #[command(visible_alias = "ls")]
    List,

    /// Delete one or all API tokens
    #[command(visible_alias = "rm")]
    Delete {
        #[command(flatten)]
        target: DeleteTarget,
    },
}

/// Asynchronous request commands
#[derive(Subcommand, Debug)]
pub enum RequestCommands {
    /// Show the current status of a request
    Get {
        /// Request ID
        id: String,
    },

    /// Block until a request is DONE or FAILED
    Wait {
        /// Request ID
        id: String,
        /// Maximum time to wait in seconds [default: profile setting or 60]
        #[arg(long, short = 't', value_name = "SECONDS")]
        timeout: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_flag_wins_over_profile() {
        let args = WaitArgs {
            wait: true,
            timeout: Some(10),
        };
        let config = args.poll_config(Some(Duration::from_secs(300)));
        assert!(config.enabled);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_profile_timeout_then_default() {
        let args = WaitArgs::default();
        assert_eq!(
            args.poll_config(Some(Duration::from_secs(300))).timeout,
            Duration::from_secs(300)
        );

        let config = args.poll_config(None);
        assert!(!config.enabled);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }
}
