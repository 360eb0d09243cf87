//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod down;
mod status;
mod up;

use anyhow::Result;
use clap::Subcommand;
use codis_deploy_client::ContainerApi;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Deploy the data node and proxy
    Up {
        /// Use the images already present on the nodes
        #[arg(long, env = "CODIS_SKIP_PULL")]
        skip_pull: bool,

        /// Remove containers created by this run if a step fails
        #[arg(long, env = "CODIS_ROLLBACK_ON_FAILURE")]
        rollback_on_failure: bool,

        /// Seconds a single readiness wait may take
        #[arg(long, env = "CODIS_READY_TIMEOUT", default_value_t = 60)]
        ready_timeout: u64,
    },
    /// Remove the deployed containers
    Down,
    /// Show the deployed containers and their endpoints
    Status,
}

/// Handle a CLI command
///
/// Applies command-specific options to the configuration and routes the
/// command to its handler.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The deployment configuration
/// * `api` - Container API of the Swarm endpoint
pub async fn handle_command(
    command: Commands,
    mut config: Config,
    api: Arc<dyn ContainerApi>,
) -> Result<()> {
    match command {
        Commands::Up {
            skip_pull,
            rollback_on_failure,
            ready_timeout,
        } => {
            config.pull_images = !skip_pull;
            config.rollback_on_failure = rollback_on_failure;
            config.ready_timeout = Duration::from_secs(ready_timeout);
            config.validate()?;
            up::handle_up(api, config).await
        }
        Commands::Down => down::handle_down(api.as_ref(), &config).await,
        Commands::Status => status::handle_status(api.as_ref(), &config).await,
    }
}
