//! Codis deploy CLI
//!
//! Brings up a Codis data node and proxy on a Docker Swarm endpoint,
//! reports their status and tears them down again.

mod commands;
mod config;
mod deploy;

use anyhow::{Context, Result};
use clap::Parser;
use codis_deploy_client::{ContainerApi, DockerClient};
use commands::{Commands, handle_command};
use config::Config;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "codis-deploy")]
#[command(about = "Codis deployment over the Docker Swarm API", long_about = None)]
struct Cli {
    /// Docker or Swarm API endpoint
    #[arg(
        long,
        global = true,
        env = "CODIS_SWARM_HOST",
        default_value = "http://192.168.156.200:2375"
    )]
    swarm_host: String,

    /// Registry the images are pulled from (host:port)
    #[arg(
        long,
        global = true,
        env = "CODIS_REGISTRY_HOST",
        default_value = "192.168.156.200:5000"
    )]
    registry_host: String,

    /// API version prefix, e.g. 1.24
    #[arg(long, global = true, env = "CODIS_API_VERSION")]
    api_version: Option<String>,

    /// Delay between readiness probes in milliseconds
    #[arg(long, global = true, env = "CODIS_POLL_INTERVAL_MS", default_value_t = 250)]
    poll_interval_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codis_deploy=info,codis_deploy_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::new(cli.swarm_host, cli.registry_host);
    config.api_version = cli.api_version;
    config.poll_interval = Duration::from_millis(cli.poll_interval_ms);
    config.validate()?;

    let api = build_client(&config)?;

    handle_command(cli.command, config, api).await
}

/// Builds the HTTP client for the configured endpoint
fn build_client(config: &Config) -> Result<Arc<dyn ContainerApi>> {
    let http = reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let mut client = DockerClient::with_client(&config.swarm_host, http)
        .with_request_timeout(config.request_timeout);
    if let Some(version) = &config.api_version {
        client = client.with_api_version(version);
    }

    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_up_with_flags() {
        let cli = Cli::try_parse_from([
            "codis-deploy",
            "--swarm-host",
            "http://10.0.0.1:2375",
            "up",
            "--skip-pull",
            "--ready-timeout",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.swarm_host, "http://10.0.0.1:2375");
        match cli.command {
            Commands::Up {
                skip_pull,
                rollback_on_failure,
                ready_timeout,
            } => {
                assert!(skip_pull);
                assert!(!rollback_on_failure);
                assert_eq!(ready_timeout, 5);
            }
            _ => panic!("expected up"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "codis-deploy",
            "status",
            "--registry-host",
            "registry.local:5000",
            "--api-version",
            "1.24",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Status));
        assert_eq!(cli.registry_host, "registry.local:5000");
        assert_eq!(cli.api_version.as_deref(), Some("1.24"));
    }

    #[test]
    fn test_env_fallbacks() {
        // Only variables that the other parse tests override with flags or ignore
        unsafe {
            std::env::set_var("CODIS_SWARM_HOST", "http://10.0.0.9:2375");
            std::env::set_var("CODIS_POLL_INTERVAL_MS", "50");
            std::env::set_var("CODIS_READY_TIMEOUT", "12");
            std::env::set_var("CODIS_SKIP_PULL", "true");
        }

        let cli = Cli::try_parse_from(["codis-deploy", "up"]).unwrap();

        unsafe {
            std::env::remove_var("CODIS_SWARM_HOST");
            std::env::remove_var("CODIS_POLL_INTERVAL_MS");
            std::env::remove_var("CODIS_READY_TIMEOUT");
            std::env::remove_var("CODIS_SKIP_PULL");
        }

        assert_eq!(cli.swarm_host, "http://10.0.0.9:2375");
        assert_eq!(cli.poll_interval_ms, 50);
        match cli.command {
            Commands::Up {
                skip_pull,
                rollback_on_failure,
                ready_timeout,
            } => {
                assert!(skip_pull);
                assert!(!rollback_on_failure);
                assert_eq!(ready_timeout, 12);
            }
            _ => panic!("expected up"),
        }
    }

    #[test]
    fn test_build_client_for_default_endpoint() {
        let config = Config::default();
        let api = build_client(&config).unwrap();
        assert_eq!(api.endpoint_host(), "192.168.156.200");
    }
}
