//! Status command handler

use anyhow::Result;
use codis_deploy_client::ContainerApi;
use codis_deploy_core::domain::container::ContainerRole;
use codis_deploy_core::domain::inspect::ContainerInfo;
use colored::*;

use crate::config::Config;
use crate::deploy::{DeployedContainer, inspect_deployment, proxy_endpoints};

/// Prints each container of the deployment with its state and endpoints
pub async fn handle_status(api: &dyn ContainerApi, config: &Config) -> Result<()> {
    let deployed = inspect_deployment(api, config).await?;

    if deployed.iter().all(|d| d.info.is_none()) {
        println!("{}", "No deployment found.".yellow());
        return Ok(());
    }

    for container in &deployed {
        print_container(config, container, api.endpoint_host());
    }

    Ok(())
}

fn print_container(config: &Config, container: &DeployedContainer, fallback_host: &str) {
    println!("  {} {} ({})", "▸".cyan(), container.name.bold(), container.role);

    let Some(info) = &container.info else {
        println!("    Status:       {}", "not deployed".red());
        println!();
        return;
    };

    println!("    Status:       {}", colorize_status(info));
    println!("    Image:        {}", info.image.dimmed());
    if let Some(node) = &info.node {
        println!("    Node:         {} ({})", node.name, node.ip);
    }
    if let Some(started_at) = info.state.started_at {
        println!(
            "    Started:      {}",
            started_at
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .dimmed()
        );
    }
    if let Some(run_id) = info.run_id() {
        println!("    Run:          {}", run_id.dimmed());
    }

    match container.role {
        ContainerRole::DataNode => {
            let address = info.published_address(config.data_node.port.container, fallback_host);
            println!("    Redis:        {}", address.as_deref().unwrap_or("-"));
        }
        ContainerRole::Proxy => {
            for endpoint in proxy_endpoints(config, info, fallback_host) {
                println!(
                    "    {:<13} {}",
                    format!("{}:", endpoint.name),
                    endpoint.address.as_deref().unwrap_or("-")
                );
            }
        }
    }
    println!();
}

fn colorize_status(info: &ContainerInfo) -> ColoredString {
    let status = info.state.status.as_str();
    if info.state.running {
        status.green()
    } else if info.state.has_stopped() {
        format!("{} (exit code {})", status, info.state.exit_code).red()
    } else {
        status.yellow()
    }
}
