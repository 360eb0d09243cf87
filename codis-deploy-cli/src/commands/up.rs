//! Up command handler

use anyhow::Result;
use codis_deploy_client::ContainerApi;
use colored::*;
use std::sync::Arc;

use crate::config::Config;
use crate::deploy::{Bootstrapper, Deployment, proxy_endpoints};

/// Runs the full bootstrap and prints the resulting endpoints
pub async fn handle_up(api: Arc<dyn ContainerApi>, config: Config) -> Result<()> {
    let fallback_host = api.endpoint_host().to_string();
    let bootstrapper = Bootstrapper::new(api, config.clone());

    let deployment = match bootstrapper.run().await {
        Ok(deployment) => deployment,
        Err(err) => {
            if err.is_conflict() {
                eprintln!(
                    "{}",
                    "A previous deployment is still in place; run `codis-deploy down` first."
                        .yellow()
                );
            }
            return Err(err.into());
        }
    };
    print_deployment(&config, &deployment, &fallback_host);

    Ok(())
}

fn print_deployment(config: &Config, deployment: &Deployment, fallback_host: &str) {
    if let Some(output) = deployment
        .slot_init_output
        .as_deref()
        .filter(|o| !o.trim().is_empty())
    {
        println!("{}", output.trim_end());
    }
    println!("{}", deployment.proxy.id);

    eprintln!();
    eprintln!("{}", "Deployment ready".green().bold());
    eprintln!("  Run:        {}", deployment.run_id.to_string().dimmed());
    eprintln!(
        "  Data node:  {} ({})",
        deployment.data_node_addr.cyan(),
        deployment.data_node.name
    );
    for endpoint in proxy_endpoints(config, &deployment.proxy, fallback_host) {
        let address = endpoint.address.unwrap_or_else(|| "-".to_string());
        eprintln!("  {:<11} {}", format!("{}:", capitalize(endpoint.name)), address.cyan());
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
