//! Down command handler

use anyhow::Result;
use codis_deploy_client::ContainerApi;
use colored::*;

use crate::config::Config;
use crate::deploy::teardown;

/// Removes the proxy and data node containers
pub async fn handle_down(api: &dyn ContainerApi, config: &Config) -> Result<()> {
    let report = teardown(api, config).await?;

    for name in &report.removed {
        println!("{} Removed {}", "✓".green(), name.bold());
    }
    for name in &report.missing {
        println!("{} {} does not exist", "-".dimmed(), name.bold());
    }
    if report.removed.is_empty() {
        println!("{}", "Nothing to remove.".yellow());
    }

    Ok(())
}
