//! Deployment of a codis-server data node and a codis proxy
//!
//! - `plan`: container specs and the ordered in-container commands
//! - `bootstrap`: the create/start/exec sequence with readiness waits
//! - `readiness`: polling probes for containers, execs and TCP ports
//! - `teardown` and `inspect`: removal and status of a deployment

mod bootstrap;
mod error;
#[cfg(test)]
mod fake;
mod inspect;
mod plan;
mod readiness;
mod teardown;

pub use bootstrap::{Bootstrapper, Deployment};
pub use inspect::{DeployedContainer, inspect_deployment, proxy_endpoints};
pub use teardown::teardown;
