//! Deployment configuration
//!
//! Every endpoint, image, port, command path and readiness timing used by the
//! deployment lives here and is passed into the bootstrap routine. Defaults
//! reproduce the single-host test environment the tool was first written for.

use std::collections::HashSet;
use std::time::Duration;

/// A container port and the host port it is published on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortConfig {
    /// Port the service listens on inside the container
    pub container: u16,

    /// Port published on the host
    pub host: u16,
}

impl PortConfig {
    /// Same port inside and outside the container
    pub const fn same(port: u16) -> Self {
        Self {
            container: port,
            host: port,
        }
    }
}

/// The Redis-compatible data node container
#[derive(Debug, Clone)]
pub struct DataNodeConfig {
    /// Container name
    pub name: String,

    /// Image repository under the registry host
    pub image: String,

    /// Redis port
    pub port: PortConfig,

    /// Server binary started inside the container
    pub server_bin: String,
}

impl Default for DataNodeConfig {
    fn default() -> Self {
        Self {
            name: "redis-test".to_string(),
            image: "redis".to_string(),
            port: PortConfig::same(6379),
            server_bin: "/codis/codis-server".to_string(),
        }
    }
}

/// The proxy container (embedded etcd, dashboard and codis-proxy)
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Container name
    pub name: String,

    /// Image repository under the registry host
    pub image: String,

    /// Client-facing proxy port
    pub proxy_port: PortConfig,

    /// Proxy admin HTTP port
    pub admin_port: PortConfig,

    /// Dashboard port
    pub dashboard_port: PortConfig,

    /// Proxy instance id marked online once the proxy runs
    pub proxy_id: String,

    /// Server group the data node is registered in
    pub server_group: u32,

    /// Codis config file, relative to the container working directory
    pub config_file: String,

    /// Proxy log file, relative to the container working directory
    pub log_file: String,

    /// CPUs the proxy may use
    pub cpu: u32,

    /// Directory holding codis-config and codis-proxy
    pub codis_bin_dir: String,

    /// etcd binary
    pub etcd_bin: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            name: "proxy-test".to_string(),
            image: "proxy-etcd".to_string(),
            proxy_port: PortConfig::same(19000),
            admin_port: PortConfig::same(11000),
            dashboard_port: PortConfig::same(18087),
            proxy_id: "proxy_1".to_string(),
            server_group: 1,
            config_file: "config.ini".to_string(),
            log_file: "./proxy.log".to_string(),
            cpu: 1,
            codis_bin_dir: "/codis/bin".to_string(),
            etcd_bin: "/etcd/etcd".to_string(),
        }
    }
}

/// Deployment configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Docker or Swarm API endpoint (e.g., "http://192.168.156.200:2375")
    pub swarm_host: String,

    /// Registry images are pulled from (host:port)
    pub registry_host: String,

    /// Optional API version prefix (e.g., "1.24")
    pub api_version: Option<String>,

    /// Host interface ports are published on
    pub bind_ip: String,

    pub data_node: DataNodeConfig,
    pub proxy: ProxyConfig,

    /// Pull both images before creating containers
    pub pull_images: bool,

    /// Remove containers created by a failed run
    pub rollback_on_failure: bool,

    /// How long a single readiness wait may take
    pub ready_timeout: Duration,

    /// Delay between readiness probes
    pub poll_interval: Duration,

    /// How long a background process must stay up to count as started
    pub daemon_grace: Duration,

    /// Timeout for short API calls
    pub request_timeout: Duration,

    /// TCP connect timeout towards the API endpoint
    pub connect_timeout: Duration,

    /// Idle pooled connections are closed after this long
    pub pool_idle_timeout: Duration,
}

impl Config {
    /// Creates a configuration for the given endpoints with defaults for everything else
    pub fn new(swarm_host: String, registry_host: String) -> Self {
        Self {
            swarm_host,
            registry_host,
            api_version: None,
            bind_ip: "0.0.0.0".to_string(),
            data_node: DataNodeConfig::default(),
            proxy: ProxyConfig::default(),
            pull_images: true,
            rollback_on_failure: false,
            ready_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(250),
            daemon_grace: Duration::from_secs(2),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            pool_idle_timeout: Duration::from_secs(10),
        }
    }

    /// Fully qualified data node image
    pub fn data_node_image(&self) -> String {
        format!("{}/{}", self.registry_host, self.data_node.image)
    }

    /// Fully qualified proxy image
    pub fn proxy_image(&self) -> String {
        format!("{}/{}", self.registry_host, self.proxy.image)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.swarm_host.is_empty() {
            anyhow::bail!("swarm_host cannot be empty");
        }

        if !self.swarm_host.starts_with("http://") && !self.swarm_host.starts_with("https://") {
            anyhow::bail!("swarm_host must start with http:// or https://");
        }

        if self.registry_host.is_empty() {
            anyhow::bail!("registry_host cannot be empty");
        }

        if self.data_node.name.is_empty() || self.proxy.name.is_empty() {
            anyhow::bail!("container names cannot be empty");
        }

        if self.data_node.name == self.proxy.name {
            anyhow::bail!("data node and proxy containers need distinct names");
        }

        if self.ready_timeout.is_zero() {
            anyhow::bail!("ready_timeout must be greater than 0");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        let ports = [
            self.data_node.port,
            self.proxy.proxy_port,
            self.proxy.admin_port,
            self.proxy.dashboard_port,
        ];
        if ports.iter().any(|p| p.container == 0 || p.host == 0) {
            anyhow::bail!("ports must be greater than 0");
        }

        // Both containers may land on the same engine
        let unique: HashSet<u16> = ports.iter().map(|p| p.host).collect();
        if unique.len() != ports.len() {
            anyhow::bail!("host ports must be distinct");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            "http://192.168.156.200:2375".to_string(),
            "192.168.156.200:5000".to_string(),
        )
    }
}
