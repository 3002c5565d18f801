//! Control Plane Configuration
//!
//! The control plane can promote and demote the node, so it binds to
//! loopback unless remote access is explicitly allowed.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Control plane configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Whether the control plane is served (default: false)
    #[serde(default)]
    pub enabled: bool,

    /// Host to bind to (default: "127.0.0.1")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 9292)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Permit a non-loopback bind address (default: false)
    #[serde(default)]
    pub allow_remote: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9292
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_host(),
            port: default_port(),
            allow_remote: false,
        }
    }
}

impl ControlConfig {
    /// Create an enabled config on the given port
    pub fn with_port(port: u16) -> Self {
        Self {
            enabled: true,
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V6(ip)) => format!("[{}]:{}", ip, self.port),
            _ => format!("{}:{}", self.host, self.port),
        }
    }

    /// Whether the configured host is a loopback address
    pub fn is_loopback(&self) -> bool {
        if self.host == "localhost" {
            return true;
        }
        self.host
            .parse::<IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }
        if self.port == 0 {
            return Err("control.port must be > 0".to_string());
        }
        if !self.allow_remote && !self.is_loopback() {
            return Err(format!(
                "control.host '{}' is not loopback; set control.allow_remote to bind it",
                self.host
            ));
        }
        Ok(())
    }
}
