//! Server configuration
//!
//! Configuration is read from YAML. Every field has a default, so an empty
//! document yields a usable configuration:
//!
//! ```rust
//! use netconf_bridge::ServerConfig;
//!
//! let config = ServerConfig::from_yaml("close_delay_ms: 250\nlogging:\n  filter: debug\n").unwrap();
//! assert_eq!(config.close_delay().as_millis(), 250);
//! assert_eq!(config.yang_dir, "/usr/models/yang");
//! assert_eq!(config.logging.filter, "debug");
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{NetconfError, Result};

/// Settings shared by every session of a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Delay between a `close-session` reply and closing the transport
    pub close_delay_ms: u64,

    /// Directory holding `<module>.yang` files
    pub yang_dir: String,

    /// Prefix of schema URLs reported for modules that carry none
    pub schema_url_base: String,

    /// `location` reported in `netconf-state/schemas` listings
    pub schema_location: String,

    /// YAML file with list key definitions
    pub key_map: Option<PathBuf>,

    pub logging: LoggingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            close_delay_ms: 1000,
            yang_dir: "/usr/models/yang".to_string(),
            schema_url_base: "http://localhost/usr/models/yang/".to_string(),
            schema_location: "NETCONF".to_string(),
            key_map: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".to_string() }
    }
}

impl ServerConfig {
    /// Parse a configuration document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(yaml)
            .map_err(|e| NetconfError::config(format!("YAML parsing failed: {}", e)))
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&yaml)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }

    /// On-disk location of a module's YANG text.
    pub fn model_path(&self, module: &str) -> String {
        format!("{}/{}.yang", self.yang_dir.trim_end_matches('/'), module)
    }

    /// Schema URL reported for a module without one.
    pub fn default_schema_url(&self, module: &str) -> String {
        format!("{}{}", self.schema_url_base, module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ServerConfig::from_yaml("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.close_delay(), Duration::from_secs(1));
        assert_eq!(config.schema_location, "NETCONF");
        assert_eq!(config.key_map, None);
    }

    #[test]
    fn derived_paths_follow_the_configured_directories() {
        let config = ServerConfig { yang_dir: "/opt/yang/".to_string(), ..Default::default() };
        assert_eq!(config.model_path("sonic-vlan"), "/opt/yang/sonic-vlan.yang");
        assert_eq!(
            config.default_schema_url("sonic-vlan"),
            "http://localhost/usr/models/yang/sonic-vlan"
        );
    }

    #[test]
    fn invalid_yaml_is_a_config_error() {
        let error = ServerConfig::from_yaml("close_delay_ms: [soon]").unwrap_err();
        assert!(matches!(error, NetconfError::Config { .. }));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "key_map: /etc/netconf/keys.yaml").unwrap();
        writeln!(file, "schema_location: yang-library").unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.key_map, Some(PathBuf::from("/etc/netconf/keys.yaml")));
        assert_eq!(config.schema_location, "yang-library");
        assert_eq!(config.close_delay_ms, 1000);
    }

    #[test]
    fn load_names_the_missing_file() {
        let error = ServerConfig::load("/nonexistent/netconf.yaml").unwrap_err();
        assert!(format!("{:#}", error).contains("/nonexistent/netconf.yaml"));
    }
}
