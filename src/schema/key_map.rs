//! YANG list key definitions
//!
//! Maps the fully qualified path of every YANG list to its key leaf names in
//! declared order. Paths of SONiC models (`/sonic-*`) live in their own
//! partition, everything else in the common one. The file is generated from
//! the YANG models and looks like:
//!
//! ```yaml
//! sonic:
//!   /sonic-vlan:sonic-vlan/VLAN/VLAN_LIST: [name]
//!   /sonic-vlan:sonic-vlan/VLAN_MEMBER/VLAN_MEMBER_LIST: [name, ifname]
//! common:
//!   /openconfig-interfaces:interfaces/interface: [name]
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::{NetconfError, Result};

/// List path of the RFC 6022 schema listing.
pub const SCHEMA_LIST_PATH: &str = "/netconf-state:netconf-state/schemas/schema";

/// Key leaves of the RFC 6022 schema listing.
pub const SCHEMA_LIST_KEYS: [&str; 3] = ["identifier", "version", "format"];

/// Read-only list path → key names table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyMap {
    #[serde(default)]
    sonic: HashMap<String, Vec<String>>,
    #[serde(default)]
    common: HashMap<String, Vec<String>>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new(HashMap::new(), HashMap::new())
    }
}

impl KeyMap {
    /// Build a key map from its two partitions.
    ///
    /// The schema listing keys are always added to the common partition.
    pub fn new(
        sonic: HashMap<String, Vec<String>>,
        common: HashMap<String, Vec<String>>,
    ) -> Self {
        let mut map = Self { sonic, common };
        map.insert_builtin_keys();
        map
    }

    /// Parse a key map document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut map: KeyMap = serde_yaml_ng::from_str(yaml)
            .map_err(|e| NetconfError::config(format!("Key map parsing failed: {}", e)))?;
        map.insert_builtin_keys();
        Ok(map)
    }

    /// Load a key map file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read key map {}", path.display()))?;
        let map = Self::from_yaml(&yaml)
            .with_context(|| format!("Invalid key map {}", path.display()))?;
        tracing::debug!(
            sonic = map.sonic.len(),
            common = map.common.len(),
            "Loaded list key definitions from {}",
            path.display()
        );
        Ok(map)
    }

    /// Key leaf names of the list at `path`, in declared order.
    ///
    /// Paths containing `sonic-` are looked up in the SONiC partition only.
    /// Unknown paths have no keys.
    pub fn keys_for(&self, path: &str) -> &[String] {
        let partition = if is_sonic_path(path) { &self.sonic } else { &self.common };
        partition.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of list paths across both partitions.
    pub fn len(&self) -> usize {
        self.sonic.len() + self.common.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert_builtin_keys(&mut self) {
        self.common
            .entry(SCHEMA_LIST_PATH.to_string())
            .or_insert_with(|| SCHEMA_LIST_KEYS.iter().map(|k| k.to_string()).collect());
    }
}

/// Returns whether a path belongs to a SONiC model.
pub fn is_sonic_path(path: &str) -> bool {
    path.contains("sonic-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KEYS: &str = r#"
sonic:
  /sonic-vlan:sonic-vlan/VLAN/VLAN_LIST: [name]
  /sonic-vlan:sonic-vlan/VLAN_MEMBER/VLAN_MEMBER_LIST: [name, ifname]
common:
  /openconfig-interfaces:interfaces/interface: [name]
"#;

    #[test]
    fn keys_come_back_in_declared_order() {
        let map = KeyMap::from_yaml(KEYS).unwrap();
        assert_eq!(map.keys_for("/sonic-vlan:sonic-vlan/VLAN_MEMBER/VLAN_MEMBER_LIST"), [
            "name", "ifname"
        ]);
        assert_eq!(map.keys_for("/openconfig-interfaces:interfaces/interface"), ["name"]);
        assert!(map.keys_for("/sonic-vlan:sonic-vlan/VLAN").is_empty());
    }

    #[test]
    fn partitions_do_not_leak_into_each_other() {
        let mut common = HashMap::new();
        common.insert("/sonic-port:sonic-port/PORT/PORT_LIST".to_string(), vec!["ifname".to_string()]);
        let map = KeyMap::new(HashMap::new(), common);

        assert!(map.keys_for("/sonic-port:sonic-port/PORT/PORT_LIST").is_empty());
    }

    #[test]
    fn schema_listing_keys_are_always_present() {
        for map in [KeyMap::default(), KeyMap::from_yaml(KEYS).unwrap()] {
            assert_eq!(map.keys_for(SCHEMA_LIST_PATH), SCHEMA_LIST_KEYS);
        }
        assert_eq!(KeyMap::default().len(), 1);
    }

    #[test]
    fn load_reads_generated_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(KEYS.as_bytes()).unwrap();

        let map = KeyMap::load(file.path()).unwrap();
        assert_eq!(map.len(), 4);
        assert_eq!(map.keys_for("/sonic-vlan:sonic-vlan/VLAN/VLAN_LIST"), ["name"]);
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(KeyMap::from_yaml("sonic: [1, 2]").is_err());
        assert!(KeyMap::load("/nonexistent/keys.yaml").is_err());
    }
}
