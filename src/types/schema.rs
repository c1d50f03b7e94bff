//! YANG schema and module metadata types

use serde::{Deserialize, Serialize};

/// One retrievable schema as advertised in `netconf-state/schemas`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Lower-cased module name
    pub identifier: String,
    /// Module revision date
    pub version: String,
    /// Schema language, always `yang` for registry entries
    pub format: String,
    /// XML namespace of the module
    pub namespace: String,
    /// Retrieval location tag (RFC 6022 `location`)
    pub location: String,
    /// Path handed to the schema source when the text is requested
    #[serde(skip)]
    pub model_path: String,
}

/// YANG library conformance of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConformanceType {
    #[default]
    Unset,
    Implement,
    Import,
}

impl ConformanceType {
    /// Map the store's numeric conformance code.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => ConformanceType::Implement,
            2 => ConformanceType::Import,
            _ => ConformanceType::Unset,
        }
    }

    /// Text used in `modules-state` replies.
    pub fn as_str(self) -> &'static str {
        match self {
            ConformanceType::Unset => "UNSET",
            ConformanceType::Implement => "implement",
            ConformanceType::Import => "import",
        }
    }
}

/// Module metadata as enumerated by a [`SchemaSource`](crate::provider::SchemaSource).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub name: String,
    pub namespace: String,
    pub revision: String,
    #[serde(default)]
    pub conformance: ConformanceType,
    /// Schema URL reported by the source, if any
    #[serde(default)]
    pub schema: Option<String>,
}

/// Complete module enumeration returned by a schema source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSet {
    pub module_set_id: String,
    pub modules: Vec<ModuleInfo>,
}

/// Module entry of the YANG library (`modules-state/module`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    pub name: String,
    pub namespace: String,
    pub revision: String,
    pub conformance_type: ConformanceType,
    pub schema_url: String,
}

impl ModuleRecord {
    /// Capability URI advertised in the server `hello`.
    pub fn capability_uri(&self) -> String {
        format!("{}?module={}&revision={}", self.namespace, self.name, self.revision)
    }
}

/// Parameters of a `get-schema` RPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetSchemaRequest {
    pub identifier: String,
    pub format: Option<String>,
    pub version: Option<String>,
}

impl GetSchemaRequest {
    /// Check whether a registry descriptor satisfies this request.
    ///
    /// The identifier is expected to be looked up already; format compares
    /// case-insensitively and version exactly, both only when supplied.
    pub fn matches(&self, descriptor: &SchemaDescriptor) -> bool {
        let format_ok = self
            .format
            .as_deref()
            .is_none_or(|format| descriptor.format.eq_ignore_ascii_case(format));
        let version_ok = self.version.as_deref().is_none_or(|version| descriptor.version == version);
        format_ok && version_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> SchemaDescriptor {
        SchemaDescriptor {
            identifier: "sonic-vlan".to_string(),
            version: "2021-04-22".to_string(),
            format: "yang".to_string(),
            namespace: "http://github.com/Azure/sonic-vlan".to_string(),
            location: "NETCONF".to_string(),
            model_path: "/usr/models/yang/sonic-vlan.yang".to_string(),
        }
    }

    #[test]
    fn conformance_codes_map_to_library_text() {
        assert_eq!(ConformanceType::from_code(0).as_str(), "UNSET");
        assert_eq!(ConformanceType::from_code(1).as_str(), "implement");
        assert_eq!(ConformanceType::from_code(2).as_str(), "import");
        assert_eq!(ConformanceType::from_code(9), ConformanceType::Unset);
    }

    #[test]
    fn get_schema_matching_ignores_absent_parameters() {
        let request =
            GetSchemaRequest { identifier: "sonic-vlan".to_string(), format: None, version: None };
        assert!(request.matches(&descriptor()));

        let request = GetSchemaRequest {
            identifier: "sonic-vlan".to_string(),
            format: Some("YANG".to_string()),
            version: Some("2021-04-22".to_string()),
        };
        assert!(request.matches(&descriptor()));

        let request = GetSchemaRequest {
            identifier: "sonic-vlan".to_string(),
            format: None,
            version: Some("2020-01-01".to_string()),
        };
        assert!(!request.matches(&descriptor()));
    }

    #[test]
    fn capability_uri_carries_module_and_revision() {
        let record = ModuleRecord {
            name: "sonic-vlan".to_string(),
            namespace: "http://github.com/Azure/sonic-vlan".to_string(),
            revision: "2021-04-22".to_string(),
            conformance_type: ConformanceType::Implement,
            schema_url: "http://localhost/usr/models/yang/sonic-vlan".to_string(),
        };
        assert_eq!(
            record.capability_uri(),
            "http://github.com/Azure/sonic-vlan?module=sonic-vlan&revision=2021-04-22"
        );
    }
}
