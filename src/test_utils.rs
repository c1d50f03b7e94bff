//! Shared fixtures for unit tests and benchmarks
//!
//! The fixtures model a small SONiC-style device: a VLAN model with one
//! configured VLAN, a port model and an OpenConfig interfaces module that is
//! imported only.

#![cfg(any(test, feature = "benchmark"))]

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::context::ServerContext;
use crate::providers::memory::{MemoryBackend, MemorySchemaSource};
use crate::schema::KeyMap;
use crate::types::{ConformanceType, ModuleInfo, ModuleSet};

/// Backend path of the `Vlan100` list entry.
pub const VLAN100_PATH: &str = "/sonic-vlan:sonic-vlan/VLAN/VLAN_LIST[name=Vlan100]";

/// Backend answer for [`VLAN100_PATH`]; keys arrive in alphabetical order.
pub const VLAN100_JSON: &str =
    r#"{"sonic-vlan:VLAN_LIST":[{"description":"test vlan100","name":"Vlan100","vlanid":100}]}"#;

/// `<get>` selecting `Vlan100` by key.
pub const VLAN100_REQUEST: &str = r#"<rpc xmlns="urn:ietf:params:xml:ns:netconf:base:1.0" message-id="752ab2ee-f662-4ec9-9970-f308a80f18f2">
  <get>
    <filter type="subtree">
      <sonic-vlan xmlns="http://github.com/Azure/sonic-vlan">
        <VLAN>
          <VLAN_LIST>
            <name>Vlan100</name>
          </VLAN_LIST>
        </VLAN>
      </sonic-vlan>
    </filter>
  </get>
</rpc>"#;

/// `<data>` payload produced for [`VLAN100_REQUEST`].
pub const VLAN100_DATA: &str = "<data><sonic-vlan xmlns=\"http://github.com/Azure/sonic-vlan\"><VLAN><VLAN_LIST>\
     <name>Vlan100</name><description>test vlan100</description><vlanid>100</vlanid>\
     </VLAN_LIST></VLAN></sonic-vlan></data>";

/// Schema text stored for `sonic-vlan`; contains characters that need escaping.
pub const VLAN_YANG: &str = r#"module sonic-vlan {
    namespace "http://github.com/Azure/sonic-vlan";
    prefix vlan;

    revision 2021-04-22 {
        description "Initial revision";
    }

    container sonic-vlan {
        container VLAN {
            list VLAN_LIST {
                key "name";
                leaf name {
                    type string {
                        pattern 'Vlan[0-9]+';
                    }
                }
                leaf vlanid {
                    type uint16 {
                        range "1..4094";
                    }
                    must ". < 4095 and . > 0";
                }
                leaf description {
                    type string;
                    description "Free text & notes";
                }
            }
        }
    }
}
"#;

/// Location of [`VLAN_YANG`] under the default model directory.
pub const VLAN_YANG_PATH: &str = "/usr/models/yang/sonic-vlan.yang";

fn module(
    name: &str,
    namespace: &str,
    revision: &str,
    conformance: ConformanceType,
) -> ModuleInfo {
    ModuleInfo {
        name: name.to_string(),
        namespace: namespace.to_string(),
        revision: revision.to_string(),
        conformance,
        schema: None,
    }
}

/// Module set with `sonic-vlan`, `sonic-port` and `openconfig-interfaces`.
pub fn sample_module_set() -> ModuleSet {
    ModuleSet {
        module_set_id: "1f2e3d".to_string(),
        modules: vec![
            module(
                "sonic-vlan",
                "http://github.com/Azure/sonic-vlan",
                "2021-04-22",
                ConformanceType::Implement,
            ),
            module(
                "sonic-port",
                "http://github.com/Azure/sonic-port",
                "2019-07-17",
                ConformanceType::Implement,
            ),
            module(
                "openconfig-interfaces",
                "http://openconfig.net/yang/interfaces",
                "2019-11-19",
                ConformanceType::Import,
            ),
        ],
    }
}

/// List keys of the sample models.
pub fn sample_key_map() -> KeyMap {
    let keys = |names: &[&str]| names.iter().map(|name| name.to_string()).collect::<Vec<_>>();

    let sonic = HashMap::from([
        ("/sonic-vlan:sonic-vlan/VLAN/VLAN_LIST".to_string(), keys(&["name"])),
        (
            "/sonic-vlan:sonic-vlan/VLAN_MEMBER/VLAN_MEMBER_LIST".to_string(),
            keys(&["name", "ifname"]),
        ),
        ("/sonic-port:sonic-port/PORT/PORT_LIST".to_string(), keys(&["ifname"])),
    ]);
    let common = HashMap::from([(
        "/openconfig-interfaces:interfaces/interface".to_string(),
        keys(&["name"]),
    )]);

    KeyMap::new(sonic, common)
}

/// Backend holding the `Vlan100` entry.
pub fn sample_backend() -> MemoryBackend {
    MemoryBackend::new().with_entry(VLAN100_PATH, VLAN100_JSON)
}

/// Context over [`sample_backend`], the sample modules and default config.
pub fn sample_context() -> ServerContext {
    sample_context_with(sample_backend())
}

/// Context over the given backend with the sample modules and key map.
pub fn sample_context_with(backend: MemoryBackend) -> ServerContext {
    let schemas = MemorySchemaSource::new(sample_module_set()).with_schema(VLAN_YANG_PATH, VLAN_YANG);
    ServerContext::new(
        Arc::new(backend),
        Arc::new(schemas),
        sample_key_map(),
        ServerConfig::default(),
    )
}
