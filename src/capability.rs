//! Hello exchange
//!
//! The server speaks first with its capability list and session id. The
//! client answer is only checked for a `hello` root element; capabilities are
//! not intersected.
//!
//! ```rust
//! use netconf_bridge::capability::{server_hello, validate_client_hello};
//!
//! let hello = server_hello(7, None).unwrap();
//! assert!(hello.contains("<capability>urn:ietf:params:netconf:base:1.1</capability>"));
//! assert!(hello.ends_with("<session-id>7</session-id></hello>"));
//!
//! assert!(validate_client_hello("<hello><capabilities/></hello>").is_ok());
//! assert!(validate_client_hello("<rpc message-id=\"1\"/>").is_err());
//! ```

use tracing::debug;

use crate::schema::SchemaRegistry;
use crate::xml::{NS_NETCONF_BASE, NS_NETCONF_MONITORING, XmlWriter};
use crate::{NetconfError, Result};

pub const CAP_BASE_1_0: &str = "urn:ietf:params:netconf:base:1.0";
pub const CAP_BASE_1_1: &str = "urn:ietf:params:netconf:base:1.1";
pub const CAP_WRITABLE_RUNNING: &str = "urn:ietf:params:netconf:capability:writable-running:1.0";
pub const CAP_XPATH: &str = "urn:ietf:params:netconf:capability:xpath:1.0";
pub const CAP_MONITORING: &str = NS_NETCONF_MONITORING;
pub const CAP_STARTUP: &str = "urn:ietf:params:netconf:capability:startup:1.0";

/// Prefix of the YANG library capability; the module set id follows.
pub const CAP_YANG_LIBRARY: &str = "urn:ietf:params:netconf:capability:yang-library:1.0?module-set-id=";

const STATIC_CAPABILITIES: [&str; 6] =
    [CAP_BASE_1_0, CAP_BASE_1_1, CAP_WRITABLE_RUNNING, CAP_XPATH, CAP_MONITORING, CAP_STARTUP];

/// Capability URIs advertised to a client.
///
/// Without a registry only the static capabilities are listed.
pub fn capabilities(registry: Option<&SchemaRegistry>) -> Vec<String> {
    let mut capabilities: Vec<String> = STATIC_CAPABILITIES.iter().map(|c| c.to_string()).collect();

    if let Some(registry) = registry {
        capabilities.push(format!("{}{}", CAP_YANG_LIBRARY, registry.module_set_id()));
        capabilities.extend(registry.modules().iter().map(|m| m.capability_uri()));
    }

    capabilities
}

/// Serialize the server `hello`.
pub fn server_hello(session_id: u64, registry: Option<&SchemaRegistry>) -> Result<String> {
    let capabilities = capabilities(registry);
    debug!(session_id, capabilities = capabilities.len(), "Building server hello");

    let mut xml = XmlWriter::new();
    xml.start("hello", &[("xmlns", NS_NETCONF_BASE)])?;
    xml.start("capabilities", &[])?;
    for capability in &capabilities {
        xml.leaf("capability", capability)?;
    }
    xml.end("capabilities")?;
    xml.leaf("session-id", &session_id.to_string())?;
    xml.end("hello")?;
    xml.finish()
}

/// Accept a client `hello`.
///
/// Any well-formed document whose root element is named `hello` passes.
pub fn validate_client_hello(message: &str) -> Result<()> {
    let doc = roxmltree::Document::parse(message.trim_start())
        .map_err(|e| NetconfError::invalid_hello(format!("malformed hello: {}", e)))?;

    let root = doc.root_element().tag_name().name();
    if root != "hello" {
        return Err(NetconfError::invalid_hello(format!("expected hello, got {}", root)));
    }
    Ok(())
}
