//! Collaborator traits the protocol engine consumes

use crate::Result;
use crate::types::ModuleSet;

/// Path-addressed configuration store
///
/// Backends hold device configuration and operational state keyed by model
/// paths such as `/sonic-vlan:sonic-vlan/VLAN/VLAN_LIST[name=Vlan100]`. The
/// engine never writes through this trait.
#[async_trait::async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Read the subtree at `path`
    ///
    /// Returns:
    /// - `Ok(json)` - A JSON object with a single `module:container` key, or `{}`
    ///   when nothing is stored at the path
    /// - `Err(e)` - The store could not be queried
    async fn get(&self, path: &str) -> Result<String>;
}

/// Source of YANG module metadata and schema text
#[async_trait::async_trait]
pub trait SchemaSource: Send + Sync + 'static {
    /// Enumerate every module the device implements or imports.
    async fn modules(&self) -> Result<ModuleSet>;

    /// Read the YANG text stored at `path`.
    async fn read_schema(&self, path: &str) -> Result<String>;
}

/// Authentication, authorization and accounting for a session principal
///
/// Implementations wrap PAM, TACACS+ or similar services. Each session holds
/// one authenticator for the principal that opened it.
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync + 'static {
    /// Check the principal's credentials.
    async fn authenticate(&self) -> bool;

    /// Check whether `operation` may touch `path`.
    async fn authorize(&self, operation: &str, path: &str) -> bool;

    /// Record a completed `operation` with its arguments.
    async fn account(&self, operation: &str, args: &str) -> bool;
}
