//! Core types shared by the protocol engine.
//!
//! - [`GetRequest`] is the query descriptor produced by the path resolver and
//!   consumed by the authorization gate and the response assembler
//! - [`Operation`] names the RPC carried by an `<rpc>` envelope
//! - [`SchemaDescriptor`] and [`ModuleRecord`] are the two views the schema
//!   registry keeps of every YANG module
//!
//! ```rust
//! use netconf_bridge::types::GetRequest;
//!
//! let mut request = GetRequest::element("sonic-vlan", "VLAN", "VLAN_LIST");
//! request.push_predicate("name", "Vlan100");
//! assert_eq!(request.path, "/sonic-vlan:sonic-vlan/VLAN/VLAN_LIST[name=Vlan100]");
//! ```

mod request;
mod schema;

pub use request::{GetRequest, Operation};
pub use schema::{
    ConformanceType, GetSchemaRequest, ModuleInfo, ModuleRecord, ModuleSet, SchemaDescriptor,
};
