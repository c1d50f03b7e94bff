//! YANG schema metadata
//!
//! Two read-only tables drive request translation:
//! - [`SchemaRegistry`] knows every module the device exposes (namespaces,
//!   revisions, YANG file locations) and serves the `modules-state` and
//!   `netconf-state/schemas` documents
//! - [`KeyMap`] knows the key leaves of every YANG list, used both to build
//!   `[key=value]` predicates and to order key leaves first in replies
//!
//! The registry is populated lazily from a [`SchemaSource`](crate::provider::SchemaSource)
//! the first time a session needs it; the key map is loaded at startup.

pub mod key_map;
pub mod registry;

pub use key_map::KeyMap;
pub use registry::SchemaRegistry;
