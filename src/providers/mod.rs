//! Built-in collaborator implementations
//!
//! - [`memory`]: in-process backend and schema source
//! - [`auth`]: fixed-policy authenticator

pub mod auth;
pub mod memory;

pub use auth::{AuthCall, StaticAuthenticator};
pub use memory::{MemoryBackend, MemorySchemaSource};
