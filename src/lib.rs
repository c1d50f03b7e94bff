//! NETCONF protocol engine for path-addressed configuration stores.
//!
//! `netconf-bridge` serves NETCONF (RFC 6241/6242) sessions on top of any byte
//! stream and answers them from a backend that is queried by model path and
//! returns JSON.
//!
//! # Features
//!
//! - **Framing**: end-of-message and chunked framing on the same stream
//! - **Subtree filters**: `<filter>` subtrees become model paths with YANG
//!   list-key predicates
//! - **Ordered replies**: backend JSON becomes namespaced XML with key leaves first
//! - **Monitoring**: `modules-state`, `netconf-state/schemas` and `<get-schema>`
//!   are served from the schema registry
//! - **Fault isolation**: a failing request gets an `rpc-error`, the session lives on
//!
//! The transport, the authenticator and the store are collaborators supplied by
//! the embedding application through the traits in [`provider`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use netconf_bridge::{NetconfServer, ServerConfig, ServerContext};
//! use netconf_bridge::providers::{MemoryBackend, MemorySchemaSource, StaticAuthenticator};
//! use netconf_bridge::schema::KeyMap;
//! use netconf_bridge::types::ModuleSet;
//! use tokio::io::{AsyncReadExt, AsyncWriteExt};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let context = ServerContext::new(
//!     Arc::new(MemoryBackend::new()),
//!     Arc::new(MemorySchemaSource::new(ModuleSet::default())),
//!     KeyMap::default(),
//!     ServerConfig::default(),
//! );
//! let server = NetconfServer::new(context);
//!
//! let (mut client, transport) = tokio::io::duplex(16 * 1024);
//! let session = server.spawn(transport, Arc::new(StaticAuthenticator::allow_all()));
//!
//! client.write_all(b"<hello xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\"/>]]>]]>").await?;
//! client.shutdown().await?;
//! session.await??;
//!
//! let mut output = String::new();
//! client.read_to_string(&mut output).await?;
//! assert!(output.contains("<session-id>1</session-id>"));
//! # Ok(())
//! # }
//! ```

// Core types and error handling
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod config;
pub mod logging;
pub mod types;
pub mod xml;

// Collaborator seams
pub mod provider;
pub mod providers;

// Request translation
pub mod assembler;
pub mod gate;
pub mod resolver;
pub mod schema;

// Protocol engine
pub mod capability;
pub mod codec;
pub mod context;
pub mod rpc;
pub mod server;
pub mod session;

// Core exports
pub use config::{LoggingConfig, ServerConfig};
pub use context::ServerContext;
pub use error::*;
pub use provider::{Authenticator, Backend, SchemaSource};
pub use server::NetconfServer;
pub use session::{Session, serve_session};
