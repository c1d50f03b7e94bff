//! Error types for NETCONF request processing.
//!
//! Every failure the protocol engine can hit is a [`NetconfError`]. The dispatcher
//! converts any of them into an `rpc-error` reply; only transport failures and an
//! invalid client `hello` end the session.
//!
//! ## Error Categories
//!
//! - **Transport Errors**: I/O and framing failures on the session stream
//! - **Protocol Errors**: malformed XML, missing root or `message-id`, unsupported operations
//! - **Request Errors**: missing `<filter>` or schema identifier
//! - **Access Errors**: authorization and accounting refusals
//! - **Backend Errors**: store query failures and unparseable store payloads
//! - **Internal Errors**: faults caught by the per-request barrier
//!
//! ## Client-facing messages
//!
//! The text placed in `<error-message>` comes from [`NetconfError::client_message`],
//! which hides store and internal detail behind a fixed message:
//!
//! ```rust
//! use netconf_bridge::NetconfError;
//!
//! let error = NetconfError::unauthorized("/sonic-vlan:sonic-vlan/VLAN");
//! assert_eq!(error.client_message(), "[AUTH] Unauthorized access /sonic-vlan:sonic-vlan/VLAN");
//!
//! let error = NetconfError::backend("/sonic-vlan:sonic-vlan", "redis connection refused");
//! assert_eq!(error.client_message(), "Failed to handle request");
//! ```

use thiserror::Error;

/// Result type alias for NETCONF operations.
pub type Result<T, E = NetconfError> = std::result::Result<T, E>;

/// Main error type for NETCONF operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NetconfError {
    #[error("Transport I/O error")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Framing error: {details}")]
    Framing { details: String },

    #[error("[Malformed XML] Unable to parse request string")]
    MalformedXml {
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[Malformed XML] Root node not found")]
    MissingRoot,

    #[error("[Missing data] Unable to read message-id in rpc")]
    MissingMessageId,

    #[error("Invalid client capabilities: {reason}")]
    InvalidHello { reason: String },

    #[error("Unsupported command")]
    UnsupportedOperation { operation: String },

    #[error(
        "[Missing data] Need filter element. Complete configuration retrival currently not supported"
    )]
    MissingFilter,

    #[error("Identifier not passed")]
    MissingIdentifier,

    #[error("[AUTH] Unauthorized access {path}")]
    Unauthorized { path: String },

    #[error("[AUTH] Accounting failed {operation} - args:{args}")]
    AccountingFailed { operation: String, args: String },

    #[error("Backend query failed for {path}: {reason}")]
    Backend {
        path: String,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unparseable backend payload for {path}: {details}")]
    BackendPayload { path: String, details: String },

    #[error("Schema error: {reason}")]
    Schema { reason: String },

    #[error("Configuration error: {reason}")]
    Config { reason: String },

    #[error("Internal fault: {details}")]
    Internal { details: String },
}

impl NetconfError {
    /// Message placed in the `<error-message>` element of an `rpc-error`.
    ///
    /// Backend, payload and internal faults collapse to fixed text so store
    /// internals never reach the client; the full error is logged instead.
    pub fn client_message(&self) -> String {
        match self {
            NetconfError::Backend { .. } | NetconfError::BackendPayload { .. } => {
                "Failed to handle request".to_string()
            }
            NetconfError::Internal { .. } | NetconfError::Io { .. } => {
                "Unable to handle request".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Returns whether the session must be torn down after reporting this error.
    pub fn closes_session(&self) -> bool {
        match self {
            NetconfError::Io { .. } => true,
            NetconfError::Framing { .. } => true,
            NetconfError::InvalidHello { .. } => true,
            NetconfError::MalformedXml { .. } => false,
            NetconfError::MissingRoot => false,
            NetconfError::MissingMessageId => false,
            NetconfError::UnsupportedOperation { .. } => false,
            NetconfError::MissingFilter => false,
            NetconfError::MissingIdentifier => false,
            NetconfError::Unauthorized { .. } => false,
            NetconfError::AccountingFailed { .. } => false,
            NetconfError::Backend { .. } => false,
            NetconfError::BackendPayload { .. } => false,
            NetconfError::Schema { .. } => false,
            NetconfError::Config { .. } => false,
            NetconfError::Internal { .. } => false,
        }
    }

    /// Helper constructor for XML parse failures.
    pub fn malformed_xml(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        NetconfError::MalformedXml { source: Some(Box::new(source)) }
    }

    /// Helper constructor for an unrecognized client `hello`.
    pub fn invalid_hello(reason: impl Into<String>) -> Self {
        NetconfError::InvalidHello { reason: reason.into() }
    }

    /// Helper constructor for operations outside `get`, `get-schema` and `close-session`.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        NetconfError::UnsupportedOperation { operation: operation.into() }
    }

    /// Helper constructor for authorization refusals.
    pub fn unauthorized(path: impl Into<String>) -> Self {
        NetconfError::Unauthorized { path: path.into() }
    }

    /// Helper constructor for accounting refusals.
    pub fn accounting_failed(operation: impl Into<String>, args: impl Into<String>) -> Self {
        NetconfError::AccountingFailed { operation: operation.into(), args: args.into() }
    }

    /// Helper constructor for store query failures.
    pub fn backend(path: impl Into<String>, reason: impl Into<String>) -> Self {
        NetconfError::Backend { path: path.into(), reason: reason.into(), source: None }
    }

    /// Helper constructor for store query failures with source.
    pub fn backend_with_source(
        path: impl Into<String>,
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        NetconfError::Backend { path: path.into(), reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for store payloads the assembler cannot interpret.
    pub fn backend_payload(path: impl Into<String>, details: impl Into<String>) -> Self {
        NetconfError::BackendPayload { path: path.into(), details: details.into() }
    }

    /// Helper constructor for schema registry and schema source failures.
    pub fn schema(reason: impl Into<String>) -> Self {
        NetconfError::Schema { reason: reason.into() }
    }

    /// Helper constructor for configuration failures.
    pub fn config(reason: impl Into<String>) -> Self {
        NetconfError::Config { reason: reason.into() }
    }

    /// Helper constructor for faults caught by the request barrier.
    pub fn internal(details: impl Into<String>) -> Self {
        NetconfError::Internal { details: details.into() }
    }
}
