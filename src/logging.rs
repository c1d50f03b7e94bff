//! Structured logging for NETCONF sessions
//!
//! Log events carry `session_id`, `message_id` and `path` fields where they apply.
//!
//! # Log Levels
//!
//! - **TRACE**: Frame boundaries and raw reply sizes
//! - **DEBUG**: Resolved query paths, backend reads, schema lookups
//! - **INFO**: Session open and close, hello exchange
//! - **WARN**: Rejected requests, unknown namespaces, registry retries
//! - **ERROR**: Faults caught by the request barrier, transport failures
//!
//! ```no_run
//! use netconf_bridge::{LoggingConfig, logging};
//!
//! logging::init_tracing(&LoggingConfig { filter: "netconf_bridge=debug".to_string() });
//! ```

use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use crate::{LoggingConfig, NetconfError};

/// Install the global fmt subscriber.
///
/// `RUST_LOG` takes precedence over the configured directive. Calling this more
/// than once is harmless; later calls leave the first subscriber in place and
/// return `false`.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok()
}

/// Log a request that is being answered with an `rpc-error`.
pub fn log_rpc_error(session_id: u64, message_id: &str, error: &NetconfError) {
    match error {
        NetconfError::Internal { .. }
        | NetconfError::Backend { .. }
        | NetconfError::BackendPayload { .. } => {
            error!(session_id, message_id, error = %error, "Request failed");
        }
        _ => {
            warn!(session_id, message_id, error = %error, "Request rejected");
        }
    }
}

/// Log a panic caught while processing a request.
pub fn log_request_fault(session_id: u64, request: &str, details: &str) {
    error!(session_id, request, details, "Request processing panicked");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_harmless() {
        let config = LoggingConfig::default();
        let _ = init_tracing(&config);
        assert!(!init_tracing(&config));
    }

    #[test]
    fn unparseable_directive_falls_back() {
        let config = LoggingConfig { filter: "=[".to_string() };
        let _ = init_tracing(&config);
        log_rpc_error(1, "101", &NetconfError::MissingFilter);
        log_request_fault(1, "<rpc/>", "index out of bounds");
    }
}
