//! Authorization and accounting around backend reads
//!
//! Every resolved path is authorized before anything is read, so a refusal
//! leaves the store untouched. One accounting record covering all paths is
//! written after the reads have completed.

use tracing::{debug, info, warn};

use crate::provider::Authenticator;
use crate::types::GetRequest;
use crate::{NetconfError, Result};

/// Authorization checks for one request on behalf of a session principal.
pub struct AuthorizationGate<'a> {
    authenticator: &'a dyn Authenticator,
}

impl<'a> AuthorizationGate<'a> {
    pub fn new(authenticator: &'a dyn Authenticator) -> Self {
        Self { authenticator }
    }

    /// Authorize `operation` on every request path.
    ///
    /// Stops at the first refusal and names that path in the error.
    pub async fn authorize_all(&self, operation: &str, requests: &[GetRequest]) -> Result<()> {
        for request in requests {
            if !self.authenticator.authorize(operation, &request.path).await {
                warn!(operation, path = %request.path, "Authorization refused");
                return Err(NetconfError::unauthorized(&request.path));
            }
            debug!(operation, path = %request.path, "Authorization passed");
        }
        Ok(())
    }

    /// Write the accounting record for a completed `operation`.
    pub async fn account(&self, operation: &str, requests: &[GetRequest]) -> Result<()> {
        let args = accounting_args(requests);
        if !self.authenticator.account(operation, &args).await {
            warn!(operation, args = %args, "Accounting refused");
            return Err(NetconfError::accounting_failed(operation, args));
        }
        info!(operation, args = %args, "Accounting passed");
        Ok(())
    }
}

/// Accounting arguments: every path followed by `", "`.
pub fn accounting_args(requests: &[GetRequest]) -> String {
    requests.iter().fold(String::new(), |mut args, request| {
        args.push_str(&request.path);
        args.push_str(", ");
        args
    })
}
