//! Fixed-policy authenticator

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::provider::Authenticator;

/// A call made to a [`StaticAuthenticator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCall {
    Authorize { operation: String, path: String },
    Account { operation: String, args: String },
}

/// Authenticator with a fixed answer for every check
///
/// Paths on the deny list fail authorization even when everything else is
/// allowed. Every authorize and account call is recorded.
#[derive(Debug)]
pub struct StaticAuthenticator {
    authenticated: bool,
    authorize_all: bool,
    account_result: bool,
    denied_paths: HashSet<String>,
    calls: Mutex<Vec<AuthCall>>,
}

impl Default for StaticAuthenticator {
    fn default() -> Self {
        Self::allow_all()
    }
}

impl StaticAuthenticator {
    /// Accept every principal, path and accounting record.
    pub fn allow_all() -> Self {
        Self {
            authenticated: true,
            authorize_all: true,
            account_result: true,
            denied_paths: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reject every principal, path and accounting record.
    pub fn deny_all() -> Self {
        Self { authenticated: false, authorize_all: false, account_result: false, ..Self::allow_all() }
    }

    /// Refuse authorization for `path`.
    pub fn deny_path(mut self, path: impl Into<String>) -> Self {
        self.denied_paths.insert(path.into());
        self
    }

    /// Set the answer returned by [`Authenticator::account`].
    pub fn with_accounting(mut self, result: bool) -> Self {
        self.account_result = result;
        self
    }

    /// Calls recorded so far, in order.
    pub fn calls(&self) -> Vec<AuthCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, call: AuthCall) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(call);
    }
}

#[async_trait::async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self) -> bool {
        self.authenticated
    }

    async fn authorize(&self, operation: &str, path: &str) -> bool {
        self.record(AuthCall::Authorize { operation: operation.to_string(), path: path.to_string() });
        let allowed = self.authorize_all && !self.denied_paths.contains(path);
        debug!(operation, path, allowed, "Static authorization");
        allowed
    }

    async fn account(&self, operation: &str, args: &str) -> bool {
        self.record(AuthCall::Account { operation: operation.to_string(), args: args.to_string() });
        self.account_result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deny_list_overrides_allow_all() {
        let auth = StaticAuthenticator::allow_all().deny_path("/secret:secret");

        assert!(auth.authenticate().await);
        assert!(auth.authorize("get", "/open:open").await);
        assert!(!auth.authorize("get", "/secret:secret").await);
        assert!(auth.account("get", "/open:open, ").await);

        assert_eq!(auth.calls(), vec![
            AuthCall::Authorize { operation: "get".into(), path: "/open:open".into() },
            AuthCall::Authorize { operation: "get".into(), path: "/secret:secret".into() },
            AuthCall::Account { operation: "get".into(), args: "/open:open, ".into() },
        ]);
    }

    #[tokio::test]
    async fn deny_all_refuses_everything() {
        let auth = StaticAuthenticator::deny_all();
        assert!(!auth.authenticate().await);
        assert!(!auth.authorize("get", "/a:a").await);
        assert!(!auth.account("get", "/a:a, ").await);
    }
}
