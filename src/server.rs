//! Server handle
//!
//! [`NetconfServer`] owns the shared [`ServerContext`] and a shutdown token.
//! Transports accepted by the embedding application (an SSH subsystem channel
//! in production) are handed to [`NetconfServer::spawn`], each with the
//! authenticator for the principal that opened it.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::Result;
use crate::config::ServerConfig;
use crate::context::ServerContext;
use crate::provider::{Authenticator, Backend, SchemaSource};
use crate::session::serve_session;

/// Running NETCONF server
pub struct NetconfServer {
    context: Arc<ServerContext>,
    shutdown: CancellationToken,
}

impl NetconfServer {
    pub fn new(context: ServerContext) -> Self {
        Self { context: Arc::new(context), shutdown: CancellationToken::new() }
    }

    /// Build a server from configuration, loading the key map it names.
    pub fn from_config(
        config: ServerConfig,
        backend: Arc<dyn Backend>,
        schema_source: Arc<dyn SchemaSource>,
    ) -> anyhow::Result<Self> {
        let context = ServerContext::from_config(config, backend, schema_source)?;
        info!(key_map_entries = context.key_map().len(), "NETCONF server ready");
        Ok(Self::new(context))
    }

    pub fn context(&self) -> &Arc<ServerContext> {
        &self.context
    }

    /// Serve one transport on the current task.
    pub async fn serve<T>(&self, transport: T, authenticator: Arc<dyn Authenticator>) -> Result<()>
    where
        T: AsyncRead + AsyncWrite + Unpin + Send,
    {
        serve_session(transport, Arc::clone(&self.context), authenticator, &self.shutdown).await
    }

    /// Serve one transport on its own task.
    pub fn spawn<T>(
        &self,
        transport: T,
        authenticator: Arc<dyn Authenticator>,
    ) -> JoinHandle<Result<()>>
    where
        T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let context = Arc::clone(&self.context);
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move { serve_session(transport, context, authenticator, &shutdown).await })
    }

    /// Close every session served by this server.
    pub fn shutdown(&self) {
        info!("Shutting down NETCONF sessions");
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Drop for NetconfServer {
    fn drop(&mut self) {
        debug!("Dropping NETCONF server");
        self.shutdown.cancel();
    }
}
