//! Shared server state
//!
//! One [`ServerContext`] is built at startup and shared by every session
//! through an `Arc`. It owns the collaborators, the read-only key map, the
//! lazily populated schema registry and the session id counter.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::provider::{Backend, SchemaSource};
use crate::schema::{KeyMap, SchemaRegistry};
use crate::{Result, ServerConfig};

/// State shared by all sessions of one server.
pub struct ServerContext {
    backend: Arc<dyn Backend>,
    schema_source: Arc<dyn SchemaSource>,
    key_map: KeyMap,
    config: ServerConfig,
    registry: OnceCell<SchemaRegistry>,
    next_session_id: AtomicU64,
}

impl std::fmt::Debug for ServerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerContext")
            .field("key_map_entries", &self.key_map.len())
            .field("config", &self.config)
            .field("registry_ready", &self.registry.initialized())
            .field("next_session_id", &self.next_session_id)
            .finish_non_exhaustive()
    }
}

impl ServerContext {
    pub fn new(
        backend: Arc<dyn Backend>,
        schema_source: Arc<dyn SchemaSource>,
        key_map: KeyMap,
        config: ServerConfig,
    ) -> Self {
        Self {
            backend,
            schema_source,
            key_map,
            config,
            registry: OnceCell::new(),
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Build a context, loading the key map named by the configuration.
    pub fn from_config(
        config: ServerConfig,
        backend: Arc<dyn Backend>,
        schema_source: Arc<dyn SchemaSource>,
    ) -> anyhow::Result<Self> {
        let key_map = match &config.key_map {
            Some(path) => KeyMap::load(path)?,
            None => {
                info!("No key map configured, list predicates will not be generated");
                KeyMap::default()
            }
        };
        Ok(Self::new(backend, schema_source, key_map, config))
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn schema_source(&self) -> &dyn SchemaSource {
        self.schema_source.as_ref()
    }

    pub fn key_map(&self) -> &KeyMap {
        &self.key_map
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The schema registry, populating it on first use.
    ///
    /// Concurrent callers wait for a single population. A failed population
    /// is not cached; the next call tries again.
    pub async fn registry(&self) -> Result<&SchemaRegistry> {
        let result = self
            .registry
            .get_or_try_init(|| async {
                let modules = self.schema_source.modules().await?;
                Ok(SchemaRegistry::from_module_set(&modules, &self.config))
            })
            .await;

        if let Err(e) = &result {
            warn!("Schema registry population failed, will retry on next use: {}", e);
        }
        result
    }

    /// Allocate the next session id. Ids start at 1.
    pub fn next_session_id(&self) -> u64 {
        self.next_session_id.fetch_add(1, Ordering::Relaxed)
    }
}
