//! In-memory backend and schema source

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, trace};

use crate::provider::{Backend, SchemaSource};
use crate::types::ModuleSet;
use crate::{NetconfError, Result};

/// Backend answering from a path → JSON table
///
/// Paths with no entry read as `{}`, matching a store with nothing at the path.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
    failing: RwLock<HashSet<String>>,
    queries: RwLock<Vec<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_entry(self, path: impl Into<String>, json: impl Into<String>) -> Self {
        self.insert(path, json);
        self
    }

    /// Store `json` as the answer for `path`.
    pub fn insert(&self, path: impl Into<String>, json: impl Into<String>) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).insert(path.into(), json.into());
    }

    /// Make reads of `path` fail.
    pub fn fail_path(&self, path: impl Into<String>) {
        self.failing.write().unwrap_or_else(PoisonError::into_inner).insert(path.into());
    }

    /// Every path read so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait::async_trait]
impl Backend for MemoryBackend {
    async fn get(&self, path: &str) -> Result<String> {
        self.queries.write().unwrap_or_else(PoisonError::into_inner).push(path.to_string());

        if self.failing.read().unwrap_or_else(PoisonError::into_inner).contains(path) {
            debug!(path, "Injected backend failure");
            return Err(NetconfError::backend(path, "path marked as failing"));
        }

        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let json = entries.get(path).cloned().unwrap_or_else(|| "{}".to_string());
        trace!(path, bytes = json.len(), "Backend read");
        Ok(json)
    }
}

/// Schema source serving a fixed module set and YANG texts
#[derive(Debug, Default)]
pub struct MemorySchemaSource {
    modules: ModuleSet,
    texts: RwLock<HashMap<String, String>>,
    unavailable: AtomicBool,
    module_reads: AtomicUsize,
}

impl MemorySchemaSource {
    pub fn new(modules: ModuleSet) -> Self {
        Self { modules, ..Default::default() }
    }

    /// Builder-style [`insert_schema`](Self::insert_schema).
    pub fn with_schema(self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert_schema(path, text);
        self
    }

    /// Store the YANG text served for `path`.
    pub fn insert_schema(&self, path: impl Into<String>, text: impl Into<String>) {
        self.texts.write().unwrap_or_else(PoisonError::into_inner).insert(path.into(), text.into());
    }

    /// Make module enumeration fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of module enumerations attempted.
    pub fn module_reads(&self) -> usize {
        self.module_reads.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SchemaSource for MemorySchemaSource {
    async fn modules(&self) -> Result<ModuleSet> {
        self.module_reads.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(NetconfError::schema("module enumeration unavailable"));
        }
        Ok(self.modules.clone())
    }

    async fn read_schema(&self, path: &str) -> Result<String> {
        self.texts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| NetconfError::schema(format!("no schema stored at {}", path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_module_set;

    #[tokio::test]
    async fn unknown_paths_read_as_empty_objects() {
        let backend = MemoryBackend::new().with_entry("/a:a", r#"{"a:a":{"b":1}}"#);

        assert_eq!(backend.get("/a:a").await.unwrap(), r#"{"a:a":{"b":1}}"#);
        assert_eq!(backend.get("/c:c").await.unwrap(), "{}");
        assert_eq!(backend.queries(), vec!["/a:a", "/c:c"]);
    }

    #[tokio::test]
    async fn failing_paths_return_backend_errors() {
        let backend = MemoryBackend::new();
        backend.fail_path("/a:a");
        assert!(matches!(backend.get("/a:a").await, Err(NetconfError::Backend { .. })));
    }

    #[tokio::test]
    async fn schema_source_serves_stored_texts() {
        let source = MemorySchemaSource::new(sample_module_set())
            .with_schema("/usr/models/yang/sonic-vlan.yang", "module sonic-vlan {}");

        assert_eq!(
            source.read_schema("/usr/models/yang/sonic-vlan.yang").await.unwrap(),
            "module sonic-vlan {}"
        );
        assert!(source.read_schema("/usr/models/yang/missing.yang").await.is_err());
        assert_eq!(source.modules().await.unwrap().modules.len(), 3);
        assert_eq!(source.module_reads(), 1);
    }
}
