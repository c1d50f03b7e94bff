//! Response assembly for `get`
//!
//! Turns one [`GetRequest`] into an XML fragment. Monitoring paths are
//! answered from the schema registry; everything else is read from the
//! backend, reshaped by [`transform`] and written out by [`render`].

pub mod render;
pub mod transform;

use tracing::{debug, warn};

use crate::context::ServerContext;
use crate::types::GetRequest;
use crate::Result;

const MODULES_STATE_PATH: &str = "/modules-state:modules-state";
const NETCONF_STATE_PATH: &str = "/netconf-state:netconf-state";
const OPERATION_PATH: &str = "/operation:operation";

/// Paths answered without consulting the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalPath {
    /// YANG library module listing
    ModulesState,
    /// Schema listing under `netconf-state`
    Schemas,
    /// Always empty
    Operation,
}

impl LocalPath {
    pub fn classify(path: &str) -> Option<Self> {
        if addresses(path, MODULES_STATE_PATH) {
            Some(LocalPath::ModulesState)
        } else if addresses(path, NETCONF_STATE_PATH) {
            Some(LocalPath::Schemas)
        } else if addresses(path, OPERATION_PATH) {
            Some(LocalPath::Operation)
        } else {
            None
        }
    }
}

fn addresses(path: &str, model: &str) -> bool {
    path.strip_prefix(model)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('['))
}

/// Build the reply fragment for one request.
pub async fn assemble(context: &ServerContext, request: &GetRequest) -> Result<String> {
    match LocalPath::classify(&request.path) {
        Some(LocalPath::ModulesState) => context.registry().await?.modules_state_xml(),
        Some(LocalPath::Schemas) => {
            let registry = context.registry().await?;
            registry.schemas_xml(&request.predicates(), &request.filters)
        }
        Some(LocalPath::Operation) => Ok(String::new()),
        None => {
            let json = context.backend().get(&request.path).await?;
            debug!(path = %request.path, bytes = json.len(), "Backend answered");

            let Some(payload) = transform::normalize(request, &json)? else {
                return Ok(String::new());
            };

            let registry = context.registry().await.ok();
            let namespace = registry.and_then(|r| r.namespace_of(&payload.module));
            if namespace.is_none() {
                warn!(module = %payload.module, "No namespace registered for module, omitting xmlns");
            }

            render::render(&payload, context.key_map(), namespace)
        }
    }
}
