//! `<get>` handling

use roxmltree::Node;
use tracing::error;

use crate::assembler::assemble;
use crate::context::ServerContext;
use crate::gate::AuthorizationGate;
use crate::provider::Authenticator;
use crate::resolver::resolve_filter;
use crate::{NetconfError, Result};

const OPERATION: &str = "get";

/// Resolve, authorize, read and assemble a `<get>` into a `<data>` payload.
pub async fn handle(
    context: &ServerContext,
    authenticator: &dyn Authenticator,
    rpc: Node<'_, '_>,
) -> Result<String> {
    let requests = resolve_filter(rpc, context.key_map())?;

    let gate = AuthorizationGate::new(authenticator);
    gate.authorize_all(OPERATION, &requests).await?;

    let mut data = String::from("<data>");
    for request in &requests {
        let fragment = assemble(context, request).await.map_err(|e| {
            error!(path = %request.path, error = %e, "Failed to assemble response");
            as_backend_failure(&request.path, e)
        })?;
        data.push_str(&fragment);
    }

    gate.account(OPERATION, &requests).await?;

    data.push_str("</data>");
    Ok(data)
}

fn as_backend_failure(path: &str, error: NetconfError) -> NetconfError {
    match error {
        NetconfError::Backend { .. } | NetconfError::BackendPayload { .. } => error,
        other => NetconfError::backend_with_source(path, "response assembly failed", Box::new(other)),
    }
}
