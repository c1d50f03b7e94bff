//! `<get-schema>` handling (RFC 6022)

use roxmltree::Node;
use tracing::debug;

use crate::context::ServerContext;
use crate::resolver::find_descendant;
use crate::types::GetSchemaRequest;
use crate::xml::{NS_NETCONF_MONITORING, escape_for_reply};
use crate::{NetconfError, Result};

/// Read the `identifier`, `format` and `version` parameters.
pub fn parse_request(rpc: Node<'_, '_>) -> Result<GetSchemaRequest> {
    let parameter = |name: &str| {
        find_descendant(rpc, name)
            .and_then(|node| node.text())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    };

    let identifier = parameter("identifier").ok_or(NetconfError::MissingIdentifier)?;
    Ok(GetSchemaRequest { identifier, format: parameter("format"), version: parameter("version") })
}

/// Look up a schema and return its text as a `<data>` payload.
///
/// An unknown schema yields an empty `<data>` element.
pub async fn handle(context: &ServerContext, rpc: Node<'_, '_>) -> Result<String> {
    let request = parse_request(rpc)?;
    let registry = context.registry().await.map_err(|e| {
        NetconfError::backend_with_source(&request.identifier, "schema registry unavailable", Box::new(e))
    })?;

    let text = match registry.find_schema(&request) {
        Some(descriptor) => {
            debug!(identifier = %descriptor.identifier, path = %descriptor.model_path, "Reading schema");
            context.schema_source().read_schema(&descriptor.model_path).await.map_err(|e| {
                NetconfError::backend_with_source(&descriptor.model_path, "schema read failed", Box::new(e))
            })?
        }
        None => {
            debug!(identifier = %request.identifier, "No matching schema");
            String::new()
        }
    };

    Ok(schema_data(&text))
}

/// Wrap schema text in a monitoring `<data>` element escaped for the reply.
pub fn schema_data(text: &str) -> String {
    format!("<data xmlns=\"{}\">{}</data>", NS_NETCONF_MONITORING, escape_for_reply(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::create_response;
    use crate::test_utils::{VLAN_YANG, sample_context};
    use crate::xml::escape;

    async fn get_schema(request: &str) -> Result<String> {
        let context = sample_context();
        let doc = roxmltree::Document::parse(request).unwrap();
        handle(&context, doc.root_element()).await
    }

    #[test]
    fn parameters_are_optional_except_identifier() {
        let doc = roxmltree::Document::parse(
            r#"<rpc message-id="1"><get-schema xmlns="urn:ietf:params:xml:ns:yang:ietf-netconf-monitoring">
                 <identifier>sonic-vlan</identifier><format>yang</format>
               </get-schema></rpc>"#,
        )
        .unwrap();
        let request = parse_request(doc.root_element()).unwrap();
        assert_eq!(request.identifier, "sonic-vlan");
        assert_eq!(request.format.as_deref(), Some("yang"));
        assert_eq!(request.version, None);

        let doc = roxmltree::Document::parse("<rpc><get-schema><identifier/></get-schema></rpc>").unwrap();
        let error = parse_request(doc.root_element()).unwrap_err();
        assert_eq!(error.client_message(), "Identifier not passed");
    }

    #[tokio::test]
    async fn schema_text_survives_the_reply_builder() {
        let data = get_schema(
            "<rpc message-id=\"1\"><get-schema><identifier>SONIC-VLAN</identifier><version>2021-04-22</version></get-schema></rpc>",
        )
        .await
        .unwrap();

        let reply = create_response("1", &data);
        assert!(reply.contains(&format!(
            "<data xmlns=\"urn:ietf:params:xml:ns:yang:ietf-netconf-monitoring\">{}</data>",
            escape(VLAN_YANG)
        )));
    }

    #[tokio::test]
    async fn unknown_schema_is_empty_data() {
        let data = get_schema("<rpc message-id=\"1\"><get-schema><identifier>acme</identifier></get-schema></rpc>")
            .await
            .unwrap();
        assert_eq!(data, "<data xmlns=\"urn:ietf:params:xml:ns:yang:ietf-netconf-monitoring\"></data>");
    }

    #[tokio::test]
    async fn unreadable_schema_is_an_error() {
        // sonic-port is registered but its text was never stored
        let error = get_schema(
            "<rpc message-id=\"1\"><get-schema><identifier>sonic-port</identifier></get-schema></rpc>",
        )
        .await
        .unwrap_err();
        assert_eq!(error.client_message(), "Failed to handle request");
    }
}
