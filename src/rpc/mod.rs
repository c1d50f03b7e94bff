//! RPC dispatch
//!
//! Every framed message after the hello is an `<rpc>` envelope. The
//! [`Dispatcher`] parses it, routes the operation and always produces exactly
//! one `rpc-reply`: failures become `rpc-error` replies and panics raised while
//! handling a request are caught, so one bad request never ends the session.
//!
//! ```rust
//! use netconf_bridge::rpc::{create_error_response, create_response};
//!
//! assert_eq!(
//!     create_response("101", "ok"),
//!     "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
//!      <rpc-reply xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\" message-id=\"101\"><ok/></rpc-reply>"
//! );
//! assert!(create_error_response("101", "Unsupported command")
//!     .contains("<error-message xml:lang=\"en\">Unsupported command</error-message>"));
//! ```

pub mod get;
pub mod get_schema;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use quick_xml::escape::unescape;
use roxmltree::{Document, Node};
use tracing::{debug, trace};

use crate::context::ServerContext;
use crate::logging::{log_request_fault, log_rpc_error};
use crate::provider::Authenticator;
use crate::resolver::element_children;
use crate::types::Operation;
use crate::xml::{NS_NETCONF_BASE, escape, escape_for_reply};
use crate::{NetconfError, Result};

/// Prefix of every reply.
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>";

/// Message id used when none can be recovered from a request.
pub const FALLBACK_MESSAGE_ID: &str = "1";

/// Client-facing text for faults caught by the request barrier.
const FAULT_MESSAGE: &str = "Unable to handle request";

/// A serialized reply and whether the session should close after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcReply {
    pub xml: String,
    pub close_session: bool,
}

impl RpcReply {
    fn reply(xml: String) -> Self {
        Self { xml, close_session: false }
    }
}

/// A parsed `<rpc>` element.
#[derive(Debug)]
pub struct RpcEnvelope<'a, 'input> {
    /// Non-empty `message-id` attribute
    pub message_id: &'a str,
    /// Operation named by the first element child
    pub operation: Operation,
    /// The `<rpc>` element itself
    pub body: Node<'a, 'input>,
}

impl<'a, 'input> RpcEnvelope<'a, 'input> {
    /// Read the envelope of a parsed request.
    ///
    /// A root without element children carries an unnamed unsupported operation.
    pub fn parse(doc: &'a Document<'input>) -> Result<Self> {
        let body = doc.root_element();
        let message_id = body
            .attribute("message-id")
            .filter(|id| !id.is_empty())
            .ok_or(NetconfError::MissingMessageId)?;

        let operation = element_children(body)
            .next()
            .map(|node| Operation::from_name(node.tag_name().name()))
            .unwrap_or_else(|| Operation::Unsupported(String::new()));

        Ok(Self { message_id, operation, body })
    }
}

/// Routes requests of one session.
pub struct Dispatcher {
    context: Arc<ServerContext>,
    authenticator: Arc<dyn Authenticator>,
    session_id: u64,
}

impl Dispatcher {
    pub fn new(
        context: Arc<ServerContext>,
        authenticator: Arc<dyn Authenticator>,
        session_id: u64,
    ) -> Self {
        Self { context, authenticator, session_id }
    }

    /// Answer one request.
    pub async fn process(&self, request: &str) -> RpcReply {
        match AssertUnwindSafe(self.dispatch(request)).catch_unwind().await {
            Ok(reply) => reply,
            Err(panic) => {
                log_request_fault(self.session_id, request, &panic_details(panic.as_ref()));
                RpcReply::reply(create_error_response(&extract_message_id(request), FAULT_MESSAGE))
            }
        }
    }

    async fn dispatch(&self, request: &str) -> RpcReply {
        let doc = match Document::parse(request.trim_start()) {
            Ok(doc) => doc,
            Err(roxmltree::Error::NoRootNode) => {
                return self.error_reply(&extract_message_id(request), NetconfError::MissingRoot);
            }
            Err(e) => {
                return self.error_reply(&extract_message_id(request), NetconfError::malformed_xml(e));
            }
        };

        let envelope = match RpcEnvelope::parse(&doc) {
            Ok(envelope) => envelope,
            Err(error) => return self.error_reply(&extract_message_id(request), error),
        };
        let message_id = envelope.message_id;
        debug!(
            session_id = self.session_id,
            message_id,
            operation = envelope.operation.as_str(),
            "Dispatching"
        );

        let result: Result<RpcReply> = match envelope.operation {
            Operation::Get => get::handle(&self.context, self.authenticator.as_ref(), envelope.body)
                .await
                .map(|data| RpcReply::reply(create_response(message_id, &data))),
            Operation::GetSchema => get_schema::handle(&self.context, envelope.body)
                .await
                .map(|data| RpcReply::reply(create_response(message_id, &data))),
            Operation::CloseSession => {
                Ok(RpcReply { xml: create_response(message_id, "ok"), close_session: true })
            }
            Operation::Unsupported(name) => Err(NetconfError::unsupported(name)),
        };

        result.unwrap_or_else(|error| self.error_reply(message_id, error))
    }

    fn error_reply(&self, message_id: &str, error: NetconfError) -> RpcReply {
        log_rpc_error(self.session_id, message_id, &error);
        RpcReply::reply(create_error_response(message_id, &error.client_message()))
    }
}

fn panic_details(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Wrap a payload in an `rpc-reply`.
///
/// `"{}"` gives an empty reply and `"ok"` an `<ok/>` reply. Any other payload
/// is inserted verbatim with every `&amp;` turned back into `&`, so payload
/// text must be escaped with [`escape_for_reply`]. The message id is escaped
/// here.
pub fn create_response(message_id: &str, payload: &str) -> String {
    let body = match payload {
        "{}" => String::new(),
        "ok" => "<ok/>".to_string(),
        other => other.replace("&amp;", "&"),
    };
    let reply = format!(
        "{XML_DECLARATION}<rpc-reply xmlns=\"{}\" message-id=\"{}\">{}</rpc-reply>",
        NS_NETCONF_BASE,
        escape(message_id),
        body
    );
    trace!(message_id, bytes = reply.len(), "Reply built");
    reply
}

/// `rpc-error` payload carrying `message`.
pub fn error_xml(message: &str) -> String {
    format!(
        "<rpc-error><error-type>rpc</error-type><error-severity>error</error-severity>\
         <error-message xml:lang=\"en\">{}</error-message></rpc-error>",
        escape_for_reply(message)
    )
}

/// A complete error reply.
pub fn create_error_response(message_id: &str, message: &str) -> String {
    create_response(message_id, &error_xml(message))
}

/// Recover a message id from raw request text.
///
/// Finds the first `message-id="…"` whose value is non-empty and free of
/// whitespace and unescapes it; falls back to `"1"`.
pub fn extract_message_id(request: &str) -> String {
    const MARKER: &str = "message-id=\"";

    let mut rest = request;
    while let Some(start) = rest.find(MARKER) {
        rest = &rest[start + MARKER.len()..];
        let run_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let run = &rest[..run_end];
        if let Some(quote) = run.rfind('"').filter(|&quote| quote > 0) {
            let raw = &run[..quote];
            return unescape(raw).map_or_else(|_| raw.to_string(), |id| id.into_owned());
        }
    }
    FALLBACK_MESSAGE_ID.to_string()
}
