//! Session loop
//!
//! One [`Session`] serves one transport connection:
//! 1. write the server `hello` (end-of-message framed)
//! 2. read and check the client `hello`
//! 3. answer requests one at a time with chunk-framed replies
//!
//! A `close-session` request schedules the close after the configured delay;
//! the loop watches a cancellation token alongside the next read, the same
//! token a server shutdown cancels.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::capability::{server_hello, validate_client_hello};
use crate::codec::{FrameCodec, OutboundMessage};
use crate::context::ServerContext;
use crate::provider::Authenticator;
use crate::rpc::{Dispatcher, FALLBACK_MESSAGE_ID, create_error_response};
use crate::{NetconfError, Result};

/// A NETCONF session over one transport.
pub struct Session<T> {
    id: u64,
    framed: Framed<T, FrameCodec>,
    context: Arc<ServerContext>,
    authenticator: Arc<dyn Authenticator>,
    close: CancellationToken,
}

impl<T> Session<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Create a session and allocate its id.
    pub fn new(
        transport: T,
        context: Arc<ServerContext>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        let id = context.next_session_id();
        Self {
            id,
            framed: Framed::new(transport, FrameCodec::new()),
            context,
            authenticator,
            close: CancellationToken::new(),
        }
    }

    /// Close this session when `shutdown` is cancelled.
    pub fn with_shutdown(mut self, shutdown: &CancellationToken) -> Self {
        self.close = shutdown.child_token();
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Token that ends the session when cancelled.
    pub fn close_token(&self) -> CancellationToken {
        self.close.clone()
    }

    /// Serve the session until the client leaves or the session is closed.
    ///
    /// Errors are transport failures and a rejected client hello; request
    /// failures are answered in-band and never end the session.
    pub async fn run(mut self) -> Result<()> {
        info!(session_id = self.id, "Session opened");

        let result = self.serve().await;
        match &result {
            Ok(()) => info!(session_id = self.id, "Session closed"),
            Err(e) => warn!(session_id = self.id, "Session ended with error: {}", e),
        }

        if let Err(e) = SinkExt::<OutboundMessage>::close(&mut self.framed).await {
            debug!(session_id = self.id, "Transport shutdown failed: {}", e);
        }
        result
    }

    async fn serve(&mut self) -> Result<()> {
        if !self.exchange_hello().await? {
            return Ok(());
        }

        let dispatcher =
            Dispatcher::new(Arc::clone(&self.context), Arc::clone(&self.authenticator), self.id);
        let close_delay = self.context.config().close_delay();
        let mut requests = 0u64;

        loop {
            let frame = tokio::select! {
                _ = self.close.cancelled() => {
                    info!(session_id = self.id, "Session close requested");
                    break;
                }
                frame = self.framed.next() => frame,
            };

            match frame {
                Some(Ok(request)) => {
                    requests += 1;
                    trace!(session_id = self.id, bytes = request.len(), "Request received");

                    let reply = dispatcher.process(&request).await;
                    self.framed.send(OutboundMessage::chunked(reply.xml)).await?;

                    if reply.close_session {
                        self.schedule_close(close_delay);
                    }
                }
                Some(Err(e)) => {
                    error!(session_id = self.id, "Failed to read request: {}", e);
                    return Err(e);
                }
                None => {
                    debug!(session_id = self.id, requests, "Client closed the transport");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Returns `Ok(false)` when the client left before sending its hello.
    async fn exchange_hello(&mut self) -> Result<bool> {
        let registry = match self.context.registry().await {
            Ok(registry) => Some(registry),
            Err(_) => {
                warn!(session_id = self.id, "Advertising static capabilities only");
                None
            }
        };
        let hello = server_hello(self.id, registry)?;
        self.framed.send(OutboundMessage::end_of_message(hello)).await?;

        let client_hello = match self.framed.next().await {
            Some(Ok(message)) => message,
            Some(Err(e)) => return Err(e),
            None => {
                info!(session_id = self.id, "Client left before sending hello");
                return Ok(false);
            }
        };

        if let Err(e) = validate_client_hello(&client_hello) {
            warn!(session_id = self.id, "Rejecting client hello: {}", e);
            let reply = create_error_response(FALLBACK_MESSAGE_ID, &e.client_message());
            self.framed.send(OutboundMessage::chunked(reply)).await?;
            return Err(e);
        }

        info!(session_id = self.id, "Capabilities exchanged");
        Ok(true)
    }

    fn schedule_close(&self, delay: Duration) {
        debug!(session_id = self.id, delay_ms = delay.as_millis() as u64, "Closing session after delay");
        let close = self.close.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            close.cancel();
        });
    }
}

/// Authenticate the principal, then run a session to completion.
///
/// The session also ends when `shutdown` is cancelled.
pub async fn serve_session<T>(
    transport: T,
    context: Arc<ServerContext>,
    authenticator: Arc<dyn Authenticator>,
    shutdown: &CancellationToken,
) -> Result<()>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    if !authenticator.authenticate().await {
        warn!("Principal failed authentication, refusing session");
        return Err(NetconfError::unauthorized("session"));
    }
    Session::new(transport, context, authenticator).with_shutdown(shutdown).run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::chunked_frame;
    use crate::providers::auth::StaticAuthenticator;
    use crate::test_utils::sample_context;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

    const CLIENT_HELLO: &str = "<hello xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\">\
        <capabilities><capability>urn:ietf:params:netconf:base:1.1</capability></capabilities></hello>]]>]]>";

    async fn read_all(mut client: tokio::io::DuplexStream) -> String {
        let mut out = String::new();
        client.read_to_string(&mut out).await.unwrap();
        out
    }

    #[tokio::test(start_paused = true)]
    async fn hello_then_close_session() {
        let (mut client, server) = duplex(64 * 1024);
        let context = Arc::new(sample_context());
        let session = Session::new(server, context, Arc::new(StaticAuthenticator::allow_all()));
        assert_eq!(session.id(), 1);
        let task = tokio::spawn(session.run());

        client.write_all(CLIENT_HELLO.as_bytes()).await.unwrap();
        client
            .write_all(chunked_frame(r#"<rpc message-id="101"><close-session/></rpc>"#).as_bytes())
            .await
            .unwrap();

        task.await.unwrap().unwrap();
        let output = read_all(client).await;

        let (hello, rest) = output.split_once("]]>]]>").unwrap();
        assert!(hello.contains("<session-id>1</session-id>"));
        assert!(rest.starts_with("\n#"));
        assert!(rest.contains("message-id=\"101\"><ok/></rpc-reply>\n##\n"));
    }

    #[tokio::test]
    async fn invalid_client_hello_ends_the_session() {
        let (mut client, server) = duplex(64 * 1024);
        let session =
            Session::new(server, Arc::new(sample_context()), Arc::new(StaticAuthenticator::allow_all()));
        let task = tokio::spawn(session.run());

        client.write_all(b"<rpc message-id=\"4\"><get/></rpc>]]>]]>").await.unwrap();

        let error = task.await.unwrap().unwrap_err();
        assert!(matches!(error, NetconfError::InvalidHello { .. }));

        let output = read_all(client).await;
        assert!(output.contains("message-id=\"1\"><rpc-error>"));
    }

    #[tokio::test]
    async fn client_leaving_before_hello_is_clean() {
        let (mut client, server) = duplex(64 * 1024);
        let session =
            Session::new(server, Arc::new(sample_context()), Arc::new(StaticAuthenticator::allow_all()));
        let task = tokio::spawn(session.run());

        client.shutdown().await.unwrap();

        task.await.unwrap().unwrap();
        assert!(read_all(client).await.ends_with("</hello>]]>]]>"));
    }

    #[tokio::test]
    async fn shutdown_token_ends_idle_sessions() {
        let (mut client, server) = duplex(64 * 1024);
        let shutdown = CancellationToken::new();
        let session =
            Session::new(server, Arc::new(sample_context()), Arc::new(StaticAuthenticator::allow_all()))
                .with_shutdown(&shutdown);
        let task = tokio::spawn(session.run());

        client.write_all(CLIENT_HELLO.as_bytes()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.cancel();

        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn unauthenticated_principals_are_refused() {
        let (_client, server) = duplex(1024);
        let result = serve_session(
            server,
            Arc::new(sample_context()),
            Arc::new(StaticAuthenticator::deny_all()),
            &CancellationToken::new(),
        )
        .await;
        assert!(matches!(result, Err(NetconfError::Unauthorized { .. })));
    }
}
