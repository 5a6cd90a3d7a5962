//! Test utilities for messenger-client
//!
//! Provides a local stand-in for the Graph API so send operations can be
//! exercised end-to-end without network access.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Json;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::{ClientConfig, MessengerClient, Result};

/// Access token handed to clients created by [`TestServer`]
pub const TEST_ACCESS_TOKEN: &str = "test-page-token";

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: MessengerClient,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Create a new test server from an axum Router
    ///
    /// # Example
    ///
    /// ```ignore
    /// use messenger_client::testing::{MockGraphApi, TestServer};
    ///
    /// let mock = MockGraphApi::new();
    /// let server = TestServer::start(mock.router()).await?;
    ///
    /// server.client.send_text("USER1", "hello", None).await?;
    /// assert_eq!(mock.requests().await.len(), 1);
    /// ```
    pub async fn start<S>(router: axum::Router<S>) -> anyhow::Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
    {
        Self::start_with_timeout(router, Duration::from_secs(5), Duration::from_secs(2)).await
    }

    /// Create a new test server with custom client timeouts
    pub async fn start_with_timeout<S>(
        router: axum::Router<S>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> anyhow::Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
    {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let router: axum::Router = router.into();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        let config = ClientConfig::builder(TEST_ACCESS_TOKEN)
            .graph_url(format!("http://{}", addr))
            .timeout_ms(timeout.as_millis() as u64)
            .connect_timeout_ms(connect_timeout.as_millis() as u64)
            .build();
        let client = MessengerClient::from_config(config)?;

        Ok(Self {
            addr,
            client,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get a reference to the client
    pub fn client(&self) -> &MessengerClient {
        &self.client
    }

    /// Build another client against this server with a different token
    pub fn client_with_token(&self, access_token: &str) -> Result<MessengerClient> {
        MessengerClient::from_config(
            ClientConfig::builder(access_token)
                .graph_url(self.base_url())
                .timeout_ms(5_000)
                .build(),
        )
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal if not already done
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        // Abort the task if still running
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// A request captured by [`MockGraphApi`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    /// Parsed JSON body, or `Value::Null` if the body was not JSON
    pub body: Value,
}

/// Canned reply for the mock endpoint
#[derive(Debug, Clone)]
enum MockReply {
    /// `{"recipient_id": <recipient.id>, "message_id": "mid.<n>"}`
    Echo,
    Fixed { status: StatusCode, body: Value },
    Raw { status: StatusCode, body: String },
}

struct MockState {
    reply: MockReply,
    delay: Option<Duration>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// In-process stand-in for `POST /v{version}/me/messages`
///
/// Records every request and answers with a configured reply.
#[derive(Clone)]
pub struct MockGraphApi {
    state: Arc<MockState>,
}

impl Default for MockGraphApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGraphApi {
    /// Mock that accepts every message and echoes the recipient
    pub fn new() -> Self {
        Self::with_reply(MockReply::Echo, None)
    }

    /// Mock that always answers with `status` and a JSON body
    pub fn respond_with(status: u16, body: Value) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::with_reply(MockReply::Fixed { status, body }, None)
    }

    /// Mock that always answers with `status` and a non-JSON body
    pub fn respond_with_text(status: u16, body: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::with_reply(
            MockReply::Raw {
                status,
                body: body.into(),
            },
            None,
        )
    }

    /// Hold every reply for `delay` before answering
    pub fn with_delay(self, delay: Duration) -> Self {
        let reply = self.state.reply.clone();
        Self::with_reply(reply, Some(delay))
    }

    fn with_reply(reply: MockReply, delay: Option<Duration>) -> Self {
        Self {
            state: Arc::new(MockState {
                reply,
                delay,
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Router serving the mock on every POST path
    pub fn router(&self) -> axum::Router {
        axum::Router::new()
            .route("/{*path}", post(handle_post))
            .with_state(self.clone())
    }

    /// All requests received so far, in arrival order
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().await.clone()
    }

    /// Body of the most recent request
    pub async fn last_body(&self) -> Option<Value> {
        self.state
            .requests
            .lock()
            .await
            .last()
            .map(|r| r.body.clone())
    }
}

async fn handle_post(
    State(mock): State<MockGraphApi>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let recipient_id = body
        .pointer("/recipient/id")
        .cloned()
        .unwrap_or(Value::Null);

    let count = {
        let mut requests = mock.state.requests.lock().await;
        requests.push(RecordedRequest {
            path: uri.path().to_string(),
            authorization: header_str(header::AUTHORIZATION),
            content_type: header_str(header::CONTENT_TYPE),
            body,
        });
        requests.len()
    };

    if let Some(delay) = mock.state.delay {
        tokio::time::sleep(delay).await;
    }

    match &mock.state.reply {
        MockReply::Echo => (
            StatusCode::OK,
            Json(json!({
                "recipient_id": recipient_id,
                "message_id": format!("mid.{}", count),
            })),
        )
            .into_response(),
        MockReply::Fixed { status, body } => (*status, Json(body.clone())).into_response(),
        MockReply::Raw { status, body } => (*status, body.clone()).into_response(),
    }
}
