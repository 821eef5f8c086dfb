// File: harness/src/webhooks.rs
//! Webhook receiver for agent callbacks
//!
//! The agent posts state changes to `/webhooks/topic/{topic}/`. Each topic is
//! routed to the matching method of a [`WebhookHandler`]; the agent always
//! gets an empty 200 back, whatever the handler does with the payload.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Router,
};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Topic the agent uses for its own webhook bookkeeping; never dispatched
pub const RESERVED_TOPIC: &str = "webhook";

/// Per-topic callbacks; every topic defaults to ignoring the payload
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    async fn handle_connections(&self, _payload: Value) -> Result<()> {
        Ok(())
    }

    async fn handle_credentials(&self, _payload: Value) -> Result<()> {
        Ok(())
    }

    async fn handle_presentations(&self, _payload: Value) -> Result<()> {
        Ok(())
    }

    async fn handle_basicmessages(&self, _payload: Value) -> Result<()> {
        Ok(())
    }

    /// Any topic without a dedicated method
    async fn handle_other(&self, _topic: &str, _payload: Value) -> Result<()> {
        Ok(())
    }
}

/// Handler that ignores every topic
pub struct NoopWebhookHandler;

#[async_trait]
impl WebhookHandler for NoopWebhookHandler {}

/// Route one webhook to the handler method named after its topic
pub async fn dispatch(handler: &dyn WebhookHandler, topic: &str, payload: Value) -> Result<()> {
    match topic {
        RESERVED_TOPIC => Ok(()),
        "connections" => handler.handle_connections(payload).await,
        "credentials" => handler.handle_credentials(payload).await,
        "presentations" => handler.handle_presentations(payload).await,
        "basicmessages" => handler.handle_basicmessages(payload).await,
        other => handler.handle_other(other, payload).await,
    }
}

#[derive(Clone)]
struct WebhookState {
    handler: Arc<dyn WebhookHandler>,
}

/// Router serving `POST /webhooks/topic/{topic}/`
pub fn webhook_router(handler: Arc<dyn WebhookHandler>) -> Router {
    Router::new()
        .route("/webhooks/topic/{topic}/", post(receive_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(WebhookState { handler })
}

async fn receive_webhook(
    State(state): State<WebhookState>,
    Path(topic): Path<String>,
    body: Bytes,
) -> StatusCode {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Discarding webhook '{}' with invalid JSON: {}", topic, e);
            return StatusCode::OK;
        }
    };

    debug!("Webhook received: {}", topic);

    if let Err(e) = dispatch(state.handler.as_ref(), &topic, payload).await {
        warn!("Webhook handler for '{}' failed: {}", topic, e);
    }

    StatusCode::OK
}

/// Running webhook listener
pub struct WebhookServer {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl WebhookServer {
    /// Bind `{host}:{port}` and serve webhooks in the background
    pub async fn start(host: &str, port: u16, handler: Arc<dyn WebhookHandler>) -> Result<Self> {
        let addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| anyhow!("Failed to bind webhook listener on {}: {}", addr, e))?;
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = webhook_router(handler);

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!("Webhook listener running on http://{}", local_addr);

        Ok(Self {
            local_addr,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting webhooks and wait for the listener to close
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| anyhow!("Webhook listener task failed: {}", e))?
                .map_err(|e| anyhow!("Webhook listener error: {}", e))?;
            debug!("Webhook listener on {} stopped", self.local_addr);
        }
        Ok(())
    }
}
