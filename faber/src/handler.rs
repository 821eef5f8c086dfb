// File: faber/src/handler.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use harness::output::log_msg;
use harness::{AdminClient, WebhookHandler};
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::scenario;

pub const PREFIX: &str = "Faber";

/// Issuer-side reactions to the agent's webhooks
pub struct FaberHandler {
    admin: AdminClient,
    connection_id: Mutex<Option<String>>,
    connection_active: watch::Sender<bool>,
    cred_state: Mutex<HashMap<String, String>>,
}

impl FaberHandler {
    pub fn new(admin: AdminClient) -> Self {
        let (connection_active, _) = watch::channel(false);
        Self {
            admin,
            connection_id: Mutex::new(None),
            connection_active,
            cred_state: Mutex::new(HashMap::new()),
        }
    }

    /// Connection whose state changes we are waiting on
    pub async fn set_connection_id(&self, connection_id: &str) {
        *self.connection_id.lock().await = Some(connection_id.to_string());
    }

    pub async fn connection_id(&self) -> Option<String> {
        self.connection_id.lock().await.clone()
    }

    pub fn connection_active(&self) -> bool {
        *self.connection_active.borrow()
    }

    /// Resolves once the tracked connection reports `active`
    pub async fn detect_connection(&self) -> Result<()> {
        let mut rx = self.connection_active.subscribe();
        loop {
            let active = *rx.borrow_and_update();
            if active {
                return Ok(());
            }
            rx.changed()
                .await
                .map_err(|_| anyhow!("Connection watcher closed"))?;
        }
    }

    fn log(&self, msg: &str) {
        log_msg(Some(PREFIX), msg);
    }
}

fn field<'a>(payload: &'a Value, name: &str) -> Result<&'a str> {
    payload
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Webhook payload missing '{}'", name))
}

#[async_trait]
impl WebhookHandler for FaberHandler {
    async fn handle_connections(&self, payload: Value) -> Result<()> {
        let tracked = self.connection_id.lock().await.clone();
        let incoming = payload.get("connection_id").and_then(Value::as_str);
        match (tracked.as_deref(), incoming) {
            (Some(tracked), Some(incoming)) if tracked == incoming => {}
            _ => {
                debug!("Ignoring state change of untracked connection");
                return Ok(());
            }
        }

        if field(&payload, "state")? == "active" && !self.connection_active() {
            self.log("Connected");
            self.connection_active.send_replace(true);
        }
        Ok(())
    }

    async fn handle_credentials(&self, payload: Value) -> Result<()> {
        let state = field(&payload, "state")?;
        let exchange_id = field(&payload, "credential_exchange_id")?;

        {
            let mut states = self.cred_state.lock().await;
            if states.get(exchange_id).map(String::as_str) == Some(state) {
                return Ok(());
            }
            states.insert(exchange_id.to_string(), state.to_string());
        }

        self.log(&format!(
            "Credential: state = {}, credential_exchange_id = {}",
            state, exchange_id
        ));

        if state == "request_received" {
            self.log("#17 Issue credential to X");
            let body = json!({ "credential_values": scenario::credential_values() });
            self.admin
                .post(
                    &format!("/credential_exchange/{}/issue", exchange_id),
                    Some(&body),
                )
                .await?;
        }
        Ok(())
    }

    async fn handle_presentations(&self, payload: Value) -> Result<()> {
        let state = field(&payload, "state")?;
        let exchange_id = field(&payload, "presentation_exchange_id")?;

        self.log(&format!(
            "Presentation: state = {}, presentation_exchange_id = {}",
            state, exchange_id
        ));

        if state == "presentation_received" {
            self.log("#27 Process the proof provided by X");
            self.log("#28 Check if proof is valid");
            let proof = self
                .admin
                .post(
                    &format!(
                        "/presentation_exchange/{}/verify_presentation",
                        exchange_id
                    ),
                    None,
                )
                .await?
                .ok_or_else(|| anyhow!("Empty verification response"))?;
            let verified = proof.get("verified").cloned().unwrap_or(Value::Null);
            self.log(&format!("Proof = {}", verified));
        }
        Ok(())
    }

    async fn handle_basicmessages(&self, payload: Value) -> Result<()> {
        self.log(&format!("Received message: {}", field(&payload, "content")?));
        Ok(())
    }
}
