//! Realtime client for the Home Assistant WebSocket API.
//!
//! A spawned tokio task owns the socket, the heartbeat and the pending
//! command table; reconnection with exponential backoff happens inside
//! the task. The UI holds a cheap [`HaClient`] handle and receives
//! normalized events over the app channel.

pub mod backoff;
mod connection;
mod pending;

pub use backoff::ReconnectPolicy;

use std::sync::mpsc::Sender;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use lightmapper_types::EntityId;

use crate::api::ApiClient;
use crate::state::AppMessage;

/// Realtime client errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HaError {
    #[error("not connected")]
    NotConnected,
    #[error("command timed out")]
    Timeout,
    #[error("connection lost")]
    ConnectionLost,
    #[error("authentication rejected: {0}")]
    AuthRejected(String),
    #[error("service call failed: {code}: {message}")]
    Service { code: String, message: String },
    #[error("transport error: {0}")]
    Transport(String),
}

/// Connection parameters for the realtime client.
#[derive(Debug, Clone)]
pub struct HaConfig {
    /// WebSocket endpoint, e.g. `ws://homeassistant.local:8123/api/websocket`.
    pub url: String,
    /// Ping interval; also drives the pending-command expiry sweep.
    pub heartbeat: Duration,
    /// Deadline for an individual command's `result` frame.
    pub request_timeout: Duration,
    pub policy: ReconnectPolicy,
}

impl HaConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            heartbeat: Duration::from_secs(20),
            request_timeout: Duration::from_secs(10),
            policy: ReconnectPolicy::default(),
        }
    }
}

/// An outbound command routed into the connection task.
pub(crate) enum HaCommand {
    CallService {
        domain: String,
        service: String,
        service_data: Option<Value>,
        entity_id: EntityId,
        respond_to: oneshot::Sender<Result<Option<Value>, HaError>>,
    },
}

/// Handle to the realtime connection task.
#[derive(Clone)]
pub struct HaClient {
    cmd_tx: mpsc::Sender<HaCommand>,
    request_timeout: Duration,
}

impl HaClient {
    /// Spawn the connection task and return a handle to it.
    ///
    /// The task fetches a fresh credential from `api` for every
    /// connection attempt, reports state transitions and normalized
    /// light events through `tx`, and requests repaints via `ctx`.
    pub fn connect(
        config: HaConfig,
        api: ApiClient,
        tx: Sender<AppMessage>,
        ctx: egui::Context,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let request_timeout = config.request_timeout;
        tokio::spawn(connection::run(config, api, cmd_rx, tx, ctx));
        Self {
            cmd_tx,
            request_timeout,
        }
    }

    /// Call a Home Assistant service against one entity and wait for
    /// the correlated result.
    pub async fn call_service(
        &self,
        domain: impl Into<String>,
        service: impl Into<String>,
        service_data: Option<Value>,
        entity_id: impl Into<EntityId>,
    ) -> Result<Option<Value>, HaError> {
        let (respond_to, rx) = oneshot::channel();
        self.cmd_tx
            .send(HaCommand::CallService {
                domain: domain.into(),
                service: service.into(),
                service_data,
                entity_id: entity_id.into(),
                respond_to,
            })
            .await
            .map_err(|_| HaError::NotConnected)?;

        // Commands queued while the connection is down would otherwise
        // park the caller until the next successful session.
        match tokio::time::timeout(self.request_timeout + Duration::from_secs(5), rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(HaError::ConnectionLost),
            Err(_) => Err(HaError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_call_service_without_task_is_not_connected() {
        let (cmd_tx, cmd_rx) = mpsc::channel(1);
        drop(cmd_rx);
        let client = HaClient {
            cmd_tx,
            request_timeout: Duration::from_millis(100),
        };
        let err = client
            .call_service("light", "turn_on", None, "light.a")
            .await
            .unwrap_err();
        assert!(matches!(err, HaError::NotConnected));
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_service_times_out_when_unanswered() {
        let (cmd_tx, mut cmd_rx) = mpsc::channel(1);
        let client = HaClient {
            cmd_tx,
            request_timeout: Duration::from_millis(50),
        };
        // Receive the command but never answer it; the caller-side
        // deadline must fire instead of parking forever.
        let (result, cmd) = tokio::join!(
            client.call_service("light", "turn_on", None, "light.a"),
            cmd_rx.recv()
        );
        assert!(cmd.is_some());
        assert!(matches!(result, Err(HaError::Timeout)));
    }
}
