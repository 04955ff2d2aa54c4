//! The connection task: socket ownership, auth handshake, heartbeat,
//! command correlation and the reconnect loop.

use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use lightmapper_types::ha::{normalize_state_changed, ClientMessage, ServerMessage, ServiceTarget};
use lightmapper_types::MapperEvent;

use super::pending::PendingRequests;
use super::{HaCommand, HaConfig, HaError};
use crate::api::ApiClient;
use crate::state::{AppMessage, ConnectionState};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// How one session ended, seen from the reconnect loop.
enum SessionEnd {
    /// Authenticated session dropped; reconnect with a fresh counter.
    Lost,
    /// The command channel closed: the app is shutting down.
    Shutdown,
}

/// Top-level task: reconnect loop around individual sessions.
pub(crate) async fn run(
    config: HaConfig,
    api: ApiClient,
    mut cmd_rx: mpsc::Receiver<HaCommand>,
    tx: Sender<AppMessage>,
    ctx: egui::Context,
) {
    let mut failures: u32 = 0;

    loop {
        let state = if failures == 0 {
            ConnectionState::Connecting
        } else {
            ConnectionState::Reconnecting {
                attempt: failures + 1,
            }
        };
        notify(&tx, &ctx, state);

        match run_session(&config, &api, &mut cmd_rx, &tx, &ctx).await {
            Ok(SessionEnd::Shutdown) => {
                tracing::info!("Realtime client shutting down");
                return;
            }
            Ok(SessionEnd::Lost) => {
                tracing::warn!("Realtime connection lost");
                // Counter resets on any successful authenticated connection.
                failures = 0;
            }
            Err(e) => {
                tracing::error!("Realtime connection attempt failed: {}", e);
            }
        }
        failures += 1;

        let Some(delay) = config.policy.delay_for(failures) else {
            tracing::error!(
                "Giving up after {} failed connection attempts",
                config.policy.max_attempts
            );
            notify(
                &tx,
                &ctx,
                ConnectionState::Failed {
                    reason: format!("gave up after {} attempts", config.policy.max_attempts),
                },
            );
            return;
        };

        notify(&tx, &ctx, ConnectionState::Disconnected);
        tracing::info!("Waiting {:?} before reconnection attempt", delay);
        tokio::time::sleep(delay).await;
    }
}

/// Run one connection from socket open to close. `Err` means the
/// attempt failed before authentication completed.
async fn run_session(
    config: &HaConfig,
    api: &ApiClient,
    cmd_rx: &mut mpsc::Receiver<HaCommand>,
    tx: &Sender<AppMessage>,
    ctx: &egui::Context,
) -> Result<SessionEnd, HaError> {
    tracing::info!("Connecting to {}", config.url);
    let (ws, _) = connect_async(&config.url)
        .await
        .map_err(|e| HaError::Transport(e.to_string()))?;
    let (mut sink, mut stream) = ws.split();

    notify(tx, ctx, ConnectionState::Authenticating);
    authenticate(api, &mut sink, &mut stream).await?;
    tracing::info!("Authenticated with Home Assistant");

    let mut pending = PendingRequests::new(config.request_timeout);

    // Subscribe to the change-event stream; connected is reported only
    // once the subscription is acknowledged.
    let subscription_id = pending.next_id();
    send_json(
        &mut sink,
        &ClientMessage::SubscribeEvents {
            id: subscription_id,
            event_type: "state_changed".to_string(),
        },
    )
    .await?;

    // The heartbeat lives in this scope: ending the session drops it,
    // so a stale timer can never fire into the next connection.
    let mut heartbeat = tokio::time::interval_at(
        tokio::time::Instant::now() + config.heartbeat,
        config.heartbeat,
    );
    heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut pong_outstanding = false;

    let end = loop {
        tokio::select! {
            frame = stream.next() => {
                let Some(frame) = frame else {
                    tracing::warn!("WebSocket stream ended");
                    break SessionEnd::Lost;
                };
                match frame {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<ServerMessage>(text.as_str()) {
                            Ok(msg) => handle_server_message(
                                msg,
                                &mut pending,
                                subscription_id,
                                &mut pong_outstanding,
                                tx,
                                ctx,
                            ),
                            Err(e) => tracing::error!("Failed to parse server message: {}", e),
                        }
                    }
                    Ok(Message::Binary(_)) => {
                        tracing::trace!("Received binary message (ignored)");
                    }
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                        // Transport-level frames handled by tungstenite.
                    }
                    Ok(Message::Close(_)) => {
                        tracing::info!("WebSocket closed by server");
                        break SessionEnd::Lost;
                    }
                    Ok(Message::Frame(_)) => {}
                    Err(e) => {
                        tracing::error!("WebSocket error: {:?}", e);
                        break SessionEnd::Lost;
                    }
                }
            }
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    break SessionEnd::Shutdown;
                };
                if handle_command(cmd, &mut pending, &mut sink).await.is_err() {
                    break SessionEnd::Lost;
                }
            }
            _ = heartbeat.tick() => {
                pending.expire(Instant::now());
                if pong_outstanding {
                    tracing::warn!("Heartbeat pong missing, treating socket as dead");
                    break SessionEnd::Lost;
                }
                let id = pending.next_id();
                if send_json(&mut sink, &ClientMessage::Ping { id }).await.is_err() {
                    break SessionEnd::Lost;
                }
                pong_outstanding = true;
            }
        }
    };

    // Nothing may keep waiting on a dead socket.
    pending.fail_all(|| HaError::ConnectionLost);
    Ok(end)
}

/// The server speaks first: `auth_required`, then we answer with a
/// freshly fetched credential. `auth_invalid` is terminal for this
/// attempt; the reconnect loop re-fetches the credential later.
async fn authenticate(
    api: &ApiClient,
    sink: &mut WsSink,
    stream: &mut WsStream,
) -> Result<(), HaError> {
    let first = next_text_frame(stream).await?;
    match serde_json::from_str::<ServerMessage>(&first) {
        Ok(ServerMessage::AuthRequired { ha_version }) => {
            tracing::debug!("Auth requested (ha_version: {:?})", ha_version);
        }
        Ok(other) => {
            return Err(HaError::Transport(format!(
                "expected auth_required, got {:?}",
                other
            )))
        }
        Err(e) => return Err(HaError::Transport(e.to_string())),
    }

    let token = api
        .fetch_access_token()
        .await
        .map_err(|e| HaError::Transport(format!("credential fetch failed: {}", e)))?;
    send_json(
        sink,
        &ClientMessage::Auth {
            access_token: token,
        },
    )
    .await?;

    let reply = next_text_frame(stream).await?;
    match serde_json::from_str::<ServerMessage>(&reply) {
        Ok(ServerMessage::AuthOk { .. }) => Ok(()),
        Ok(ServerMessage::AuthInvalid { message }) => Err(HaError::AuthRejected(
            message.unwrap_or_else(|| "invalid access token".to_string()),
        )),
        Ok(other) => Err(HaError::Transport(format!(
            "unexpected auth reply: {:?}",
            other
        ))),
        Err(e) => Err(HaError::Transport(e.to_string())),
    }
}

fn handle_server_message(
    msg: ServerMessage,
    pending: &mut PendingRequests,
    subscription_id: u64,
    pong_outstanding: &mut bool,
    tx: &Sender<AppMessage>,
    ctx: &egui::Context,
) {
    match msg {
        ServerMessage::Result {
            id,
            success,
            result,
            error,
        } => {
            if id == subscription_id {
                if success {
                    tracing::info!("Subscribed to state changes");
                    notify(tx, ctx, ConnectionState::Connected);
                } else {
                    tracing::error!("Event subscription rejected: {:?}", error);
                }
                return;
            }
            let outcome = if success {
                Ok(result)
            } else {
                let err = error.map(|e| HaError::Service {
                    code: e.code,
                    message: e.message,
                });
                Err(err.unwrap_or(HaError::ConnectionLost))
            };
            pending.resolve(id, outcome);
        }
        ServerMessage::Event { event, .. } => {
            // Non-light entities are filtered out before re-emission;
            // light changes go out under both event names.
            if let Some((entity_id, state)) = normalize_state_changed(&event) {
                tracing::trace!("{} -> {}", entity_id, state.state);
                let _ = tx.send(AppMessage::Event(MapperEvent::LightStateChanged {
                    entity_id: entity_id.clone(),
                    state: state.clone(),
                }));
                let _ = tx.send(AppMessage::Event(MapperEvent::StateChanged {
                    entity_id,
                    state,
                }));
                ctx.request_repaint();
            }
        }
        ServerMessage::Pong { id } => {
            tracing::trace!("Pong {}", id);
            *pong_outstanding = false;
        }
        other => {
            tracing::warn!("Unexpected message outside handshake: {:?}", other);
        }
    }
}

async fn handle_command(
    cmd: HaCommand,
    pending: &mut PendingRequests,
    sink: &mut WsSink,
) -> Result<(), ()> {
    match cmd {
        HaCommand::CallService {
            domain,
            service,
            service_data,
            entity_id,
            respond_to,
        } => {
            let id = pending.next_id();
            let msg = ClientMessage::CallService {
                id,
                domain,
                service,
                service_data,
                target: ServiceTarget { entity_id },
            };
            pending.insert(id, respond_to, Instant::now());
            if let Err(e) = send_json(sink, &msg).await {
                pending.resolve(id, Err(e));
                return Err(());
            }
            Ok(())
        }
    }
}

async fn send_json(sink: &mut WsSink, msg: &ClientMessage) -> Result<(), HaError> {
    let json = serde_json::to_string(msg).map_err(|e| HaError::Transport(e.to_string()))?;
    sink.send(Message::Text(json.into()))
        .await
        .map_err(|e| HaError::Transport(e.to_string()))
}

/// Next text frame within the handshake deadline, skipping transport
/// frames.
async fn next_text_frame(stream: &mut WsStream) -> Result<String, HaError> {
    let deadline = tokio::time::Instant::now() + HANDSHAKE_TIMEOUT;
    loop {
        let frame = tokio::time::timeout_at(deadline, stream.next())
            .await
            .map_err(|_| HaError::Transport("handshake timed out".to_string()))?;
        match frame {
            Some(Ok(Message::Text(text))) => return Ok(text.as_str().to_string()),
            Some(Ok(Message::Close(_))) | None => {
                return Err(HaError::Transport("socket closed during handshake".to_string()))
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(HaError::Transport(e.to_string())),
        }
    }
}

fn notify(tx: &Sender<AppMessage>, ctx: &egui::Context, state: ConnectionState) {
    let _ = tx.send(AppMessage::ConnectionStateChanged(state));
    ctx.request_repaint();
}
