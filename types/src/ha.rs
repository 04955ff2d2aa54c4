//! Wire types for the Home Assistant WebSocket API.
//!
//! Only the subset of the protocol the editor consumes: the auth
//! handshake, event subscription, ping/pong and service calls with
//! id-correlated results.

use crate::entity::{EntityId, LightState};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error payload carried by a failed `result` message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HaResultError {
    pub code: String,
    pub message: String,
}

/// An event frame's inner payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HaEvent {
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

/// `state_changed` event data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateChangedData {
    pub entity_id: EntityId,
    #[serde(default)]
    pub old_state: Option<LightState>,
    #[serde(default)]
    pub new_state: Option<LightState>,
}

/// Messages received from the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    AuthRequired {
        #[serde(default)]
        ha_version: Option<String>,
    },
    AuthOk {
        #[serde(default)]
        ha_version: Option<String>,
    },
    AuthInvalid {
        #[serde(default)]
        message: Option<String>,
    },
    Result {
        id: u64,
        success: bool,
        #[serde(default)]
        result: Option<Value>,
        #[serde(default)]
        error: Option<HaResultError>,
    },
    Event {
        id: u64,
        event: HaEvent,
    },
    Pong {
        id: u64,
    },
}

/// Target of a service call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceTarget {
    pub entity_id: EntityId,
}

/// Messages sent to the server. `auth` carries no id; everything else
/// is correlated by a monotonically increasing command id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Auth {
        access_token: String,
    },
    SubscribeEvents {
        id: u64,
        event_type: String,
    },
    Ping {
        id: u64,
    },
    CallService {
        id: u64,
        domain: String,
        service: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        service_data: Option<Value>,
        target: ServiceTarget,
    },
}

impl ClientMessage {
    /// Command id of this message, if it carries one.
    pub fn id(&self) -> Option<u64> {
        match self {
            ClientMessage::Auth { .. } => None,
            ClientMessage::SubscribeEvents { id, .. }
            | ClientMessage::Ping { id }
            | ClientMessage::CallService { id, .. } => Some(*id),
        }
    }
}

/// True for entities in the light domain.
pub fn is_light_entity(entity_id: &str) -> bool {
    entity_id.starts_with("light.")
}

/// Extract the normalized `(entity_id, new_state)` pair from a raw
/// event frame. Returns `None` for events that are not light-domain
/// `state_changed` events, or that carry no new state (entity removed).
pub fn normalize_state_changed(event: &HaEvent) -> Option<(EntityId, LightState)> {
    if event.event_type != "state_changed" {
        return None;
    }
    let data: StateChangedData = serde_json::from_value(event.data.clone()).ok()?;
    if !is_light_entity(&data.entity_id) {
        return None;
    }
    let new_state = data.new_state?;
    Some((data.entity_id, new_state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth_handshake() {
        let required: ServerMessage =
            serde_json::from_str(r#"{"type": "auth_required", "ha_version": "2024.5.1"}"#).unwrap();
        assert!(matches!(required, ServerMessage::AuthRequired { .. }));

        let invalid: ServerMessage =
            serde_json::from_str(r#"{"type": "auth_invalid", "message": "Invalid token"}"#).unwrap();
        match invalid {
            ServerMessage::AuthInvalid { message } => {
                assert_eq!(message.as_deref(), Some("Invalid token"))
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_result_and_pong() {
        let result: ServerMessage = serde_json::from_str(
            r#"{"type": "result", "id": 4, "success": false,
                "error": {"code": "not_found", "message": "Service not found"}}"#,
        )
        .unwrap();
        match result {
            ServerMessage::Result {
                id,
                success,
                error,
                ..
            } => {
                assert_eq!(id, 4);
                assert!(!success);
                assert_eq!(error.unwrap().code, "not_found");
            }
            other => panic!("unexpected: {:?}", other),
        }

        let pong: ServerMessage = serde_json::from_str(r#"{"type": "pong", "id": 9}"#).unwrap();
        assert!(matches!(pong, ServerMessage::Pong { id: 9 }));
    }

    #[test]
    fn test_normalize_light_state_changed() {
        let frame: ServerMessage = serde_json::from_str(
            r#"{"type": "event", "id": 2, "event": {
                "event_type": "state_changed",
                "data": {
                    "entity_id": "light.kitchen",
                    "old_state": null,
                    "new_state": {
                        "entity_id": "light.kitchen",
                        "state": "on",
                        "attributes": {"brightness": 200},
                        "last_changed": "2024-05-01T10:00:00+00:00",
                        "last_updated": "2024-05-01T10:00:00+00:00"
                    }
                }
            }}"#,
        )
        .unwrap();

        let ServerMessage::Event { event, .. } = frame else {
            panic!("expected event frame");
        };
        let (entity_id, state) = normalize_state_changed(&event).unwrap();
        assert_eq!(entity_id, "light.kitchen");
        assert_eq!(state.state, "on");
        assert_eq!(state.attributes.brightness, Some(200));
    }

    #[test]
    fn test_normalize_rejects_non_light_domain() {
        let event = HaEvent {
            event_type: "state_changed".to_string(),
            data: serde_json::json!({
                "entity_id": "sensor.temperature",
                "new_state": {"entity_id": "sensor.temperature", "state": "21.5"}
            }),
        };
        assert!(normalize_state_changed(&event).is_none());
    }

    #[test]
    fn test_normalize_rejects_other_event_types() {
        let event = HaEvent {
            event_type: "call_service".to_string(),
            data: serde_json::json!({"entity_id": "light.kitchen"}),
        };
        assert!(normalize_state_changed(&event).is_none());
    }

    #[test]
    fn test_call_service_serialization() {
        let msg = ClientMessage::CallService {
            id: 12,
            domain: "light".to_string(),
            service: "turn_on".to_string(),
            service_data: Some(serde_json::json!({"brightness": 80})),
            target: ServiceTarget {
                entity_id: "light.sofa".to_string(),
            },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "call_service");
        assert_eq!(json["id"], 12);
        assert_eq!(json["service_data"]["brightness"], 80);
        assert_eq!(json["target"]["entity_id"], "light.sofa");
        assert_eq!(msg.id(), Some(12));
    }

    #[test]
    fn test_auth_message_has_no_id() {
        let msg = ClientMessage::Auth {
            access_token: "token".to_string(),
        };
        assert_eq!(msg.id(), None);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "auth");
    }
}
