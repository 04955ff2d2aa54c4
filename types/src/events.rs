//! The broadcast event vocabulary routed through the panel manager.

use crate::entity::{EntityId, LightState};
use crate::layer::LayerId;
use crate::object::{DisplayMode, ObjectId};
use crate::scene::SceneId;
use serde::{Deserialize, Serialize};

/// Domain events delivered to every registered panel.
///
/// Delivery is synchronous and in registration order for one event;
/// there is no ordering guarantee between two broadcasts triggered from
/// different async callbacks. Consumers treat each incoming state as
/// authoritative at time of receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum MapperEvent {
    /// An object was selected on the canvas.
    ObjectSelected { object_id: ObjectId },
    /// The canvas selection was cleared.
    ObjectDeselected,
    /// An object (and its paired layer) was added.
    ObjectAdded { object_id: ObjectId },
    /// An object (and its paired layer) was removed.
    ObjectRemoved { object_id: ObjectId },
    /// A light object's geometry or appearance changed.
    LightModified { object_id: ObjectId },
    /// A non-light object (room, text, line) changed.
    ObjectModified { object_id: ObjectId },
    /// A light object was bound to an entity.
    LightEntityAssigned {
        object_id: ObjectId,
        entity_id: EntityId,
    },
    /// A layer's visibility flag flipped.
    LayerVisibilityChanged { layer_id: LayerId, visible: bool },
    /// A layer's lock flag flipped.
    LayerLockChanged { layer_id: LayerId, locked: bool },
    /// The layer z-order changed.
    LayerOrderChanged,
    /// The global display mode switched.
    DisplayModeChanged { mode: DisplayMode },
    /// A light entity's state changed (light domain only).
    LightStateChanged {
        entity_id: EntityId,
        state: LightState,
    },
    /// Generic re-emission of the same change.
    StateChanged {
        entity_id: EntityId,
        state: LightState,
    },
    /// The persisted scene list changed (create/save/delete).
    ScenesChanged,
    /// A scene apply batch finished.
    SceneApplied {
        scene_id: Option<SceneId>,
        succeeded: usize,
        failed: usize,
    },
}

impl MapperEvent {
    /// Human-readable description for the debug log.
    pub fn description(&self) -> String {
        match self {
            MapperEvent::ObjectSelected { object_id } => {
                format!("Object {} selected", object_id)
            }
            MapperEvent::ObjectDeselected => "Selection cleared".to_string(),
            MapperEvent::ObjectAdded { object_id } => format!("Object {} added", object_id),
            MapperEvent::ObjectRemoved { object_id } => {
                format!("Object {} removed", object_id)
            }
            MapperEvent::LightModified { object_id } => {
                format!("Light {} modified", object_id)
            }
            MapperEvent::ObjectModified { object_id } => {
                format!("Object {} modified", object_id)
            }
            MapperEvent::LightEntityAssigned {
                object_id,
                entity_id,
            } => format!("Light {} bound to {}", object_id, entity_id),
            MapperEvent::LayerVisibilityChanged { layer_id, visible } => {
                format!(
                    "Layer {} {}",
                    layer_id,
                    if *visible { "shown" } else { "hidden" }
                )
            }
            MapperEvent::LayerLockChanged { layer_id, locked } => {
                format!(
                    "Layer {} {}",
                    layer_id,
                    if *locked { "locked" } else { "unlocked" }
                )
            }
            MapperEvent::LayerOrderChanged => "Layer order changed".to_string(),
            MapperEvent::DisplayModeChanged { mode } => {
                format!("Display mode: {:?}", mode)
            }
            MapperEvent::LightStateChanged { entity_id, state } => {
                format!("{} is now {}", entity_id, state.state)
            }
            MapperEvent::StateChanged { entity_id, .. } => {
                format!("State changed: {}", entity_id)
            }
            MapperEvent::ScenesChanged => "Scene list changed".to_string(),
            MapperEvent::SceneApplied {
                scene_id,
                succeeded,
                failed,
            } => match scene_id {
                Some(id) => format!("Scene {} applied: {} ok, {} failed", id, succeeded, failed),
                None => format!("Scene applied: {} ok, {} failed", succeeded, failed),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serde_round_trip() {
        let event = MapperEvent::LayerVisibilityChanged {
            layer_id: uuid::Uuid::new_v4(),
            visible: false,
        };
        let json = serde_json::to_string(&event).unwrap();
        let restored: MapperEvent = serde_json::from_str(&json).unwrap();
        match restored {
            MapperEvent::LayerVisibilityChanged { visible, .. } => assert!(!visible),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_description_is_nonempty() {
        let event = MapperEvent::ScenesChanged;
        assert!(!event.description().is_empty());
    }
}
