//! Shared types for the LightMapper floorplan editor.
//!
//! This crate contains the domain model (floorplan objects, layers,
//! scenes, cached light entities), the broadcast event vocabulary, and
//! the wire types for the Home Assistant WebSocket API and the backend
//! REST API.

/// Default port of the LightMapper backend server.
pub const DEFAULT_PORT: u16 = 8099;

pub mod api;
pub mod entity;
pub mod events;
pub mod ha;
pub mod layer;
pub mod object;
pub mod scene;

// Re-export commonly used types
pub use entity::{EntityId, LightAttributes, LightState};
pub use events::MapperEvent;
pub use ha::{is_light_entity, ClientMessage, ServerMessage, StateChangedData};
pub use layer::{Layer, LayerId, ObjectType};
pub use object::{
    polygon_area, DisplayMode, FloorplanLayout, FloorplanObject, LightStyle, ObjectId, ObjectKind,
    Point,
};
pub use scene::{Scene, SceneId, SceneLight};
