//! Request/response wrappers for the backend REST API.

use crate::entity::LightState;
use crate::object::FloorplanLayout;
use crate::scene::{Scene, SceneLight};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightListResponse {
    pub lights: Vec<LightState>,
}

/// A Home Assistant area, used to group entities in the entities panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaInfo {
    pub area_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaListResponse {
    pub areas: Vec<AreaInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneListResponse {
    pub scenes: Vec<Scene>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneResponse {
    pub scene: Scene,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSceneRequest {
    pub name: String,
    pub lights: Vec<SceneLight>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutResponse {
    pub layout: FloorplanLayout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveLayoutRequest {
    pub layout: FloorplanLayout,
}

/// Side-channel credential for the realtime connection. Fetched fresh
/// for every connection attempt, never hard-coded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
}
