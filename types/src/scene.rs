//! Persisted scenes: named collections of per-entity target settings.

use crate::entity::EntityId;
use serde::{Deserialize, Serialize};

/// Database-assigned scene id. Scenes that were never saved have none.
pub type SceneId = i64;

/// Target settings for one entity within a scene. Every field is
/// independently optional; an absent field means "leave unchanged on
/// apply", not "set to zero".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLight {
    pub entity_id: EntityId,
    /// Raw brightness, 0-255.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    /// Color temperature in Kelvin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_temp: Option<u32>,
    /// Hue in degrees, 0-360.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<f32>,
    /// Saturation in percent, 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f32>,
}

impl SceneLight {
    pub fn new(entity_id: impl Into<EntityId>) -> Self {
        Self {
            entity_id: entity_id.into(),
            brightness: None,
            color_temp: None,
            hue: None,
            saturation: None,
        }
    }

    /// True when no property is constrained at all.
    pub fn is_empty(&self) -> bool {
        self.brightness.is_none()
            && self.color_temp.is_none()
            && self.hue.is_none()
            && self.saturation.is_none()
    }
}

/// A named, persisted collection of per-entity target settings.
///
/// Invariant: entity ids are unique within one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// `None` until the scene has been persisted by the backend.
    #[serde(default)]
    pub id: Option<SceneId>,
    pub name: String,
    #[serde(default)]
    pub lights: Vec<SceneLight>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            lights: Vec::new(),
        }
    }

    pub fn light_for(&self, entity_id: &str) -> Option<&SceneLight> {
        self.lights.iter().find(|l| l.entity_id == entity_id)
    }

    /// Insert or replace the settings row for an entity, keeping entity
    /// ids unique.
    pub fn upsert_light(&mut self, light: SceneLight) {
        if let Some(existing) = self
            .lights
            .iter_mut()
            .find(|l| l.entity_id == light.entity_id)
        {
            *existing = light;
        } else {
            self.lights.push(light);
        }
    }

    pub fn remove_light(&mut self, entity_id: &str) {
        self.lights.retain(|l| l.entity_id != entity_id);
    }
}
