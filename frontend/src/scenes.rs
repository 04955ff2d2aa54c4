//! Scene capture, draft editing and apply fan-out.
//!
//! Edits live in a draft that is distinct from the last persisted
//! copy; revert restores the persisted copy verbatim (and is a no-op
//! when there is no persisted baseline). Apply issues one service call
//! per light carrying exactly the fields that were captured, attempts
//! every light regardless of individual failures, and reports
//! aggregated counts once at the end.

use futures_util::future::join_all;
use serde_json::{json, Value};

use lightmapper_types::{EntityId, Scene, SceneId, SceneLight};

use crate::entities::EntityCache;
use crate::floorplan::FloorplanEditor;
use crate::ha::HaClient;

/// Scene list plus the draft currently being composed.
pub struct SceneEditor {
    /// Persisted scenes as last loaded from the backend.
    pub scenes: Vec<Scene>,
    /// The scene being edited, if any.
    pub draft: Option<Scene>,
    /// Last persisted copy of the draft; the revert target.
    baseline: Option<Scene>,
}

impl SceneEditor {
    pub fn new() -> Self {
        Self {
            scenes: Vec::new(),
            draft: None,
            baseline: None,
        }
    }

    /// Start composing a fresh, unsaved scene.
    pub fn open_new(&mut self) {
        self.draft = Some(Scene::new(""));
        self.baseline = None;
    }

    /// Open a persisted scene for editing.
    pub fn open(&mut self, scene: Scene) {
        self.baseline = Some(scene.clone());
        self.draft = Some(scene);
    }

    pub fn close(&mut self) {
        self.draft = None;
        self.baseline = None;
    }

    /// Discard draft edits and restore the last persisted copy
    /// verbatim. Without a baseline (never-saved scene) this is a
    /// no-op: there is nothing to revert to.
    pub fn revert(&mut self) {
        if let Some(baseline) = &self.baseline {
            self.draft = Some(baseline.clone());
        } else {
            tracing::warn!("Revert with no persisted baseline is a no-op");
        }
    }

    /// Record a persisted copy: the new baseline for future reverts.
    pub fn mark_saved(&mut self, scene: Scene) {
        if let Some(existing) = self
            .scenes
            .iter_mut()
            .find(|s| s.id.is_some() && s.id == scene.id)
        {
            *existing = scene.clone();
        } else {
            self.scenes.push(scene.clone());
        }
        self.baseline = Some(scene.clone());
        self.draft = Some(scene);
    }

    pub fn forget(&mut self, id: SceneId) {
        self.scenes.retain(|s| s.id != Some(id));
        if self.draft.as_ref().and_then(|d| d.id) == Some(id) {
            self.close();
        }
    }

    pub fn is_dirty(&self) -> bool {
        match (&self.draft, &self.baseline) {
            (Some(draft), Some(baseline)) => draft != baseline,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Draft settings for one entity, for scene-preview rendering.
    pub fn preview_for(&self, entity_id: &str) -> Option<&SceneLight> {
        self.draft.as_ref()?.light_for(entity_id)
    }
}

impl Default for SceneEditor {
    fn default() -> Self {
        Self::new()
    }
}

/// Validation before any persistence or external call.
pub fn validate_scene(scene: &Scene) -> Result<(), String> {
    if scene.name.trim().is_empty() {
        return Err("Scene name must not be empty".to_string());
    }
    if scene.lights.is_empty() {
        return Err("Scene has no lights".to_string());
    }
    Ok(())
}

/// Capture the live state of every entity currently bound to a
/// floorplan light. Lights that are on contribute whichever of
/// brightness, color temperature and hue/saturation their state
/// carries; absent fields stay absent ("leave unchanged on apply").
/// Lights that are off or unavailable contribute no row.
pub fn capture_scene_lights(
    floorplan: &FloorplanEditor,
    entities: &EntityCache,
) -> Vec<SceneLight> {
    let mut captured = Vec::new();
    for object in floorplan.lights() {
        let Some(entity_id) = object.entity_id() else {
            continue;
        };
        if captured
            .iter()
            .any(|l: &SceneLight| &l.entity_id == entity_id)
        {
            // Two light objects bound to the same entity capture once.
            continue;
        }
        let Some(state) = entities.get(entity_id) else {
            tracing::warn!("Capture: no cached state for {}", entity_id);
            continue;
        };
        if !state.is_on() {
            continue;
        }
        let mut light = SceneLight::new(entity_id.clone());
        light.brightness = state.attributes.brightness;
        light.color_temp = state.attributes.color_temp_kelvin;
        if let Some([hue, saturation]) = state.attributes.hs_color {
            light.hue = Some(hue);
            light.saturation = Some(saturation);
        }
        captured.push(light);
    }
    captured
}

/// Service payload for one scene light: exactly the set fields, never
/// a defaulted one. `None` when the row constrains nothing.
pub fn build_service_data(light: &SceneLight) -> Option<Value> {
    let mut data = serde_json::Map::new();
    if let Some(brightness) = light.brightness {
        data.insert("brightness".to_string(), json!(brightness));
    }
    if let Some(color_temp) = light.color_temp {
        data.insert("color_temp_kelvin".to_string(), json!(color_temp));
    }
    if let (Some(hue), Some(saturation)) = (light.hue, light.saturation) {
        data.insert("hs_color".to_string(), json!([hue, saturation]));
    }
    if data.is_empty() {
        None
    } else {
        Some(Value::Object(data))
    }
}

/// One `light.turn_on` call per scene row.
pub fn build_service_calls(scene: &Scene) -> Vec<(EntityId, Option<Value>)> {
    scene
        .lights
        .iter()
        .map(|light| (light.entity_id.clone(), build_service_data(light)))
        .collect()
}

/// Fan a scene out to its lights. Every light is attempted; failures
/// are counted, never aborting the batch or rolling back earlier
/// successes. Returns `(succeeded, failed)`.
pub async fn apply_scene(ha: &HaClient, scene: &Scene) -> (usize, usize) {
    let calls = build_service_calls(scene);
    let results = join_all(calls.into_iter().map(|(entity_id, data)| async move {
        match ha
            .call_service("light", "turn_on", data, entity_id.clone())
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Applying scene to {} failed: {}", entity_id, e);
                false
            }
        }
    }))
    .await;

    let succeeded = results.iter().filter(|ok| **ok).count();
    (succeeded, results.len() - succeeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightmapper_types::{FloorplanObject, LightAttributes, LightState, Point};

    fn on_state(entity_id: &str, attributes: LightAttributes) -> LightState {
        LightState {
            entity_id: entity_id.to_string(),
            state: "on".to_string(),
            attributes,
            last_changed: None,
            last_updated: None,
        }
    }

    fn bound_light(floorplan: &mut FloorplanEditor, entity_id: &str) {
        let id = floorplan.insert_object(FloorplanObject::new_light(Point::new(0.0, 0.0)));
        assert!(floorplan.assign_entity_to_light(id, entity_id));
    }

    #[test]
    fn test_capture_extracts_only_present_fields() {
        let mut floorplan = FloorplanEditor::new();
        bound_light(&mut floorplan, "light.bright_only");
        bound_light(&mut floorplan, "light.full_color");

        let mut entities = EntityCache::new();
        entities.update(on_state(
            "light.bright_only",
            LightAttributes {
                brightness: Some(80),
                ..Default::default()
            },
        ));
        entities.update(on_state(
            "light.full_color",
            LightAttributes {
                brightness: Some(200),
                hs_color: Some([120.0, 55.0]),
                ..Default::default()
            },
        ));

        let mut captured = capture_scene_lights(&floorplan, &entities);
        captured.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        assert_eq!(captured.len(), 2);

        assert_eq!(captured[0].entity_id, "light.bright_only");
        assert_eq!(captured[0].brightness, Some(80));
        assert_eq!(captured[0].color_temp, None);
        assert_eq!(captured[0].hue, None);

        assert_eq!(captured[1].hue, Some(120.0));
        assert_eq!(captured[1].saturation, Some(55.0));
    }

    #[test]
    fn test_capture_skips_off_unbound_and_unknown() {
        let mut floorplan = FloorplanEditor::new();
        // Unbound light object: valid, simply unassigned.
        floorplan.insert_object(FloorplanObject::new_light(Point::new(1.0, 1.0)));
        bound_light(&mut floorplan, "light.off");
        bound_light(&mut floorplan, "light.unknown");

        let mut entities = EntityCache::new();
        entities.update(LightState {
            entity_id: "light.off".to_string(),
            state: "off".to_string(),
            attributes: Default::default(),
            last_changed: None,
            last_updated: None,
        });

        assert!(capture_scene_lights(&floorplan, &entities).is_empty());
    }

    #[test]
    fn test_service_data_matches_captured_fields_exactly() {
        let mut light = SceneLight::new("light.kitchen");
        light.brightness = Some(80);

        let data = build_service_data(&light).unwrap();
        let object = data.as_object().unwrap();
        assert_eq!(object.len(), 1, "only the captured field is sent");
        assert_eq!(object["brightness"], 80);

        light.hue = Some(10.0);
        light.saturation = Some(90.0);
        let data = build_service_data(&light).unwrap();
        let object = data.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["hs_color"], json!([10.0, 90.0]));
    }

    #[test]
    fn test_scene_round_trip_preserves_field_selection() {
        // Capture -> serialize -> reload -> build calls: the call
        // payload matches the captured non-null fields exactly.
        let mut floorplan = FloorplanEditor::new();
        bound_light(&mut floorplan, "light.kitchen");
        let mut entities = EntityCache::new();
        entities.update(on_state(
            "light.kitchen",
            LightAttributes {
                brightness: Some(80),
                ..Default::default()
            },
        ));

        let mut scene = Scene::new("Evening");
        scene.lights = capture_scene_lights(&floorplan, &entities);

        let json_blob = serde_json::to_string(&scene).unwrap();
        let restored: Scene = serde_json::from_str(&json_blob).unwrap();
        let calls = build_service_calls(&restored);
        assert_eq!(calls.len(), 1);
        let (entity_id, data) = &calls[0];
        assert_eq!(entity_id, "light.kitchen");
        let object = data.as_ref().unwrap().as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object["brightness"], 80);
    }

    #[test]
    fn test_empty_row_builds_no_payload() {
        let light = SceneLight::new("light.bare");
        assert!(build_service_data(&light).is_none());
    }

    #[test]
    fn test_revert_restores_baseline_verbatim() {
        let mut editor = SceneEditor::new();
        let mut scene = Scene::new("Evening");
        scene.id = Some(3);
        let mut row = SceneLight::new("light.sofa");
        row.brightness = Some(100);
        scene.lights.push(row);

        editor.open(scene.clone());
        editor.draft.as_mut().unwrap().name = "Changed".to_string();
        editor.draft.as_mut().unwrap().lights.clear();
        assert!(editor.is_dirty());

        editor.revert();
        assert_eq!(editor.draft.as_ref().unwrap(), &scene);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_revert_without_baseline_keeps_draft() {
        let mut editor = SceneEditor::new();
        editor.open_new();
        editor.draft.as_mut().unwrap().name = "Unsaved".to_string();

        editor.revert();
        assert_eq!(editor.draft.as_ref().unwrap().name, "Unsaved");
    }

    #[test]
    fn test_mark_saved_becomes_new_revert_target() {
        let mut editor = SceneEditor::new();
        editor.open_new();
        let mut saved = Scene::new("Night");
        saved.id = Some(9);
        editor.mark_saved(saved.clone());

        editor.draft.as_mut().unwrap().name = "Edited".to_string();
        editor.revert();
        assert_eq!(editor.draft.as_ref().unwrap(), &saved);
        assert_eq!(editor.scenes.len(), 1);
    }

    #[test]
    fn test_validate_rejects_bad_scenes() {
        let mut scene = Scene::new("  ");
        assert!(validate_scene(&scene).is_err());
        scene.name = "Evening".to_string();
        assert!(validate_scene(&scene).is_err(), "empty scene");
        scene.lights.push(SceneLight::new("light.a"));
        assert!(validate_scene(&scene).is_ok());
    }
}
