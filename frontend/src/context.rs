//! Shared editor state injected into every panel call.
//!
//! The composition root builds one [`EditorContext`] and hands it by
//! reference to panels, the canvas and the message pump; nothing
//! reaches into ambient globals. This is also the one place where the
//! object/layer pairing is maintained: adding or removing an object
//! creates or deletes its layer in the same call, so the pairing never
//! needs a separate reconciliation step.

use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use lightmapper_types::api::AreaInfo;
use lightmapper_types::{DisplayMode, FloorplanLayout, FloorplanObject, LayerId, MapperEvent, ObjectId};

use crate::api::ApiClient;
use crate::entities::EntityCache;
use crate::floorplan::{FloorplanEditor, Tool};
use crate::ha::HaClient;
use crate::layers::LayerModel;
use crate::scenes::SceneEditor;
use crate::settings::AppSettings;
use crate::state::{AppMessage, ConnectionState};

/// Quiet period after the last mutation before the layout autosaves.
const AUTOSAVE_DEBOUNCE: Duration = Duration::from_secs(2);

pub struct EditorContext {
    pub api: ApiClient,
    pub ha: Option<HaClient>,
    pub tx: Sender<AppMessage>,
    pub egui_ctx: egui::Context,

    pub floorplan: FloorplanEditor,
    pub layers: LayerModel,
    pub entities: EntityCache,
    pub scenes: SceneEditor,
    pub areas: Vec<AreaInfo>,
    pub settings: AppSettings,

    pub tool: Tool,
    pub connection: ConnectionState,
    pub status: String,
    pub error: Option<String>,

    autosave_pending: Option<Instant>,
}

impl EditorContext {
    pub fn new(
        api: ApiClient,
        tx: Sender<AppMessage>,
        egui_ctx: egui::Context,
        settings: AppSettings,
    ) -> Self {
        let mut ctx = Self {
            api,
            ha: None,
            tx,
            egui_ctx,
            floorplan: FloorplanEditor::new(),
            layers: LayerModel::new(),
            entities: EntityCache::new(),
            scenes: SceneEditor::new(),
            areas: Vec::new(),
            settings,
            tool: Tool::Select,
            connection: ConnectionState::Disconnected,
            status: "Ready".to_string(),
            error: None,
            autosave_pending: None,
        };
        ctx.floorplan.ensure_base_objects();
        ctx.layers.rebuild_from(ctx.floorplan.objects());
        // Construction noise is not a broadcastable change.
        ctx.floorplan.take_events();
        ctx.layers.take_events();
        ctx
    }

    // ---- object/layer pairing ----

    /// Add an object and its paired layer in the same call.
    pub fn add_object(&mut self, object: FloorplanObject) -> ObjectId {
        self.layers.create_layer_for_object(&object);
        let id = self.floorplan.insert_object(object);
        self.mark_autosave();
        id
    }

    /// Remove an object and its paired layer in the same call.
    pub fn remove_object(&mut self, id: ObjectId) {
        if self.floorplan.remove_object(id).is_some() {
            self.layers.remove_layer_for_object(id);
            self.mark_autosave();
        }
    }

    /// Remove a layer by deleting its backing object; the pairing is
    /// torn down in the same call.
    pub fn remove_layer(&mut self, layer_id: LayerId) {
        if let Some(layer) = self.layers.get(layer_id) {
            self.remove_object(layer.object_id);
        }
    }

    // ---- canvas operations ----

    pub fn assign_entity(&mut self, object_id: ObjectId, entity_id: impl Into<String>) -> bool {
        let assigned = self.floorplan.assign_entity_to_light(object_id, entity_id);
        if assigned {
            self.mark_autosave();
        }
        assigned
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.floorplan.set_display_mode(mode);
    }

    /// Apply an edit to one object and emit the matching modified
    /// event. Returns false for unknown ids.
    pub fn with_object_mut(
        &mut self,
        id: ObjectId,
        edit: impl FnOnce(&mut FloorplanObject),
    ) -> bool {
        let Some(object) = self.floorplan.object_mut(id) else {
            return false;
        };
        let is_light = object.is_light();
        edit(object);
        let event = if is_light {
            MapperEvent::LightModified { object_id: id }
        } else {
            MapperEvent::ObjectModified { object_id: id }
        };
        let _ = self.tx.send(AppMessage::Event(event));
        self.mark_autosave();
        true
    }

    // ---- persistence ----

    pub fn load_layout(&mut self, layout: FloorplanLayout) {
        self.floorplan.load_layout(layout);
        self.layers.rebuild_from(self.floorplan.objects());
    }

    /// Schedule a debounced layout autosave.
    pub fn mark_autosave(&mut self) {
        self.autosave_pending = Some(Instant::now());
    }

    /// True once the quiet period since the last mutation elapsed;
    /// resets the timer.
    pub fn autosave_due(&mut self, now: Instant) -> bool {
        match self.autosave_pending {
            Some(since) if now.duration_since(since) >= AUTOSAVE_DEBOUNCE => {
                self.autosave_pending = None;
                true
            }
            _ => false,
        }
    }

    // ---- status plumbing ----

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
        self.error = None;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.error = Some(message);
    }

    /// Drain events queued by the floorplan and layer model, in
    /// mutation order.
    pub fn take_events(&mut self) -> Vec<MapperEvent> {
        let mut events = self.floorplan.take_events();
        events.extend(self.layers.take_events());
        events
    }
}

#[cfg(test)]
impl EditorContext {
    /// Context wired to a throwaway channel, for unit tests.
    pub fn for_tests() -> Self {
        let (tx, rx) = std::sync::mpsc::channel();
        // Keep the receiver alive for the lifetime of the test context
        // so sends never error.
        std::mem::forget(rx);
        Self::new(
            ApiClient::new("http://localhost:8099/api"),
            tx,
            egui::Context::default(),
            AppSettings::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightmapper_types::Point;

    #[test]
    fn test_object_layer_pairing_is_bidirectional() {
        let mut ctx = EditorContext::for_tests();
        let base_layers = ctx.layers.len();

        let light = ctx.add_object(FloorplanObject::new_light(Point::new(0.0, 0.0)));
        assert_eq!(ctx.layers.len(), base_layers + 1);
        let layer = ctx.layers.layer_for_object(light).expect("layer paired");
        assert_eq!(layer.object_id, light);

        // Every object has exactly one layer and vice versa.
        for object in ctx.floorplan.objects() {
            assert!(ctx.layers.layer_for_object(object.id).is_some());
        }
        for layer in ctx.layers.ordered() {
            assert!(ctx.floorplan.object(layer.object_id).is_some());
        }

        // Removing the object removes the layer in the same call.
        ctx.remove_object(light);
        assert_eq!(ctx.layers.len(), base_layers);
        assert!(ctx.layers.layer_for_object(light).is_none());
    }

    #[test]
    fn test_remove_layer_removes_backing_object() {
        let mut ctx = EditorContext::for_tests();
        let light = ctx.add_object(FloorplanObject::new_light(Point::new(0.0, 0.0)));
        let layer_id = ctx.layers.layer_for_object(light).unwrap().id;

        ctx.remove_layer(layer_id);
        assert!(ctx.floorplan.object(light).is_none());
        assert!(ctx.layers.get(layer_id).is_none());
    }

    #[test]
    fn test_two_lights_layering_and_bring_to_front() {
        let mut ctx = EditorContext::for_tests();
        let base = ctx.layers.len();

        let first = ctx.add_object(FloorplanObject::new_light(Point::new(0.0, 0.0)));
        let first_layer = ctx.layers.layer_for_object(first).unwrap();
        assert_eq!(first_layer.z_index, base);
        assert!(first_layer.visible);
        assert!(!first_layer.locked);

        assert!(ctx.assign_entity(first, "light.kitchen"));
        let events = ctx.take_events();
        assert!(events.iter().any(|e| matches!(
            e,
            MapperEvent::LightEntityAssigned { entity_id, .. } if entity_id == "light.kitchen"
        )));

        let second = ctx.add_object(FloorplanObject::new_light(Point::new(1.0, 1.0)));
        assert_eq!(ctx.layers.layer_for_object(second).unwrap().z_index, base + 1);

        // The second light is already at the front of the stack; the
        // operation must be a true no-op.
        let before = ctx.layers.order().to_vec();
        let second_layer = ctx.layers.layer_for_object(second).unwrap().id;
        ctx.take_events();
        ctx.layers.bring_to_front(second_layer);
        assert_eq!(ctx.layers.order(), &before[..]);
        assert!(ctx.take_events().is_empty());
    }

    #[test]
    fn test_autosave_debounce() {
        let mut ctx = EditorContext::for_tests();
        let start = Instant::now();
        ctx.mark_autosave();
        assert!(!ctx.autosave_due(start + Duration::from_millis(500)));
        assert!(ctx.autosave_due(start + Duration::from_secs(3)));
        // Consumed: no second save until the next mutation.
        assert!(!ctx.autosave_due(start + Duration::from_secs(10)));
    }
}
