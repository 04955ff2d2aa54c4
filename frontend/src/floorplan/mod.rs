//! The floorplan editor: the domain object arena and its mutations.
//!
//! The arena is the single source of truth for "what objects exist".
//! Mutations queue [`MapperEvent`]s which the app drains and broadcasts
//! only after the mutation has completed, so every panel reacting to a
//! broadcast sees consistent post-mutation state.

pub mod interaction;
pub mod rendering;

use lightmapper_types::{
    DisplayMode, EntityId, FloorplanLayout, FloorplanObject, MapperEvent, ObjectId, ObjectKind,
    Point,
};

/// Active drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    PlaceLight,
    DrawRoom,
    PlaceText,
    DrawLine,
}

impl Tool {
    pub fn label(&self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::PlaceLight => "Light",
            Tool::DrawRoom => "Room",
            Tool::PlaceText => "Text",
            Tool::DrawLine => "Line",
        }
    }
}

pub struct FloorplanEditor {
    objects: Vec<FloorplanObject>,
    pub selected: Option<ObjectId>,
    /// Canvas pan offset in screen pixels.
    pub pan_offset: egui::Vec2,
    pub zoom: f32,
    display_mode: DisplayMode,
    events: Vec<MapperEvent>,
    /// Corners of the room polygon currently being drawn.
    pub draw_points: Vec<Point>,
    /// Anchor of the line currently being drawn.
    pub line_start: Option<Point>,
    pub(crate) dragging: Option<ObjectId>,
    pub(crate) hovered: Option<ObjectId>,
}

pub(crate) const MIN_ZOOM: f32 = 0.1;
pub(crate) const MAX_ZOOM: f32 = 8.0;

impl FloorplanEditor {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            selected: None,
            pan_offset: egui::Vec2::ZERO,
            zoom: 1.0,
            display_mode: DisplayMode::CurrentState,
            events: Vec::new(),
            draw_points: Vec::new(),
            line_start: None,
            dragging: None,
            hovered: None,
        }
    }

    // ---- queries ----

    pub fn objects(&self) -> impl Iterator<Item = &FloorplanObject> {
        self.objects.iter()
    }

    pub fn object(&self, id: ObjectId) -> Option<&FloorplanObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> Option<&mut FloorplanObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// All light objects, in arena order (not layer order).
    pub fn lights(&self) -> impl Iterator<Item = &FloorplanObject> {
        self.objects.iter().filter(|o| o.is_light())
    }

    /// The light object bound to `entity_id`, if any.
    pub fn find_by_entity(&self, entity_id: &str) -> Option<&FloorplanObject> {
        self.lights()
            .find(|o| o.entity_id().map(String::as_str) == Some(entity_id))
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn selected_object(&self) -> Option<&FloorplanObject> {
        self.selected.and_then(|id| self.object(id))
    }

    // ---- mutations ----

    /// Add an object to the arena. The caller pairs the layer.
    pub fn insert_object(&mut self, object: FloorplanObject) -> ObjectId {
        let id = object.id;
        self.objects.push(object);
        self.events.push(MapperEvent::ObjectAdded { object_id: id });
        id
    }

    /// Remove an object. Removing an unknown id is a no-op.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<FloorplanObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        let object = self.objects.remove(index);
        if self.selected == Some(id) {
            self.deselect();
        }
        self.events.push(MapperEvent::ObjectRemoved { object_id: id });
        Some(object)
    }

    pub fn select(&mut self, id: ObjectId) {
        if self.object(id).is_none() || self.selected == Some(id) {
            return;
        }
        self.selected = Some(id);
        self.events
            .push(MapperEvent::ObjectSelected { object_id: id });
    }

    pub fn deselect(&mut self) {
        if self.selected.take().is_some() {
            self.events.push(MapperEvent::ObjectDeselected);
        }
    }

    /// Bind a light object to an entity. Fails silently (returns
    /// false) when the object is missing or not a light. Rebinding an
    /// already-bound light overwrites the prior binding.
    pub fn assign_entity_to_light(&mut self, id: ObjectId, entity: impl Into<EntityId>) -> bool {
        let Some(object) = self.object_mut(id) else {
            tracing::warn!("assign_entity_to_light: unknown object {}", id);
            return false;
        };
        let ObjectKind::Light { entity_id, .. } = &mut object.kind else {
            tracing::warn!("assign_entity_to_light: object {} is not a light", id);
            return false;
        };
        let entity = entity.into();
        *entity_id = Some(entity.clone());
        self.events.push(MapperEvent::LightEntityAssigned {
            object_id: id,
            entity_id: entity,
        });
        true
    }

    /// Clear a light's entity binding.
    pub fn unassign_entity(&mut self, id: ObjectId) -> bool {
        let Some(object) = self.object_mut(id) else {
            return false;
        };
        let ObjectKind::Light { entity_id, .. } = &mut object.kind else {
            return false;
        };
        if entity_id.take().is_some() {
            self.events
                .push(MapperEvent::LightModified { object_id: id });
        }
        true
    }

    /// Translate an object by `delta` (world units).
    pub fn move_object(&mut self, id: ObjectId, delta: egui::Vec2) {
        let Some(object) = self.object_mut(id) else {
            return;
        };
        let shift = |p: &mut Point| {
            p.x += delta.x;
            p.y += delta.y;
        };
        let is_light = object.is_light();
        match &mut object.kind {
            ObjectKind::Light { position, .. } => shift(position),
            ObjectKind::Room { points, .. } => points.iter_mut().for_each(shift),
            ObjectKind::Text { position, .. } => shift(position),
            ObjectKind::Line { from, to, .. } => {
                shift(from);
                shift(to);
            }
            ObjectKind::Background { .. } | ObjectKind::Grid { .. } => return,
        }
        self.events.push(if is_light {
            MapperEvent::LightModified { object_id: id }
        } else {
            MapperEvent::ObjectModified { object_id: id }
        });
    }

    /// Switch the global display mode. Every bound light re-renders
    /// from the new source on the next frame.
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        if self.display_mode == mode {
            return;
        }
        self.display_mode = mode;
        self.events.push(MapperEvent::DisplayModeChanged { mode });
    }

    // ---- persistence ----

    /// Ensure the fixed background and grid objects exist, below
    /// everything else. Returns ids of objects that were created.
    pub fn ensure_base_objects(&mut self) -> Vec<ObjectId> {
        let mut created = Vec::new();
        if !self
            .objects
            .iter()
            .any(|o| matches!(o.kind, ObjectKind::Grid { .. }))
        {
            let grid = FloorplanObject {
                id: uuid::Uuid::new_v4(),
                kind: ObjectKind::Grid { spacing: 20.0 },
            };
            created.push(grid.id);
            self.objects.insert(0, grid);
        }
        if !self
            .objects
            .iter()
            .any(|o| matches!(o.kind, ObjectKind::Background { .. }))
        {
            let background = FloorplanObject {
                id: uuid::Uuid::new_v4(),
                kind: ObjectKind::Background {
                    image_url: None,
                    opacity: 1.0,
                },
            };
            created.push(background.id);
            self.objects.insert(0, background);
        }
        created
    }

    /// Serialize the full object graph plus viewport transform.
    pub fn to_layout(&self) -> FloorplanLayout {
        FloorplanLayout {
            objects: self.objects.clone(),
            viewport: [
                self.zoom,
                0.0,
                0.0,
                self.zoom,
                self.pan_offset.x,
                self.pan_offset.y,
            ],
            zoom: self.zoom,
        }
    }

    /// Replace the arena from a persisted layout. Re-hydrated objects
    /// regain full type-specific behavior with no migration step; the
    /// caller rebuilds the paired layer model.
    pub fn load_layout(&mut self, layout: FloorplanLayout) {
        self.objects = layout.objects;
        self.zoom = layout.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan_offset = egui::vec2(layout.viewport[4], layout.viewport[5]);
        self.selected = None;
        self.dragging = None;
        self.hovered = None;
        self.draw_points.clear();
        self.line_start = None;
        self.ensure_base_objects();
    }

    /// Drain queued events. Called after mutations complete, never
    /// mid-mutation.
    pub fn take_events(&mut self) -> Vec<MapperEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for FloorplanEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_entity_to_light() {
        let mut editor = FloorplanEditor::new();
        let light = editor.insert_object(FloorplanObject::new_light(Point::new(1.0, 2.0)));
        editor.take_events();

        assert!(editor.assign_entity_to_light(light, "light.kitchen"));
        assert_eq!(
            editor.object(light).unwrap().entity_id().map(String::as_str),
            Some("light.kitchen")
        );

        let events = editor.take_events();
        assert!(matches!(
            events.as_slice(),
            [MapperEvent::LightEntityAssigned { entity_id, .. }] if entity_id == "light.kitchen"
        ));

        // Rebinding overwrites without ceremony.
        assert!(editor.assign_entity_to_light(light, "light.hall"));
        assert_eq!(
            editor.object(light).unwrap().entity_id().map(String::as_str),
            Some("light.hall")
        );
    }

    #[test]
    fn test_assign_entity_rejects_non_lights() {
        let mut editor = FloorplanEditor::new();
        let room = editor.insert_object(FloorplanObject::new_room(
            vec![
                Point::new(0.0, 0.0),
                Point::new(5.0, 0.0),
                Point::new(5.0, 5.0),
            ],
            "Room",
        ));
        assert!(!editor.assign_entity_to_light(room, "light.kitchen"));
        assert!(!editor.assign_entity_to_light(uuid::Uuid::new_v4(), "light.kitchen"));
    }

    #[test]
    fn test_remove_clears_selection_and_emits() {
        let mut editor = FloorplanEditor::new();
        let light = editor.insert_object(FloorplanObject::new_light(Point::new(0.0, 0.0)));
        editor.select(light);
        editor.take_events();

        assert!(editor.remove_object(light).is_some());
        assert_eq!(editor.selected, None);
        let events = editor.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, MapperEvent::ObjectDeselected)));
        assert!(events
            .iter()
            .any(|e| matches!(e, MapperEvent::ObjectRemoved { .. })));

        // Unknown ids are a no-op.
        assert!(editor.remove_object(light).is_none());
    }

    #[test]
    fn test_display_mode_switch_emits_once() {
        let mut editor = FloorplanEditor::new();
        editor.set_display_mode(DisplayMode::ScenePreview);
        editor.set_display_mode(DisplayMode::ScenePreview);
        let events = editor.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            MapperEvent::DisplayModeChanged {
                mode: DisplayMode::ScenePreview
            }
        ));
    }

    #[test]
    fn test_layout_round_trip() {
        let mut editor = FloorplanEditor::new();
        editor.ensure_base_objects();
        let light = editor.insert_object(FloorplanObject::new_light(Point::new(3.0, 4.0)));
        editor.assign_entity_to_light(light, "light.sofa");
        editor.zoom = 2.0;
        editor.pan_offset = egui::vec2(12.0, -7.0);

        let layout = editor.to_layout();
        let json = serde_json::to_string(&layout).unwrap();
        let restored: FloorplanLayout = serde_json::from_str(&json).unwrap();

        let mut other = FloorplanEditor::new();
        other.load_layout(restored);
        assert_eq!(other.zoom, 2.0);
        assert_eq!(other.pan_offset, egui::vec2(12.0, -7.0));
        let rehydrated = other.find_by_entity("light.sofa").unwrap();
        assert!(rehydrated.is_light());
        assert_eq!(rehydrated.id, light);
        // Base objects survive exactly once.
        assert_eq!(
            other
                .objects()
                .filter(|o| matches!(o.kind, ObjectKind::Background { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_move_object_emits_matching_event() {
        let mut editor = FloorplanEditor::new();
        let light = editor.insert_object(FloorplanObject::new_light(Point::new(0.0, 0.0)));
        let room = editor.insert_object(FloorplanObject::new_room(
            vec![
                Point::new(0.0, 0.0),
                Point::new(5.0, 0.0),
                Point::new(5.0, 5.0),
            ],
            "Room",
        ));
        editor.take_events();

        editor.move_object(light, egui::vec2(2.0, 3.0));
        editor.move_object(room, egui::vec2(1.0, 1.0));
        let events = editor.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, MapperEvent::LightModified { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, MapperEvent::ObjectModified { .. })));

        match &editor.object(light).unwrap().kind {
            ObjectKind::Light { position, .. } => {
                assert_eq!((position.x, position.y), (2.0, 3.0));
            }
            _ => unreachable!(),
        }
    }
}
