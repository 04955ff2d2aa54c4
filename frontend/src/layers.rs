//! The layer model: the single authoritative z-order.
//!
//! `order` is the one ordered list; index 0 is the bottom of the
//! stack and the canvas render order is derived from it on every
//! frame. Z-indices are recomputed dense (`0..n-1`) after every
//! mutation, so a layer's `z_index` is always exactly its position in
//! `order`. Background and grid layers are fixed at the bottom and are
//! excluded from every reorder operation.
//!
//! Operations on unknown layer ids are warn-and-no-op, never errors:
//! the UI stays responsive even when it races a deletion with a
//! pending click.

use std::collections::HashMap;

use lightmapper_types::{FloorplanObject, Layer, LayerId, MapperEvent, ObjectId, ObjectType};

pub struct LayerModel {
    layers: HashMap<LayerId, Layer>,
    /// Bottom-up layer order; the only authority on z.
    order: Vec<LayerId>,
    events: Vec<MapperEvent>,
}

impl LayerModel {
    pub fn new() -> Self {
        Self {
            layers: HashMap::new(),
            order: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn layer_for_object(&self, object_id: ObjectId) -> Option<&Layer> {
        self.order
            .iter()
            .filter_map(|id| self.layers.get(id))
            .find(|l| l.object_id == object_id)
    }

    /// Layers bottom-up (render order).
    pub fn ordered(&self) -> impl Iterator<Item = &Layer> {
        self.order.iter().filter_map(|id| self.layers.get(id))
    }

    /// Layers top-down (panel list order).
    pub fn ordered_top_down(&self) -> impl Iterator<Item = &Layer> {
        self.order.iter().rev().filter_map(|id| self.layers.get(id))
    }

    /// The raw order sequence, bottom-up.
    pub fn order(&self) -> &[LayerId] {
        &self.order
    }

    /// Create a layer wrapping `object` and place it at the top of the
    /// stack. Fixed layers (background/grid) instead go to the bottom,
    /// below every reorderable layer.
    pub fn create_layer_for_object(&mut self, object: &FloorplanObject) -> LayerId {
        let layer = Layer::for_object(object);
        let id = layer.id;
        let fixed = layer.is_fixed();
        self.layers.insert(id, layer);
        if fixed {
            let insert_at = self.first_unfixed_index();
            self.order.insert(insert_at, id);
        } else {
            self.order.push(id);
        }
        self.reindex();
        id
    }

    /// Remove a layer; z-indices of the remaining layers stay dense.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<ObjectId> {
        let layer = match self.layers.remove(&id) {
            Some(layer) => layer,
            None => {
                tracing::warn!("remove_layer: unknown layer {}", id);
                return None;
            }
        };
        self.order.retain(|l| *l != id);
        self.reindex();
        Some(layer.object_id)
    }

    /// Remove the layer paired with `object_id`, if any.
    pub fn remove_layer_for_object(&mut self, object_id: ObjectId) -> Option<LayerId> {
        let id = self.layer_for_object(object_id)?.id;
        self.remove_layer(id);
        Some(id)
    }

    /// Splice `dragged` out of the order and reinsert it at `target`'s
    /// position. Both ids must exist and be reorderable; reordering a
    /// layer onto itself leaves the sequence untouched.
    pub fn reorder_layers(&mut self, dragged: LayerId, target: LayerId) {
        if dragged == target {
            return;
        }
        let (Some(d), Some(t)) = (self.layers.get(&dragged), self.layers.get(&target)) else {
            tracing::warn!("reorder_layers: unknown layer id");
            return;
        };
        if d.is_fixed() || t.is_fixed() {
            tracing::warn!("reorder_layers: fixed layers cannot be reordered");
            return;
        }
        let Some(from) = self.order.iter().position(|id| *id == dragged) else {
            return;
        };
        self.order.remove(from);
        let Some(to) = self.order.iter().position(|id| *id == target) else {
            // Should not happen; restore and bail.
            self.order.insert(from, dragged);
            return;
        };
        self.order.insert(to, dragged);
        self.finish_reorder();
    }

    /// Move a layer to the top of the stack. A no-op when it is
    /// already there.
    pub fn bring_to_front(&mut self, id: LayerId) {
        let Some(from) = self.reorderable_position(id) else {
            return;
        };
        if from == self.order.len() - 1 {
            return;
        }
        let id = self.order.remove(from);
        self.order.push(id);
        self.finish_reorder();
    }

    /// Move a layer just above the fixed bottom layers.
    pub fn send_to_back(&mut self, id: LayerId) {
        let Some(from) = self.reorderable_position(id) else {
            return;
        };
        let floor = self.first_unfixed_index();
        if from == floor {
            return;
        }
        let id = self.order.remove(from);
        self.order.insert(floor, id);
        self.finish_reorder();
    }

    /// Swap a layer with its upper neighbor.
    pub fn bring_forward(&mut self, id: LayerId) {
        let Some(from) = self.reorderable_position(id) else {
            return;
        };
        if from + 1 >= self.order.len() {
            return;
        }
        self.order.swap(from, from + 1);
        self.finish_reorder();
    }

    /// Swap a layer with its lower neighbor, never into the fixed range.
    pub fn send_backward(&mut self, id: LayerId) {
        let Some(from) = self.reorderable_position(id) else {
            return;
        };
        if from <= self.first_unfixed_index() {
            return;
        }
        self.order.swap(from, from - 1);
        self.finish_reorder();
    }

    pub fn toggle_visibility(&mut self, id: LayerId) {
        let Some(layer) = self.layers.get_mut(&id) else {
            tracing::warn!("toggle_visibility: unknown layer {}", id);
            return;
        };
        layer.visible = !layer.visible;
        let visible = layer.visible;
        self.events
            .push(MapperEvent::LayerVisibilityChanged { layer_id: id, visible });
    }

    pub fn toggle_lock(&mut self, id: LayerId) {
        let Some(layer) = self.layers.get_mut(&id) else {
            tracing::warn!("toggle_lock: unknown layer {}", id);
            return;
        };
        layer.locked = !layer.locked;
        let locked = layer.locked;
        self.events
            .push(MapperEvent::LayerLockChanged { layer_id: id, locked });
    }

    pub fn toggle_light_circle(&mut self, id: LayerId) {
        if let Some(layer) = self.light_layer_mut(id) {
            layer.circle_visible = !layer.circle_visible;
        }
    }

    pub fn toggle_light_brightness(&mut self, id: LayerId) {
        if let Some(layer) = self.light_layer_mut(id) {
            layer.brightness_visible = !layer.brightness_visible;
        }
    }

    pub fn toggle_light_label(&mut self, id: LayerId) {
        if let Some(layer) = self.light_layer_mut(id) {
            layer.label_visible = !layer.label_visible;
        }
    }

    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.name = name.into();
        }
    }

    /// Rebuild the model from a freshly loaded object list, pairing
    /// one layer per object in iteration order.
    pub fn rebuild_from<'a>(&mut self, objects: impl Iterator<Item = &'a FloorplanObject>) {
        self.layers.clear();
        self.order.clear();
        for object in objects {
            self.create_layer_for_object(object);
        }
        self.events.push(MapperEvent::LayerOrderChanged);
    }

    /// Drain events queued by layer mutations.
    pub fn take_events(&mut self) -> Vec<MapperEvent> {
        std::mem::take(&mut self.events)
    }

    fn light_layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        match self.layers.get_mut(&id) {
            Some(layer) if layer.object_type == ObjectType::Light => Some(layer),
            Some(_) => {
                tracing::warn!("Light toggle on non-light layer {}", id);
                None
            }
            None => {
                tracing::warn!("Light toggle on unknown layer {}", id);
                None
            }
        }
    }

    /// Index of the first layer above the fixed bottom range.
    fn first_unfixed_index(&self) -> usize {
        self.order
            .iter()
            .take_while(|id| {
                self.layers
                    .get(id)
                    .map(|l| l.is_fixed())
                    .unwrap_or(false)
            })
            .count()
    }

    /// Position of a known, reorderable layer; warn-and-None otherwise.
    fn reorderable_position(&self, id: LayerId) -> Option<usize> {
        match self.layers.get(&id) {
            Some(layer) if layer.is_fixed() => {
                tracing::warn!("z-order op on fixed layer {}", id);
                None
            }
            Some(_) => self.order.iter().position(|l| *l == id),
            None => {
                tracing::warn!("z-order op on unknown layer {}", id);
                None
            }
        }
    }

    fn finish_reorder(&mut self) {
        self.reindex();
        self.events.push(MapperEvent::LayerOrderChanged);
    }

    /// Recompute dense z-indices from the order sequence.
    fn reindex(&mut self) {
        for (i, id) in self.order.iter().enumerate() {
            if let Some(layer) = self.layers.get_mut(id) {
                layer.z_index = i;
            }
        }
    }
}

impl Default for LayerModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightmapper_types::{ObjectKind, Point};

    fn light() -> FloorplanObject {
        FloorplanObject::new_light(Point::new(0.0, 0.0))
    }

    fn background() -> FloorplanObject {
        FloorplanObject {
            id: uuid::Uuid::new_v4(),
            kind: ObjectKind::Background {
                image_url: None,
                opacity: 1.0,
            },
        }
    }

    fn assert_dense(model: &LayerModel) {
        let indices: Vec<usize> = model.ordered().map(|l| l.z_index).collect();
        let expected: Vec<usize> = (0..model.len()).collect();
        assert_eq!(indices, expected, "z-indices must be dense and ordered");
    }

    #[test]
    fn test_create_assigns_top_z_index() {
        let mut model = LayerModel::new();
        let a = model.create_layer_for_object(&light());
        let b = model.create_layer_for_object(&light());
        assert_eq!(model.get(a).unwrap().z_index, 0);
        assert_eq!(model.get(b).unwrap().z_index, 1);
        assert_dense(&model);
    }

    #[test]
    fn test_remove_keeps_indices_dense() {
        let mut model = LayerModel::new();
        let a = model.create_layer_for_object(&light());
        let b = model.create_layer_for_object(&light());
        let c = model.create_layer_for_object(&light());

        model.remove_layer(b);
        assert_eq!(model.len(), 2);
        assert_eq!(model.get(a).unwrap().z_index, 0);
        assert_eq!(model.get(c).unwrap().z_index, 1);
        assert_dense(&model);
    }

    #[test]
    fn test_density_after_random_mutations() {
        let mut model = LayerModel::new();
        let ids: Vec<LayerId> = (0..6)
            .map(|_| model.create_layer_for_object(&light()))
            .collect();
        model.remove_layer(ids[2]);
        model.reorder_layers(ids[0], ids[4]);
        model.bring_to_front(ids[1]);
        model.send_to_back(ids[5]);
        model.remove_layer(ids[4]);
        assert_dense(&model);
    }

    #[test]
    fn test_reorder_to_own_position_is_identity() {
        let mut model = LayerModel::new();
        let a = model.create_layer_for_object(&light());
        let b = model.create_layer_for_object(&light());
        let c = model.create_layer_for_object(&light());
        let before = model.order().to_vec();
        model.take_events();

        model.reorder_layers(b, b);
        assert_eq!(model.order(), &before[..]);
        assert!(model.take_events().is_empty(), "identity reorder emits nothing");

        // Moving the top layer to the front is equally a no-op.
        model.bring_to_front(c);
        assert_eq!(model.order(), &before[..]);
        assert!(model.take_events().is_empty());
        let _ = a;
    }

    #[test]
    fn test_reorder_moves_layer_to_target_position() {
        let mut model = LayerModel::new();
        let a = model.create_layer_for_object(&light());
        let b = model.create_layer_for_object(&light());
        let c = model.create_layer_for_object(&light());

        model.reorder_layers(c, a);
        assert_eq!(model.order(), &[c, a, b]);
        assert_dense(&model);
        assert!(model
            .take_events()
            .iter()
            .any(|e| matches!(e, MapperEvent::LayerOrderChanged)));
    }

    #[test]
    fn test_fixed_layers_never_move() {
        let mut model = LayerModel::new();
        let bg = model.create_layer_for_object(&background());
        let a = model.create_layer_for_object(&light());
        let b = model.create_layer_for_object(&light());

        // Background stays at the bottom regardless of creation order.
        assert_eq!(model.get(bg).unwrap().z_index, 0);

        model.bring_to_front(bg);
        model.reorder_layers(bg, b);
        model.reorder_layers(a, bg);
        assert_eq!(model.get(bg).unwrap().z_index, 0);

        // send_to_back stops above the fixed range.
        model.send_to_back(b);
        assert_eq!(model.order(), &[bg, b, a]);
        assert_dense(&model);
    }

    #[test]
    fn test_fixed_layer_created_late_sinks_below() {
        let mut model = LayerModel::new();
        let a = model.create_layer_for_object(&light());
        let bg = model.create_layer_for_object(&background());
        assert_eq!(model.get(bg).unwrap().z_index, 0);
        assert_eq!(model.get(a).unwrap().z_index, 1);
    }

    #[test]
    fn test_step_reorders() {
        let mut model = LayerModel::new();
        let a = model.create_layer_for_object(&light());
        let b = model.create_layer_for_object(&light());
        let c = model.create_layer_for_object(&light());

        model.bring_forward(a);
        assert_eq!(model.order(), &[b, a, c]);
        model.send_backward(c);
        assert_eq!(model.order(), &[b, c, a]);
        model.send_backward(b);
        assert_eq!(model.order(), &[b, c, a], "already at the bottom");
        assert_dense(&model);
    }

    #[test]
    fn test_unknown_ids_are_no_ops() {
        let mut model = LayerModel::new();
        let a = model.create_layer_for_object(&light());
        let ghost = uuid::Uuid::new_v4();

        model.remove_layer(ghost);
        model.toggle_visibility(ghost);
        model.toggle_lock(ghost);
        model.bring_to_front(ghost);
        model.reorder_layers(ghost, a);
        model.reorder_layers(a, ghost);

        assert_eq!(model.len(), 1);
        assert_eq!(model.get(a).unwrap().z_index, 0);
    }

    #[test]
    fn test_visibility_and_lock_toggles_emit_events() {
        let mut model = LayerModel::new();
        let a = model.create_layer_for_object(&light());

        model.toggle_visibility(a);
        assert!(!model.get(a).unwrap().visible);
        model.toggle_lock(a);
        assert!(model.get(a).unwrap().locked);

        let events = model.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, MapperEvent::LayerVisibilityChanged { visible: false, .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, MapperEvent::LayerLockChanged { locked: true, .. })));
    }

    #[test]
    fn test_light_flag_toggles_are_idempotent_pairs() {
        let mut model = LayerModel::new();
        let a = model.create_layer_for_object(&light());

        model.toggle_light_circle(a);
        model.toggle_light_circle(a);
        model.toggle_light_brightness(a);
        model.toggle_light_brightness(a);
        model.toggle_light_label(a);
        model.toggle_light_label(a);

        let layer = model.get(a).unwrap();
        assert!(layer.circle_visible);
        assert!(layer.brightness_visible);
        assert!(layer.label_visible);
    }

    #[test]
    fn test_light_flag_toggle_ignores_room_layer() {
        let mut model = LayerModel::new();
        let room = FloorplanObject::new_room(
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
            ],
            "Room",
        );
        let id = model.create_layer_for_object(&room);
        model.toggle_light_circle(id);
        assert!(model.get(id).unwrap().circle_visible);
    }
}
