//! Layers panel: the reorderable stack of floorplan layers.

use lightmapper_types::{LayerId, ObjectId, ObjectType};

use crate::api::ZOrderOp;
use crate::app::spawn_task;
use crate::context::EditorContext;
use crate::panel::{Panel, PanelResult};

pub struct LayersPanel {
    /// Cached top-down view of the stack, rebuilt on layer events.
    rows: Vec<LayerId>,
    needs_rebuild: bool,
    selected_layer: Option<LayerId>,
    rename_buffer: String,
    renaming: Option<LayerId>,
}

impl LayersPanel {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            needs_rebuild: true,
            selected_layer: None,
            rename_buffer: String::new(),
            renaming: None,
        }
    }

    fn rebuild(&mut self, ctx: &EditorContext) {
        self.rows = ctx.layers.ordered_top_down().map(|l| l.id).collect();
        self.needs_rebuild = false;
    }

    /// Run a local z-order op and mirror it to the backend's
    /// idempotent per-layer endpoint.
    fn z_order(&self, ctx: &mut EditorContext, layer_id: LayerId, op: ZOrderOp) {
        match op {
            ZOrderOp::BringToFront => ctx.layers.bring_to_front(layer_id),
            ZOrderOp::SendToBack => ctx.layers.send_to_back(layer_id),
            ZOrderOp::BringForward => ctx.layers.bring_forward(layer_id),
            ZOrderOp::SendBackward => ctx.layers.send_backward(layer_id),
        }
        let api = ctx.api.clone();
        spawn_task(async move {
            if let Err(e) = api.layer_z_order(layer_id, op).await {
                tracing::warn!("Failed to persist z-order change: {}", e);
            }
        });
    }
}

impl Default for LayersPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel for LayersPanel {
    fn id(&self) -> &'static str {
        "layers"
    }

    fn title(&self) -> &'static str {
        "Layers"
    }

    fn refresh(&mut self, _ctx: &mut EditorContext) {
        self.needs_rebuild = true;
    }

    fn on_object_added(&mut self, _object_id: ObjectId, _ctx: &mut EditorContext) -> PanelResult {
        self.needs_rebuild = true;
        Ok(())
    }

    fn on_object_removed(&mut self, _object_id: ObjectId, _ctx: &mut EditorContext) -> PanelResult {
        self.needs_rebuild = true;
        Ok(())
    }

    fn on_layer_order_changed(&mut self, _ctx: &mut EditorContext) -> PanelResult {
        self.needs_rebuild = true;
        Ok(())
    }

    fn on_object_selected(&mut self, object_id: ObjectId, ctx: &mut EditorContext) -> PanelResult {
        self.selected_layer = ctx.layers.layer_for_object(object_id).map(|l| l.id);
        Ok(())
    }

    fn on_object_deselected(&mut self, _ctx: &mut EditorContext) -> PanelResult {
        self.selected_layer = None;
        Ok(())
    }

    fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut EditorContext) {
        if self.needs_rebuild {
            self.rebuild(ctx);
        }

        ui.horizontal(|ui| {
            ui.label(format!("{} layers", self.rows.len()));
            if let Some(layer_id) = self.selected_layer {
                if ui.small_button("Front").clicked() {
                    self.z_order(ctx, layer_id, ZOrderOp::BringToFront);
                }
                if ui.small_button("Back").clicked() {
                    self.z_order(ctx, layer_id, ZOrderOp::SendToBack);
                }
            }
        });
        ui.separator();

        let rows = self.rows.clone();
        egui::ScrollArea::vertical().show(ui, |ui| {
            for layer_id in rows {
                let Some(layer) = ctx.layers.get(layer_id) else {
                    self.needs_rebuild = true;
                    continue;
                };
                let layer_name = layer.name.clone();
                let object_id = layer.object_id;
                let object_type = layer.object_type;
                let visible = layer.visible;
                let locked = layer.locked;
                let fixed = layer.is_fixed();
                let is_selected = self.selected_layer == Some(layer_id);

                ui.horizontal(|ui| {
                    let eye = if visible { "👁" } else { "–" };
                    if ui.small_button(eye).on_hover_text("Toggle visibility").clicked() {
                        ctx.layers.toggle_visibility(layer_id);
                    }
                    let lock = if locked { "🔒" } else { "🔓" };
                    if ui.small_button(lock).on_hover_text("Toggle lock").clicked() {
                        ctx.layers.toggle_lock(layer_id);
                    }

                    if self.renaming == Some(layer_id) {
                        let response = ui.text_edit_singleline(&mut self.rename_buffer);
                        if response.lost_focus() {
                            ctx.layers
                                .rename_layer(layer_id, self.rename_buffer.trim().to_string());
                            self.renaming = None;
                        }
                    } else {
                        let label = ui.selectable_label(
                            is_selected,
                            format!("{} ({})", layer_name, object_type.label()),
                        );
                        if label.clicked() && !fixed {
                            ctx.floorplan.select(object_id);
                        }
                        if label.double_clicked() && !fixed {
                            self.renaming = Some(layer_id);
                            self.rename_buffer = layer_name;
                        }
                    }

                    if fixed {
                        return;
                    }
                    if ui.small_button("▲").on_hover_text("Bring forward").clicked() {
                        self.z_order(ctx, layer_id, ZOrderOp::BringForward);
                    }
                    if ui.small_button("▼").on_hover_text("Send backward").clicked() {
                        self.z_order(ctx, layer_id, ZOrderOp::SendBackward);
                    }
                    if ui.small_button("✕").on_hover_text("Delete layer").clicked() {
                        ctx.remove_layer(layer_id);
                    }
                });

                if object_type == ObjectType::Light && is_selected {
                    let Some(layer) = ctx.layers.get(layer_id) else {
                        continue;
                    };
                    let (mut circle, mut brightness, mut label) = (
                        layer.circle_visible,
                        layer.brightness_visible,
                        layer.label_visible,
                    );
                    ui.indent(layer_id, |ui| {
                        ui.horizontal(|ui| {
                            if ui.checkbox(&mut circle, "Circle").changed() {
                                ctx.layers.toggle_light_circle(layer_id);
                            }
                            if ui.checkbox(&mut brightness, "Brightness").changed() {
                                ctx.layers.toggle_light_brightness(layer_id);
                            }
                            if ui.checkbox(&mut label, "Label").changed() {
                                ctx.layers.toggle_light_label(layer_id);
                            }
                        });
                    });
                }
            }
        });
    }
}
