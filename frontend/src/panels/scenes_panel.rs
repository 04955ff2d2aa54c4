//! Scenes panel: persisted scene list plus the draft editor.

use lightmapper_types::{DisplayMode, Scene, SceneId, SceneLight};

use crate::app::spawn_task;
use crate::context::EditorContext;
use crate::panel::{Panel, PanelResult};
use crate::scenes::{capture_scene_lights, validate_scene};
use crate::state::AppMessage;

/// Deferred panel actions, executed after the draft borrow ends.
enum SceneAction {
    Open(Scene),
    Apply(Scene),
    Delete(SceneId),
    Save,
    Revert,
    Capture,
    RemoveRow(String),
}

pub struct ScenesPanel {
    applying: bool,
}

impl ScenesPanel {
    pub fn new() -> Self {
        Self { applying: false }
    }

    fn save_draft(&self, ctx: &mut EditorContext) {
        let Some(draft) = ctx.scenes.draft.clone() else {
            return;
        };
        if let Err(message) = validate_scene(&draft) {
            ctx.set_error(message);
            return;
        }

        let api = ctx.api.clone();
        let tx = ctx.tx.clone();
        let egui_ctx = ctx.egui_ctx.clone();
        ctx.set_status(format!("Saving scene '{}'...", draft.name));
        spawn_task(async move {
            let result = match draft.id {
                Some(id) => api.update_scene(id, &draft).await,
                None => api.create_scene(&draft).await,
            };
            match result {
                Ok(scene) => {
                    let _ = tx.send(AppMessage::SceneSaved(scene));
                }
                Err(e) => {
                    let _ = tx.send(AppMessage::SceneError(e.to_string()));
                }
            }
            egui_ctx.request_repaint();
        });
    }

    fn apply(&mut self, ctx: &mut EditorContext, scene: Scene) {
        if let Err(message) = validate_scene(&scene) {
            ctx.set_error(message);
            return;
        }
        let Some(ha) = ctx.ha.clone() else {
            ctx.set_error("Not connected to Home Assistant");
            return;
        };
        self.applying = true;
        let tx = ctx.tx.clone();
        let egui_ctx = ctx.egui_ctx.clone();
        ctx.set_status(format!("Applying scene '{}'...", scene.name));
        spawn_task(async move {
            let (succeeded, failed) = crate::scenes::apply_scene(&ha, &scene).await;
            let _ = tx.send(AppMessage::SceneApplyFinished {
                scene_id: scene.id,
                succeeded,
                failed,
            });
            egui_ctx.request_repaint();
        });
    }

    fn delete(&self, ctx: &mut EditorContext, id: SceneId) {
        let api = ctx.api.clone();
        let tx = ctx.tx.clone();
        let egui_ctx = ctx.egui_ctx.clone();
        spawn_task(async move {
            match api.delete_scene(id).await {
                Ok(()) => {
                    let _ = tx.send(AppMessage::SceneDeleted(id));
                }
                Err(e) => {
                    let _ = tx.send(AppMessage::SceneError(e.to_string()));
                }
            }
            egui_ctx.request_repaint();
        });
    }
}

impl Default for ScenesPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel for ScenesPanel {
    fn id(&self) -> &'static str {
        "scenes"
    }

    fn title(&self) -> &'static str {
        "Scenes"
    }

    fn on_scene_applied(
        &mut self,
        _scene_id: Option<SceneId>,
        _succeeded: usize,
        _failed: usize,
        _ctx: &mut EditorContext,
    ) -> PanelResult {
        self.applying = false;
        Ok(())
    }

    fn on_hide(&mut self, ctx: &mut EditorContext) {
        // Leaving the panel drops out of preview mode so the canvas
        // shows live state again.
        ctx.set_display_mode(DisplayMode::CurrentState);
    }

    fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut EditorContext) {
        let mut action: Option<SceneAction> = None;

        ui.horizontal(|ui| {
            if ui.button("New scene").clicked() {
                ctx.scenes.open_new();
            }
            let mut preview = ctx.floorplan.display_mode() == DisplayMode::ScenePreview;
            if ui.checkbox(&mut preview, "Preview on canvas").changed() {
                ctx.set_display_mode(if preview {
                    DisplayMode::ScenePreview
                } else {
                    DisplayMode::CurrentState
                });
            }
        });
        ui.separator();

        // Persisted scene list.
        let scenes = ctx.scenes.scenes.clone();
        egui::ScrollArea::vertical()
            .id_salt("scene_list")
            .max_height(160.0)
            .show(ui, |ui| {
                for scene in &scenes {
                    ui.horizontal(|ui| {
                        let open = ctx.scenes.draft.as_ref().and_then(|d| d.id) == scene.id
                            && scene.id.is_some();
                        if ui
                            .selectable_label(open, format!("{} ({})", scene.name, scene.lights.len()))
                            .clicked()
                        {
                            action = Some(SceneAction::Open(scene.clone()));
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if let Some(id) = scene.id {
                                if ui.small_button("✕").on_hover_text("Delete").clicked() {
                                    action = Some(SceneAction::Delete(id));
                                }
                            }
                            if ui
                                .add_enabled(!self.applying, egui::Button::new("Apply").small())
                                .clicked()
                            {
                                action = Some(SceneAction::Apply(scene.clone()));
                            }
                        });
                    });
                }
                if scenes.is_empty() {
                    ui.weak("No scenes saved yet.");
                }
            });

        ui.separator();

        // Draft editor.
        let dirty = ctx.scenes.is_dirty();
        if let Some(draft) = ctx.scenes.draft.as_mut() {
            ui.horizontal(|ui| {
                ui.label("Name:");
                ui.text_edit_singleline(&mut draft.name);
            });

            egui::ScrollArea::vertical().id_salt("draft_rows").show(ui, |ui| {
                for light in draft.lights.iter_mut() {
                    ui.group(|ui| {
                        ui.horizontal(|ui| {
                            ui.monospace(&light.entity_id);
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if ui.small_button("✕").clicked() {
                                        action =
                                            Some(SceneAction::RemoveRow(light.entity_id.clone()));
                                    }
                                },
                            );
                        });

                        scene_light_row(ui, light);
                    });
                }
            });

            ui.horizontal(|ui| {
                if ui.button("Capture current state").clicked() {
                    action = Some(SceneAction::Capture);
                }
                if ui.button("Save").clicked() {
                    action = Some(SceneAction::Save);
                }
                if ui
                    .add_enabled(dirty, egui::Button::new("Revert"))
                    .clicked()
                {
                    action = Some(SceneAction::Revert);
                }
            });
        } else {
            ui.weak("Open a scene or create a new one to edit it.");
        }

        match action {
            Some(SceneAction::Open(scene)) => ctx.scenes.open(scene),
            Some(SceneAction::Apply(scene)) => self.apply(ctx, scene),
            Some(SceneAction::Delete(id)) => self.delete(ctx, id),
            Some(SceneAction::Save) => self.save_draft(ctx),
            Some(SceneAction::Revert) => ctx.scenes.revert(),
            Some(SceneAction::Capture) => {
                let captured = capture_scene_lights(&ctx.floorplan, &ctx.entities);
                if captured.is_empty() {
                    ctx.set_error("No bound lights are on; nothing to capture");
                } else if let Some(draft) = ctx.scenes.draft.as_mut() {
                    let count = captured.len();
                    for light in captured {
                        draft.upsert_light(light);
                    }
                    ctx.set_status(format!("Captured {} lights", count));
                }
            }
            Some(SceneAction::RemoveRow(entity_id)) => {
                if let Some(draft) = ctx.scenes.draft.as_mut() {
                    draft.remove_light(&entity_id);
                }
            }
            None => {}
        }
    }
}

/// Editable fields of one scene row. Each property can be constrained
/// or left unset independently.
fn scene_light_row(ui: &mut egui::Ui, light: &mut SceneLight) {
    ui.horizontal(|ui| {
        let mut has_brightness = light.brightness.is_some();
        if ui.checkbox(&mut has_brightness, "Brightness").changed() {
            light.brightness = has_brightness.then_some(light.brightness.unwrap_or(128));
        }
        if let Some(brightness) = light.brightness.as_mut() {
            ui.add(
                egui::Slider::new(brightness, 0..=255)
                    .custom_formatter(|v, _| format!("{:.0}%", v / 255.0 * 100.0)),
            );
        }
    });

    ui.horizontal(|ui| {
        let mut has_temp = light.color_temp.is_some();
        if ui.checkbox(&mut has_temp, "Kelvin").changed() {
            light.color_temp = has_temp.then_some(light.color_temp.unwrap_or(2700));
        }
        if let Some(color_temp) = light.color_temp.as_mut() {
            ui.add(egui::Slider::new(color_temp, 2000..=6500).suffix(" K"));
        }
    });

    ui.horizontal(|ui| {
        let mut has_color = light.hue.is_some() && light.saturation.is_some();
        if ui.checkbox(&mut has_color, "Color").changed() {
            if has_color {
                light.hue.get_or_insert(30.0);
                light.saturation.get_or_insert(100.0);
            } else {
                light.hue = None;
                light.saturation = None;
            }
        }
        if let (Some(hue), Some(saturation)) = (light.hue.as_mut(), light.saturation.as_mut()) {
            ui.add(egui::Slider::new(hue, 0.0..=360.0).suffix("°"));
            ui.add(egui::Slider::new(saturation, 0.0..=100.0).suffix("%"));
        }
    });
}
