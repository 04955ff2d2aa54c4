//! Entities panel: the Home Assistant light list and entity binding.

use crate::context::EditorContext;
use crate::panel::Panel;
use crate::state::AppMessage;

pub struct EntitiesPanel {
    filter: String,
}

impl EntitiesPanel {
    pub fn new() -> Self {
        Self {
            filter: String::new(),
        }
    }
}

impl Default for EntitiesPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel for EntitiesPanel {
    fn id(&self) -> &'static str {
        "entities"
    }

    fn title(&self) -> &'static str {
        "Entities"
    }

    fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut EditorContext) {
        ui.horizontal(|ui| {
            ui.label("Filter:");
            ui.text_edit_singleline(&mut self.filter);
            if ui.small_button("✕").clicked() {
                self.filter.clear();
            }
        });
        ui.separator();

        let selected_light = ctx
            .floorplan
            .selected_object()
            .filter(|o| o.is_light())
            .map(|o| o.id);
        if selected_light.is_none() {
            ui.weak("Select a light on the floorplan to assign an entity.");
        }

        let filter = self.filter.to_lowercase();
        let entities: Vec<(String, String, Option<u8>, bool)> = ctx
            .entities
            .sorted()
            .iter()
            .filter(|s| {
                filter.is_empty()
                    || s.entity_id.to_lowercase().contains(&filter)
                    || s.display_name().to_lowercase().contains(&filter)
            })
            .map(|s| {
                (
                    s.entity_id.clone(),
                    s.display_name().to_string(),
                    s.brightness_percent(),
                    s.is_on(),
                )
            })
            .collect();

        egui::ScrollArea::vertical().show(ui, |ui| {
            for (entity_id, name, brightness, is_on) in entities {
                let bound = ctx.floorplan.find_by_entity(&entity_id).map(|o| o.id);
                ui.horizontal(|ui| {
                    let dot = if is_on { "●" } else { "○" };
                    let color = if is_on {
                        egui::Color32::from_rgb(255, 210, 80)
                    } else {
                        egui::Color32::from_gray(110)
                    };
                    ui.colored_label(color, dot);
                    ui.label(&name);
                    if let Some(pct) = brightness {
                        ui.weak(format!("{}%", pct));
                    }
                    if bound.is_some() {
                        ui.weak("mapped");
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if let Some(light) = selected_light {
                            if ui.small_button("Assign").clicked() {
                                if ctx.assign_entity(light, entity_id.clone()) {
                                    ctx.set_status(format!("Assigned {}", entity_id));
                                } else {
                                    ctx.set_error("Selected object is not a light");
                                }
                            }
                        }
                        if let Some(bound_id) = bound {
                            if ui.small_button("Locate").clicked() {
                                ctx.floorplan.select(bound_id);
                            }
                        }
                    });
                })
                .response
                .on_hover_text(&entity_id);
            }
        });

        ui.separator();
        ui.horizontal(|ui| {
            ui.weak(format!(
                "{} entities in {} areas",
                ctx.entities.len(),
                ctx.areas.len()
            ));
            if ui.small_button("Reload").clicked() {
                let api = ctx.api.clone();
                let tx = ctx.tx.clone();
                let egui_ctx = ctx.egui_ctx.clone();
                crate::app::spawn_task(async move {
                    match api.list_lights().await {
                        Ok(lights) => {
                            let _ = tx.send(AppMessage::LightsLoaded(lights));
                        }
                        Err(e) => {
                            let _ = tx.send(AppMessage::LightsError(e.to_string()));
                        }
                    }
                    egui_ctx.request_repaint();
                });
            }
        });
    }
}
