use egui::{Color32, Context};

use lightmapper_types::DisplayMode;

use crate::floorplan::{interaction, Tool};
use crate::state::ConnectionState;

use super::*;

impl LightMapperApp {
    pub(super) fn draw(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("LightMapper");
                ui.separator();

                for tool in [
                    Tool::Select,
                    Tool::PlaceLight,
                    Tool::DrawRoom,
                    Tool::PlaceText,
                    Tool::DrawLine,
                ] {
                    if ui
                        .selectable_label(self.editor.tool == tool, tool.label())
                        .clicked()
                    {
                        self.editor.tool = tool;
                        self.editor.floorplan.draw_points.clear();
                        self.editor.floorplan.line_start = None;
                    }
                }
                ui.separator();

                let mode = self.editor.floorplan.display_mode();
                if ui
                    .selectable_label(mode == DisplayMode::CurrentState, "Live")
                    .on_hover_text("Render lights from live entity state")
                    .clicked()
                {
                    self.editor.set_display_mode(DisplayMode::CurrentState);
                }
                if ui
                    .selectable_label(mode == DisplayMode::ScenePreview, "Preview")
                    .on_hover_text("Render lights from the scene draft")
                    .clicked()
                {
                    self.editor.set_display_mode(DisplayMode::ScenePreview);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let (dot, color) = match &self.editor.connection {
                        ConnectionState::Connected => ("●", Color32::from_rgb(80, 200, 120)),
                        ConnectionState::Failed { .. } => ("●", Color32::from_rgb(220, 80, 80)),
                        _ => ("●", Color32::from_rgb(230, 180, 60)),
                    };
                    ui.colored_label(color, dot)
                        .on_hover_text(self.editor.connection.description());
                    if ui.small_button("⟳").on_hover_text("Reload data").clicked() {
                        self.load_lights();
                        self.load_scenes();
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match &self.editor.error {
                    Some(error) => {
                        ui.colored_label(Color32::from_rgb(220, 80, 80), error);
                    }
                    None => {
                        ui.label(&self.editor.status);
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(format!("zoom {:.0}%", self.editor.floorplan.zoom * 100.0));
                });
            });
        });

        egui::SidePanel::right("panel_dock")
            .default_width(340.0)
            .show(ctx, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for (id, title) in self.panels.tabs() {
                        let active = self.panels.active_id() == Some(id);
                        if ui.selectable_label(active, title).clicked() {
                            self.panels.show_panel(id, &mut self.editor);
                        }
                    }
                });
                ui.separator();
                self.panels.ui_active(ui, &mut self.editor);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            interaction::canvas_ui(&mut self.editor, ui);
        });
    }
}
