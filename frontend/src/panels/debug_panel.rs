//! Debug panel: connection state and a rolling event log.

use std::collections::VecDeque;

use lightmapper_types::MapperEvent;

use crate::context::EditorContext;
use crate::panel::{Panel, PanelResult};
use crate::state::ConnectionState;

const LOG_CAPACITY: usize = 200;

pub struct DebugPanel {
    log: VecDeque<String>,
    paused: bool,
}

impl DebugPanel {
    pub fn new() -> Self {
        Self {
            log: VecDeque::with_capacity(LOG_CAPACITY),
            paused: false,
        }
    }
}

impl Default for DebugPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel for DebugPanel {
    fn id(&self) -> &'static str {
        "debug"
    }

    fn title(&self) -> &'static str {
        "Debug"
    }

    fn on_any_event(&mut self, event: &MapperEvent, _ctx: &mut EditorContext) -> PanelResult {
        if !self.paused {
            if self.log.len() == LOG_CAPACITY {
                self.log.pop_front();
            }
            self.log.push_back(event.description());
        }
        Ok(())
    }

    fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut EditorContext) {
        ui.horizontal(|ui| {
            ui.label("Connection:");
            let color = match ctx.connection {
                ConnectionState::Connected => egui::Color32::from_rgb(80, 200, 120),
                ConnectionState::Failed { .. } => egui::Color32::from_rgb(220, 80, 80),
                _ => egui::Color32::from_rgb(230, 180, 60),
            };
            ui.colored_label(color, ctx.connection.description());
        });
        ui.horizontal(|ui| {
            ui.weak(format!(
                "{} objects, {} layers, {} entities, {} scenes",
                ctx.floorplan.objects().count(),
                ctx.layers.len(),
                ctx.entities.len(),
                ctx.scenes.scenes.len()
            ));
        });
        ui.separator();

        ui.horizontal(|ui| {
            ui.checkbox(&mut self.paused, "Pause log");
            if ui.small_button("Clear").clicked() {
                self.log.clear();
            }
        });

        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &self.log {
                    ui.monospace(line);
                }
                if self.log.is_empty() {
                    ui.weak("No events yet.");
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_bounded() {
        let mut ctx = EditorContext::for_tests();
        let mut panel = DebugPanel::new();
        for _ in 0..(LOG_CAPACITY + 50) {
            panel
                .on_any_event(&MapperEvent::ScenesChanged, &mut ctx)
                .unwrap();
        }
        assert_eq!(panel.log.len(), LOG_CAPACITY);
    }
}
