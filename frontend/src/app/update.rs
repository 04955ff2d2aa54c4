use std::time::Instant;

use egui::Context;

use lightmapper_types::MapperEvent;

use crate::state::AppMessage;

use super::*;

impl eframe::App for LightMapperApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if self.needs_initial_load {
            self.needs_initial_load = false;
            self.load_lights();
            self.load_areas();
            self.load_scenes();
            self.load_layout();
        }

        // Process all pending channel messages from async tasks.
        while let Ok(msg) = self.channels.rx.try_recv() {
            self.handle_message(msg);
        }

        // Broadcast events queued by completed mutations. Draining
        // happens strictly after the mutations that queued them, so
        // panels always observe post-mutation state.
        for event in self.editor.take_events() {
            self.panels.broadcast(&event, &mut self.editor);
        }

        if self.editor.autosave_due(Instant::now()) {
            self.save_layout();
        }

        self.draw(ctx);
    }
}

impl LightMapperApp {
    fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::LightsLoaded(lights) => {
                let count = lights.len();
                self.editor.entities.replace_all(lights);
                self.editor.set_status(format!("Loaded {} lights", count));
            }
            AppMessage::LightsError(e) => {
                self.editor.set_error(format!("Loading lights failed: {}", e));
            }
            AppMessage::AreasLoaded(areas) => {
                self.editor.areas = areas;
            }
            AppMessage::ScenesLoaded(scenes) => {
                self.editor.scenes.scenes = scenes;
                self.panels
                    .broadcast(&MapperEvent::ScenesChanged, &mut self.editor);
            }
            AppMessage::ScenesError(e) => {
                self.editor.set_error(format!("Loading scenes failed: {}", e));
            }
            AppMessage::SceneSaved(scene) => {
                self.editor.set_status(format!("Saved scene '{}'", scene.name));
                self.editor.scenes.mark_saved(scene);
                self.panels
                    .broadcast(&MapperEvent::ScenesChanged, &mut self.editor);
            }
            AppMessage::SceneDeleted(id) => {
                self.editor.scenes.forget(id);
                self.editor.set_status("Scene deleted");
                self.panels
                    .broadcast(&MapperEvent::ScenesChanged, &mut self.editor);
            }
            AppMessage::SceneError(e) => {
                self.editor.set_error(format!("Scene operation failed: {}", e));
            }
            AppMessage::SceneApplyFinished {
                scene_id,
                succeeded,
                failed,
            } => {
                if failed == 0 {
                    self.editor
                        .set_status(format!("Scene applied to {} lights", succeeded));
                } else {
                    self.editor.set_error(format!(
                        "Scene applied: {} ok, {} failed",
                        succeeded, failed
                    ));
                }
                self.panels.broadcast(
                    &MapperEvent::SceneApplied {
                        scene_id,
                        succeeded,
                        failed,
                    },
                    &mut self.editor,
                );
            }
            AppMessage::LayoutLoaded(Some(layout)) => {
                let objects = layout.objects.len();
                self.editor.load_layout(layout);
                self.panels.refresh_all(&mut self.editor);
                self.editor
                    .set_status(format!("Loaded layout ({} objects)", objects));
            }
            AppMessage::LayoutLoaded(None) => {
                self.editor.set_status("No saved layout; starting fresh");
            }
            AppMessage::LayoutError(e) => {
                self.editor.set_error(format!("Layout error: {}", e));
            }
            AppMessage::LayoutSaved => {
                self.editor.set_status("Layout saved");
            }
            AppMessage::Event(event) => {
                // Patch the entity cache before the broadcast so every
                // handler sees the post-change state.
                if let MapperEvent::LightStateChanged { state, .. } = &event {
                    self.editor.entities.update(state.clone());
                }
                self.panels.broadcast(&event, &mut self.editor);
            }
            AppMessage::ConnectionStateChanged(state) => {
                tracing::debug!("Connection: {}", state.description());
                self.editor.connection = state;
            }
            AppMessage::Status(message) => {
                self.editor.set_status(message);
            }
        }
    }
}
