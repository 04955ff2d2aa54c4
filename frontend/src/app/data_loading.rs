use crate::state::AppMessage;

use super::*;

impl LightMapperApp {
    /// Load light entities from the backend.
    pub(super) fn load_lights(&mut self) {
        self.editor.set_status("Loading lights...");
        let api = self.editor.api.clone();
        let tx = self.channels.sender();
        let ctx = self.editor.egui_ctx.clone();

        spawn_task(async move {
            match api.list_lights().await {
                Ok(lights) => {
                    let _ = tx.send(AppMessage::LightsLoaded(lights));
                }
                Err(e) => {
                    tracing::error!("Failed to load lights: {}", e);
                    let _ = tx.send(AppMessage::LightsError(e.to_string()));
                }
            }
            ctx.request_repaint();
        });
    }

    /// Load areas for entity grouping.
    pub(super) fn load_areas(&mut self) {
        let api = self.editor.api.clone();
        let tx = self.channels.sender();
        let ctx = self.editor.egui_ctx.clone();

        spawn_task(async move {
            match api.list_areas().await {
                Ok(areas) => {
                    let _ = tx.send(AppMessage::AreasLoaded(areas));
                }
                Err(e) => {
                    // Areas are decorative; a failure is not surfaced.
                    tracing::warn!("Failed to load areas: {}", e);
                }
            }
            ctx.request_repaint();
        });
    }

    /// Load the persisted scene list.
    pub(super) fn load_scenes(&mut self) {
        let api = self.editor.api.clone();
        let tx = self.channels.sender();
        let ctx = self.editor.egui_ctx.clone();

        spawn_task(async move {
            match api.list_scenes().await {
                Ok(scenes) => {
                    let _ = tx.send(AppMessage::ScenesLoaded(scenes));
                }
                Err(e) => {
                    tracing::error!("Failed to load scenes: {}", e);
                    let _ = tx.send(AppMessage::ScenesError(e.to_string()));
                }
            }
            ctx.request_repaint();
        });
    }

    /// Load the saved floorplan layout.
    pub(super) fn load_layout(&mut self) {
        let api = self.editor.api.clone();
        let tx = self.channels.sender();
        let ctx = self.editor.egui_ctx.clone();

        spawn_task(async move {
            match api.get_layout().await {
                Ok(layout) => {
                    let _ = tx.send(AppMessage::LayoutLoaded(layout));
                }
                Err(e) => {
                    tracing::error!("Failed to load layout: {}", e);
                    let _ = tx.send(AppMessage::LayoutError(e.to_string()));
                }
            }
            ctx.request_repaint();
        });
    }

    /// Persist the current layout (debounced autosave target).
    pub(super) fn save_layout(&mut self) {
        let layout = self.editor.floorplan.to_layout();
        let api = self.editor.api.clone();
        let tx = self.channels.sender();
        let ctx = self.editor.egui_ctx.clone();

        spawn_task(async move {
            match api.save_layout(&layout).await {
                Ok(()) => {
                    let _ = tx.send(AppMessage::LayoutSaved);
                }
                Err(e) => {
                    tracing::error!("Failed to save layout: {}", e);
                    let _ = tx.send(AppMessage::LayoutError(e.to_string()));
                }
            }
            ctx.request_repaint();
        });
    }
}
