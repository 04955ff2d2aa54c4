use crate::api::ApiClient;
use crate::context::EditorContext;
use crate::ha::{HaClient, HaConfig};
use crate::panel::{Panel, PanelManager};
use crate::panels::{
    DebugPanel, EntitiesPanel, LayersPanel, PreviewPanel, PropertiesPanel, ScenesPanel,
};
use crate::settings::AppSettings;
use crate::state::AppStateChannels;

use super::*;

impl LightMapperApp {
    /// Create the application: build the shared state once and inject
    /// it everywhere, start the realtime client, register the panels.
    pub fn new(cc: &eframe::CreationContext<'_>, api_base_url: String, ha_ws_url: String) -> Self {
        let channels = AppStateChannels::new();
        let settings = AppSettings::load();
        let api = ApiClient::new(api_base_url);

        let mut editor = EditorContext::new(
            api.clone(),
            channels.sender(),
            cc.egui_ctx.clone(),
            settings,
        );

        editor.ha = Some(HaClient::connect(
            HaConfig::new(ha_ws_url),
            api,
            channels.sender(),
            cc.egui_ctx.clone(),
        ));

        let mut panels = PanelManager::new();
        let all_panels: Vec<Box<dyn Panel>> = vec![
            Box::new(LayersPanel::new()),
            Box::new(EntitiesPanel::new()),
            Box::new(ScenesPanel::new()),
            Box::new(PropertiesPanel::new()),
            Box::new(PreviewPanel::new()),
            Box::new(DebugPanel::new()),
        ];
        for panel in all_panels {
            let id = panel.id();
            if let Err(e) = panels.register(panel) {
                tracing::error!("Failed to register panel `{}`: {}", id, e);
            }
        }
        panels.init("layers", &mut editor);

        Self {
            editor,
            panels,
            channels,
            needs_initial_load: true,
        }
    }
}
