//! Main application structure.

mod constructors;
mod data_loading;
mod rendering;
mod update;

use crate::context::EditorContext;
use crate::panel::PanelManager;
use crate::state::AppStateChannels;

/// Spawn an async task on the app runtime.
pub(crate) fn spawn_task<F>(future: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(future);
}

/// The main LightMapper application: the composition root owning the
/// shared editor state and the panel manager.
pub struct LightMapperApp {
    pub(crate) editor: EditorContext,
    pub(crate) panels: PanelManager,
    pub(crate) channels: AppStateChannels,
    /// Initial data loads happen on the first frame, once the egui
    /// context is live.
    pub(crate) needs_initial_load: bool,
}
