//! The panel set registered with the panel manager.

mod debug_panel;
mod entities_panel;
mod layers_panel;
mod preview_panel;
mod properties_panel;
mod scenes_panel;

pub use debug_panel::DebugPanel;
pub use entities_panel::EntitiesPanel;
pub use layers_panel::LayersPanel;
pub use preview_panel::PreviewPanel;
pub use properties_panel::PropertiesPanel;
pub use scenes_panel::ScenesPanel;
