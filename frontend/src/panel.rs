//! Panel registry, lifecycle host and event broadcast.
//!
//! Panels are independent views registered with the [`PanelManager`].
//! The manager owns which panel is visible, routes lifecycle calls and
//! fans domain events out to every registered panel. Dispatch is typed:
//! each [`MapperEvent`] variant maps to one trait method with a default
//! no-op body, so a panel implements only the handlers it needs and a
//! typo in an event name is a compile error rather than a dead handler.

use lightmapper_types::{DisplayMode, LayerId, LightState, MapperEvent, ObjectId, SceneId};

use crate::context::EditorContext;

pub type PanelResult = Result<(), PanelError>;

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("panel id `{0}` is already registered")]
    DuplicateId(String),
    #[error("panel has an empty id or title")]
    IncompleteIdentity,
    #[error("{0}")]
    Handler(String),
}

/// A registered view. Lifecycle transitions (registered → shown ⇄
/// hidden) are driven only by [`PanelManager`] calls, never by the
/// panel itself.
pub trait Panel {
    fn id(&self) -> &'static str;
    fn title(&self) -> &'static str;

    /// One-time setup after registration.
    fn init(&mut self, _ctx: &mut EditorContext) {}
    /// The panel became the visible one.
    fn on_show(&mut self, _ctx: &mut EditorContext) {}
    /// Another panel took over; release timers and transient state here.
    fn on_hide(&mut self, _ctx: &mut EditorContext) {}
    /// Re-derive cached views from shared state.
    fn refresh(&mut self, _ctx: &mut EditorContext) {}

    /// Draw the panel. Only called while this panel is the visible one.
    fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut EditorContext);

    /// Called for every broadcast event, before the per-event handler.
    fn on_any_event(&mut self, _event: &MapperEvent, _ctx: &mut EditorContext) -> PanelResult {
        Ok(())
    }

    fn on_object_selected(&mut self, _object_id: ObjectId, _ctx: &mut EditorContext) -> PanelResult {
        Ok(())
    }
    fn on_object_deselected(&mut self, _ctx: &mut EditorContext) -> PanelResult {
        Ok(())
    }
    fn on_object_added(&mut self, _object_id: ObjectId, _ctx: &mut EditorContext) -> PanelResult {
        Ok(())
    }
    fn on_object_removed(&mut self, _object_id: ObjectId, _ctx: &mut EditorContext) -> PanelResult {
        Ok(())
    }
    fn on_light_modified(&mut self, _object_id: ObjectId, _ctx: &mut EditorContext) -> PanelResult {
        Ok(())
    }
    fn on_object_modified(&mut self, _object_id: ObjectId, _ctx: &mut EditorContext) -> PanelResult {
        Ok(())
    }
    fn on_light_entity_assigned(
        &mut self,
        _object_id: ObjectId,
        _entity_id: &str,
        _ctx: &mut EditorContext,
    ) -> PanelResult {
        Ok(())
    }
    fn on_layer_visibility_changed(
        &mut self,
        _layer_id: LayerId,
        _visible: bool,
        _ctx: &mut EditorContext,
    ) -> PanelResult {
        Ok(())
    }
    fn on_layer_lock_changed(
        &mut self,
        _layer_id: LayerId,
        _locked: bool,
        _ctx: &mut EditorContext,
    ) -> PanelResult {
        Ok(())
    }
    fn on_layer_order_changed(&mut self, _ctx: &mut EditorContext) -> PanelResult {
        Ok(())
    }
    fn on_display_mode_changed(
        &mut self,
        _mode: DisplayMode,
        _ctx: &mut EditorContext,
    ) -> PanelResult {
        Ok(())
    }
    fn on_light_state_changed(
        &mut self,
        _entity_id: &str,
        _state: &LightState,
        _ctx: &mut EditorContext,
    ) -> PanelResult {
        Ok(())
    }
    fn on_state_changed(
        &mut self,
        _entity_id: &str,
        _state: &LightState,
        _ctx: &mut EditorContext,
    ) -> PanelResult {
        Ok(())
    }
    fn on_scenes_changed(&mut self, _ctx: &mut EditorContext) -> PanelResult {
        Ok(())
    }
    fn on_scene_applied(
        &mut self,
        _scene_id: Option<SceneId>,
        _succeeded: usize,
        _failed: usize,
        _ctx: &mut EditorContext,
    ) -> PanelResult {
        Ok(())
    }
}

/// Route one event to the matching typed handler.
fn dispatch(panel: &mut dyn Panel, event: &MapperEvent, ctx: &mut EditorContext) -> PanelResult {
    let any = panel.on_any_event(event, ctx);
    let specific = match event {
        MapperEvent::ObjectSelected { object_id } => panel.on_object_selected(*object_id, ctx),
        MapperEvent::ObjectDeselected => panel.on_object_deselected(ctx),
        MapperEvent::ObjectAdded { object_id } => panel.on_object_added(*object_id, ctx),
        MapperEvent::ObjectRemoved { object_id } => panel.on_object_removed(*object_id, ctx),
        MapperEvent::LightModified { object_id } => panel.on_light_modified(*object_id, ctx),
        MapperEvent::ObjectModified { object_id } => panel.on_object_modified(*object_id, ctx),
        MapperEvent::LightEntityAssigned {
            object_id,
            entity_id,
        } => panel.on_light_entity_assigned(*object_id, entity_id, ctx),
        MapperEvent::LayerVisibilityChanged { layer_id, visible } => {
            panel.on_layer_visibility_changed(*layer_id, *visible, ctx)
        }
        MapperEvent::LayerLockChanged { layer_id, locked } => {
            panel.on_layer_lock_changed(*layer_id, *locked, ctx)
        }
        MapperEvent::LayerOrderChanged => panel.on_layer_order_changed(ctx),
        MapperEvent::DisplayModeChanged { mode } => panel.on_display_mode_changed(*mode, ctx),
        MapperEvent::LightStateChanged { entity_id, state } => {
            panel.on_light_state_changed(entity_id, state, ctx)
        }
        MapperEvent::StateChanged { entity_id, state } => {
            panel.on_state_changed(entity_id, state, ctx)
        }
        MapperEvent::ScenesChanged => panel.on_scenes_changed(ctx),
        MapperEvent::SceneApplied {
            scene_id,
            succeeded,
            failed,
        } => panel.on_scene_applied(*scene_id, *succeeded, *failed, ctx),
    };
    any.and(specific)
}

/// Registry of named panels. Exactly one panel is visible at a time.
pub struct PanelManager {
    panels: Vec<Box<dyn Panel>>,
    active: Option<String>,
}

impl PanelManager {
    pub fn new() -> Self {
        Self {
            panels: Vec::new(),
            active: None,
        }
    }

    /// Register a panel. Ids must be unique and non-empty.
    pub fn register(&mut self, panel: Box<dyn Panel>) -> Result<(), PanelError> {
        if panel.id().is_empty() || panel.title().is_empty() {
            return Err(PanelError::IncompleteIdentity);
        }
        if self.panels.iter().any(|p| p.id() == panel.id()) {
            return Err(PanelError::DuplicateId(panel.id().to_string()));
        }
        self.panels.push(panel);
        Ok(())
    }

    /// One-time init of every registered panel, then show the default.
    pub fn init(&mut self, default_panel: &str, ctx: &mut EditorContext) {
        for panel in &mut self.panels {
            panel.init(ctx);
        }
        self.show_panel(default_panel, ctx);
    }

    /// Switch the visible panel. Unknown ids are a no-op; showing the
    /// already-active panel does nothing.
    pub fn show_panel(&mut self, id: &str, ctx: &mut EditorContext) {
        if !self.panels.iter().any(|p| p.id() == id) {
            tracing::warn!("Unknown panel id `{}`", id);
            return;
        }
        if self.active.as_deref() == Some(id) {
            return;
        }
        if let Some(current) = self.active.take() {
            if let Some(panel) = self.panels.iter_mut().find(|p| p.id() == current) {
                panel.on_hide(ctx);
            }
        }
        if let Some(panel) = self.panels.iter_mut().find(|p| p.id() == id) {
            panel.on_show(ctx);
        }
        self.active = Some(id.to_string());
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Panel instance by id; callers treat the panel system as optional.
    pub fn get_panel(&self, id: &str) -> Option<&dyn Panel> {
        self.panels.iter().find(|p| p.id() == id).map(|p| p.as_ref())
    }

    /// Ids and titles in registration order, for the tab bar.
    pub fn tabs(&self) -> Vec<(&'static str, &'static str)> {
        self.panels.iter().map(|p| (p.id(), p.title())).collect()
    }

    pub fn refresh_panel(&mut self, id: &str, ctx: &mut EditorContext) {
        if let Some(panel) = self.panels.iter_mut().find(|p| p.id() == id) {
            panel.refresh(ctx);
        }
    }

    pub fn refresh_all(&mut self, ctx: &mut EditorContext) {
        for panel in &mut self.panels {
            panel.refresh(ctx);
        }
    }

    /// Deliver one event to every panel in registration order. A
    /// failing handler is logged and never prevents delivery to the
    /// remaining panels.
    pub fn broadcast(&mut self, event: &MapperEvent, ctx: &mut EditorContext) {
        for panel in &mut self.panels {
            if let Err(e) = dispatch(panel.as_mut(), event, ctx) {
                tracing::warn!(
                    "Panel `{}` failed handling `{}`: {}",
                    panel.id(),
                    event.description(),
                    e
                );
            }
        }
    }

    /// Draw the active panel.
    pub fn ui_active(&mut self, ui: &mut egui::Ui, ctx: &mut EditorContext) {
        let Some(active) = self.active.clone() else {
            return;
        };
        if let Some(panel) = self.panels.iter_mut().find(|p| p.id() == active) {
            panel.ui(ui, ctx);
        }
    }
}

impl Default for PanelManager {
    fn default() -> Self {
        Self::new()
    }
}
