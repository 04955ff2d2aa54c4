//! Application state and channel-based IPC for async operations.

use std::sync::mpsc::{channel, Receiver, Sender};

use lightmapper_types::api::AreaInfo;
use lightmapper_types::{FloorplanLayout, LightState, MapperEvent, Scene, SceneId};

/// Messages sent from async operations to the main UI thread.
#[derive(Debug)]
pub enum AppMessage {
    /// Light entities loaded from the backend
    LightsLoaded(Vec<LightState>),
    /// Light loading failed
    LightsError(String),

    /// Areas loaded from the backend
    AreasLoaded(Vec<AreaInfo>),

    /// Scenes loaded from the backend
    ScenesLoaded(Vec<Scene>),
    /// Scene loading failed
    ScenesError(String),
    /// A scene was persisted (created or updated)
    SceneSaved(Scene),
    /// A scene was deleted
    SceneDeleted(SceneId),
    /// Scene persistence failed
    SceneError(String),
    /// A scene apply batch finished with aggregated results
    SceneApplyFinished {
        scene_id: Option<SceneId>,
        succeeded: usize,
        failed: usize,
    },

    /// Floorplan layout loaded from the backend (None: nothing saved yet)
    LayoutLoaded(Option<FloorplanLayout>),
    /// Layout loading failed
    LayoutError(String),
    /// Layout autosave completed
    LayoutSaved,

    /// Event received via the realtime client or raised by a task
    Event(MapperEvent),

    /// Realtime connection state changed
    ConnectionStateChanged(ConnectionState),

    /// Transient status-bar message
    Status(String),
}

/// Realtime client connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and no attempt in progress
    Disconnected,
    /// Opening the socket
    Connecting,
    /// Socket open, waiting for the auth handshake to complete
    Authenticating,
    /// Authenticated and subscribed to state changes
    Connected,
    /// Waiting out the backoff delay before the next attempt
    Reconnecting { attempt: u32 },
    /// Gave up after the configured number of attempts
    Failed { reason: String },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn description(&self) -> String {
        match self {
            ConnectionState::Disconnected => "Disconnected".to_string(),
            ConnectionState::Connecting => "Connecting".to_string(),
            ConnectionState::Authenticating => "Authenticating".to_string(),
            ConnectionState::Connected => "Connected".to_string(),
            ConnectionState::Reconnecting { attempt } => {
                format!("Reconnecting (attempt {})", attempt)
            }
            ConnectionState::Failed { reason } => format!("Connection failed: {}", reason),
        }
    }
}

/// Application state with channel-based communication.
pub struct AppStateChannels {
    /// Sender for app messages (cloned for each async operation)
    pub tx: Sender<AppMessage>,
    /// Receiver for app messages (owned by the main UI thread)
    pub rx: Receiver<AppMessage>,
}

impl AppStateChannels {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    /// Get a clone of the sender for use in async operations.
    pub fn sender(&self) -> Sender<AppMessage> {
        self.tx.clone()
    }
}

impl Default for AppStateChannels {
    fn default() -> Self {
        Self::new()
    }
}
