//! Layer metadata for floorplan objects.
//!
//! A layer is the logical, reorderable, visibility/lock-bearing wrapper
//! around exactly one floorplan object. The layer does not own the
//! object; `object_id` is a back-reference maintained by the editor.

use crate::object::{FloorplanObject, ObjectId, ObjectKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a layer.
pub type LayerId = Uuid;

/// The kind of object a layer wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Light,
    Room,
    Text,
    Line,
    Background,
    Grid,
}

impl ObjectType {
    /// Background and grid layers are fixed: they never move in z-order
    /// and are excluded from reorder and drag operations.
    pub fn is_fixed(&self) -> bool {
        matches!(self, ObjectType::Background | ObjectType::Grid)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ObjectType::Light => "Light",
            ObjectType::Room => "Room",
            ObjectType::Text => "Text",
            ObjectType::Line => "Line",
            ObjectType::Background => "Background",
            ObjectType::Grid => "Grid",
        }
    }
}

impl From<&ObjectKind> for ObjectType {
    fn from(kind: &ObjectKind) -> Self {
        match kind {
            ObjectKind::Light { .. } => ObjectType::Light,
            ObjectKind::Room { .. } => ObjectType::Room,
            ObjectKind::Text { .. } => ObjectType::Text,
            ObjectKind::Line { .. } => ObjectType::Line,
            ObjectKind::Background { .. } => ObjectType::Background,
            ObjectKind::Grid { .. } => ObjectType::Grid,
        }
    }
}

/// One addressable, independently toggleable drawing element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    /// User-editable display name.
    pub name: String,
    /// Back-reference to the floorplan object this layer wraps.
    pub object_id: ObjectId,
    pub object_type: ObjectType,
    pub visible: bool,
    pub locked: bool,
    /// Ordinal position within the layer order. Dense: always exactly
    /// the index of this layer's id in the order sequence.
    pub z_index: usize,
    // Light-layer display flags; ignored for other object types.
    #[serde(default = "default_true")]
    pub circle_visible: bool,
    #[serde(default = "default_true")]
    pub brightness_visible: bool,
    #[serde(default = "default_true")]
    pub label_visible: bool,
}

fn default_true() -> bool {
    true
}

impl Layer {
    /// Create a layer wrapping the given object. The z-index is a
    /// placeholder until the layer model assigns its position.
    pub fn for_object(object: &FloorplanObject) -> Self {
        let object_type = ObjectType::from(&object.kind);
        Self {
            id: Uuid::new_v4(),
            name: object.display_name(),
            object_id: object.id,
            object_type,
            visible: true,
            locked: false,
            z_index: 0,
            circle_visible: true,
            brightness_visible: true,
            label_visible: true,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.object_type.is_fixed()
    }
}
