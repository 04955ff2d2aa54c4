//! The floorplan object model.
//!
//! Objects form a plain domain arena keyed by id. The drawing surface
//! renders them as a projection; edits flow id -> domain mutation ->
//! re-render, never the other way around. The serde derives on these
//! types are the persistence allow-list: a field that is not declared
//! here does not survive a save/reload cycle.

use crate::entity::EntityId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a floorplan object.
pub type ObjectId = Uuid;

/// A point in floorplan pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Visual style of a light marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightStyle {
    #[default]
    Bulb,
    Spot,
    Strip,
}

/// Global rendering source for bound lights. Never mixed per-object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Render from the entity's live state.
    #[default]
    CurrentState,
    /// Render from the in-progress scene draft.
    ScenePreview,
}

/// Type-specific data of a floorplan object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectKind {
    Light {
        position: Point,
        radius: f32,
        #[serde(default)]
        style: LightStyle,
        /// Binding to an external entity; an unbound light is valid.
        #[serde(default)]
        entity_id: Option<EntityId>,
    },
    Room {
        /// Closed polygon corners in winding order, at least 3.
        points: Vec<Point>,
        name: String,
        /// Hex color, e.g. `#4CAF50`.
        fill_color: String,
        /// Wall height in meters, used by the 3D preview.
        wall_height: f32,
    },
    Text {
        position: Point,
        content: String,
        size: f32,
    },
    Line {
        from: Point,
        to: Point,
        width: f32,
    },
    Background {
        #[serde(default)]
        image_url: Option<String>,
        opacity: f32,
    },
    Grid {
        spacing: f32,
    },
}

/// One drawable placed on the floorplan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorplanObject {
    pub id: ObjectId,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

impl FloorplanObject {
    pub fn new_light(position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ObjectKind::Light {
                position,
                radius: 18.0,
                style: LightStyle::default(),
                entity_id: None,
            },
        }
    }

    pub fn new_room(points: Vec<Point>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ObjectKind::Room {
                points,
                name: name.into(),
                fill_color: "#3a6ea5".to_string(),
                wall_height: 2.4,
            },
        }
    }

    pub fn new_text(position: Point, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ObjectKind::Text {
                position,
                content: content.into(),
                size: 16.0,
            },
        }
    }

    pub fn new_line(from: Point, to: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ObjectKind::Line {
                from,
                to,
                width: 2.0,
            },
        }
    }

    pub fn is_light(&self) -> bool {
        matches!(self.kind, ObjectKind::Light { .. })
    }

    /// Entity bound to this object, if it is a bound light.
    pub fn entity_id(&self) -> Option<&EntityId> {
        match &self.kind {
            ObjectKind::Light { entity_id, .. } => entity_id.as_ref(),
            _ => None,
        }
    }

    /// Name shown in the layers panel for a freshly created layer.
    pub fn display_name(&self) -> String {
        match &self.kind {
            ObjectKind::Light { entity_id, .. } => entity_id
                .clone()
                .unwrap_or_else(|| "Light".to_string()),
            ObjectKind::Room { name, .. } => name.clone(),
            ObjectKind::Text { content, .. } => {
                if content.is_empty() {
                    "Text".to_string()
                } else {
                    content.clone()
                }
            }
            ObjectKind::Line { .. } => "Line".to_string(),
            ObjectKind::Background { .. } => "Background".to_string(),
            ObjectKind::Grid { .. } => "Grid".to_string(),
        }
    }

    /// Room area in squared floorplan units, derived via the shoelace
    /// formula. Recomputed on demand, never stored.
    pub fn room_area(&self) -> Option<f32> {
        match &self.kind {
            ObjectKind::Room { points, .. } => Some(polygon_area(points)),
            _ => None,
        }
    }
}

/// Shoelace formula over a closed polygon. Returns the absolute area;
/// winding order does not affect the result.
pub fn polygon_area(points: &[Point]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0f32;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    (sum / 2.0).abs()
}

/// The canonical persisted shape of a floorplan layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorplanLayout {
    pub objects: Vec<FloorplanObject>,
    /// Affine viewport transform, column-major `[a, b, c, d, e, f]`.
    pub viewport: [f32; 6],
    pub zoom: f32,
}

impl Default for FloorplanLayout {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            viewport: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            zoom: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_area_square() {
        let square = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!((polygon_area(&square) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_polygon_area_winding_independent() {
        let cw = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 4.0),
            Point::new(4.0, 4.0),
            Point::new(4.0, 0.0),
        ];
        let ccw: Vec<Point> = cw.iter().rev().copied().collect();
        assert_eq!(polygon_area(&cw), polygon_area(&ccw));
    }

    #[test]
    fn test_polygon_area_degenerate() {
        assert_eq!(polygon_area(&[]), 0.0);
        assert_eq!(
            polygon_area(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)]),
            0.0
        );
    }

    #[test]
    fn test_layout_round_trip_preserves_bindings() {
        let mut light = FloorplanObject::new_light(Point::new(5.0, 6.0));
        if let ObjectKind::Light { entity_id, .. } = &mut light.kind {
            *entity_id = Some("light.kitchen".to_string());
        }
        let room = FloorplanObject::new_room(
            vec![
                Point::new(0.0, 0.0),
                Point::new(8.0, 0.0),
                Point::new(8.0, 6.0),
            ],
            "Kitchen",
        );
        let layout = FloorplanLayout {
            objects: vec![light, room],
            viewport: [1.0, 0.0, 0.0, 1.0, -40.0, 25.0],
            zoom: 1.5,
        };

        let json = serde_json::to_string(&layout).unwrap();
        let restored: FloorplanLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, layout);
        assert_eq!(
            restored.objects[0].entity_id().map(String::as_str),
            Some("light.kitchen")
        );
        assert!(restored.objects[1].room_area().unwrap() > 0.0);
    }
}
