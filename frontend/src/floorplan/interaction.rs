//! Canvas input handling: user gestures become domain mutations.

use egui::{Pos2, Rect, Response, Sense, Ui, Vec2};

use lightmapper_types::{FloorplanObject, ObjectId, ObjectKind, Point};

use super::{FloorplanEditor, Tool, MAX_ZOOM, MIN_ZOOM};
use crate::context::EditorContext;
use crate::layers::LayerModel;

/// Pixel distance within which a click closes the room polygon.
const CLOSE_POLYGON_RADIUS: f32 = 10.0;
/// Hit slack around thin objects (lines, text).
const HIT_SLACK: f32 = 4.0;

/// Snap a value to the grid. A non-positive grid disables snapping.
pub fn snap_to_grid(value: f32, grid: f32) -> f32 {
    if grid <= 0.0 {
        value
    } else {
        (value / grid).round() * grid
    }
}

pub fn snap_point(p: Point, grid: f32) -> Point {
    Point::new(snap_to_grid(p.x, grid), snap_to_grid(p.y, grid))
}

/// World -> screen affine transform.
pub(crate) fn to_screen(rect: Rect, pan: Vec2, zoom: f32, p: Point) -> Pos2 {
    rect.min + egui::vec2(p.x, p.y) * zoom + pan
}

/// Screen -> world inverse transform.
pub(crate) fn from_screen(rect: Rect, pan: Vec2, zoom: f32, pos: Pos2) -> Point {
    let rel = pos - rect.min - pan;
    Point::new(rel.x / zoom, rel.y / zoom)
}

/// Ray-casting point-in-polygon test.
pub fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y)
            && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Distance from a point to a line segment.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let ab = egui::vec2(b.x - a.x, b.y - a.y);
    let ap = egui::vec2(p.x - a.x, p.y - a.y);
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return ap.length();
    }
    let t = (ap.dot(ab) / len_sq).clamp(0.0, 1.0);
    let closest = egui::vec2(a.x + ab.x * t, a.y + ab.y * t);
    (egui::vec2(p.x, p.y) - closest).length()
}

fn object_contains(object: &FloorplanObject, world: Point) -> bool {
    match &object.kind {
        ObjectKind::Light {
            position, radius, ..
        } => {
            let d = egui::vec2(world.x - position.x, world.y - position.y).length();
            d <= *radius
        }
        ObjectKind::Room { points, .. } => point_in_polygon(world, points),
        ObjectKind::Text {
            position,
            content,
            size,
        } => {
            let width = (content.chars().count().max(1) as f32) * size * 0.55;
            world.x >= position.x - HIT_SLACK
                && world.x <= position.x + width + HIT_SLACK
                && world.y >= position.y - HIT_SLACK
                && world.y <= position.y + size + HIT_SLACK
        }
        ObjectKind::Line { from, to, width } => {
            distance_to_segment(world, *from, *to) <= width + HIT_SLACK
        }
        // The background and grid are not hit targets.
        ObjectKind::Background { .. } | ObjectKind::Grid { .. } => false,
    }
}

impl FloorplanEditor {
    /// Topmost object under `world`, honoring layer order, visibility
    /// and locks.
    pub fn hit_test(&self, world: Point, layers: &LayerModel) -> Option<ObjectId> {
        for layer in layers.ordered_top_down() {
            if !layer.visible || layer.locked {
                continue;
            }
            let Some(object) = self.object(layer.object_id) else {
                continue;
            };
            if object_contains(object, world) {
                return Some(object.id);
            }
        }
        None
    }
}

/// The canvas widget: allocates the painter, routes gestures through
/// the active tool and draws the projection.
pub fn canvas_ui(ctx: &mut EditorContext, ui: &mut Ui) -> Response {
    let (response, painter) =
        ui.allocate_painter(ui.available_size_before_wrap(), Sense::click_and_drag());
    let rect = response.rect;

    // Scroll-wheel zoom anchored at the pointer.
    if let Some(hover) = response.hover_pos() {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll.abs() > 0.0 {
            let old_zoom = ctx.floorplan.zoom;
            let new_zoom = (old_zoom * (1.0 + scroll * 0.001)).clamp(MIN_ZOOM, MAX_ZOOM);
            if new_zoom != old_zoom {
                let world = from_screen(rect, ctx.floorplan.pan_offset, old_zoom, hover);
                ctx.floorplan.zoom = new_zoom;
                ctx.floorplan.pan_offset =
                    hover - rect.min - egui::vec2(world.x, world.y) * new_zoom;
            }
        }
    }

    let pan = ctx.floorplan.pan_offset;
    let zoom = ctx.floorplan.zoom;
    let grid = if ctx.settings.show_grid {
        ctx.settings.grid_size
    } else {
        0.0
    };
    let pointer_world = response
        .hover_pos()
        .map(|pos| from_screen(rect, pan, zoom, pos));

    match ctx.tool {
        Tool::Select => handle_select_tool(ctx, &response, rect),
        Tool::PlaceLight => {
            if response.clicked() {
                if let Some(world) = pointer_world {
                    let snapped = snap_point(world, grid);
                    let id = ctx.add_object(FloorplanObject::new_light(snapped));
                    ctx.floorplan.select(id);
                }
            }
        }
        Tool::DrawRoom => handle_room_tool(ctx, ui, &response, pointer_world, grid),
        Tool::PlaceText => {
            if response.clicked() {
                if let Some(world) = pointer_world {
                    let snapped = snap_point(world, grid);
                    let id = ctx.add_object(FloorplanObject::new_text(snapped, "Label"));
                    ctx.floorplan.select(id);
                }
            }
        }
        Tool::DrawLine => handle_line_tool(ctx, ui, &response, pointer_world, grid),
    }

    // Keyboard delete of the selected object.
    if ui.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
        if let Some(selected) = ctx.floorplan.selected {
            ctx.remove_object(selected);
        }
    }

    super::rendering::draw_floorplan(&painter, rect, ctx);
    super::rendering::draw_tool_preview(&painter, rect, ctx, response.hover_pos());

    response
}

fn handle_select_tool(ctx: &mut EditorContext, response: &Response, rect: Rect) {
    let pan = ctx.floorplan.pan_offset;
    let zoom = ctx.floorplan.zoom;

    if response.drag_started() {
        if let Some(pos) = response.interact_pointer_pos() {
            let world = from_screen(rect, pan, zoom, pos);
            let hit = ctx.floorplan.hit_test(world, &ctx.layers);
            ctx.floorplan.dragging = hit;
            if let Some(id) = hit {
                ctx.floorplan.select(id);
            }
        }
    }

    if response.dragged() {
        let delta = response.drag_delta();
        match ctx.floorplan.dragging {
            Some(id) => {
                ctx.floorplan.move_object(id, delta / zoom);
                ctx.mark_autosave();
            }
            // Empty-space drags pan the viewport.
            None => ctx.floorplan.pan_offset += delta,
        }
    }

    if response.drag_stopped() {
        ctx.floorplan.dragging = None;
    }

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let world = from_screen(rect, pan, zoom, pos);
            match ctx.floorplan.hit_test(world, &ctx.layers) {
                Some(id) => ctx.floorplan.select(id),
                None => ctx.floorplan.deselect(),
            }
        }
    }

    if let Some(pos) = response.hover_pos() {
        let world = from_screen(rect, pan, zoom, pos);
        ctx.floorplan.hovered = ctx.floorplan.hit_test(world, &ctx.layers);
    } else {
        ctx.floorplan.hovered = None;
    }
}

fn handle_room_tool(
    ctx: &mut EditorContext,
    ui: &Ui,
    response: &Response,
    pointer_world: Option<Point>,
    grid: f32,
) {
    if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
        ctx.floorplan.draw_points.clear();
        return;
    }

    if !response.clicked() {
        return;
    }
    let Some(world) = pointer_world else {
        return;
    };
    let snapped = snap_point(world, grid);

    // Clicking near the first corner closes the polygon.
    let closes = ctx.floorplan.draw_points.first().is_some_and(|first| {
        ctx.floorplan.draw_points.len() >= 3
            && egui::vec2(snapped.x - first.x, snapped.y - first.y).length()
                * ctx.floorplan.zoom
                <= CLOSE_POLYGON_RADIUS
    });

    if closes {
        let points = std::mem::take(&mut ctx.floorplan.draw_points);
        let count = ctx
            .floorplan
            .objects()
            .filter(|o| matches!(o.kind, ObjectKind::Room { .. }))
            .count();
        let id = ctx.add_object(FloorplanObject::new_room(
            points,
            format!("Room {}", count + 1),
        ));
        ctx.floorplan.select(id);
    } else {
        ctx.floorplan.draw_points.push(snapped);
    }
}

fn handle_line_tool(
    ctx: &mut EditorContext,
    ui: &Ui,
    response: &Response,
    pointer_world: Option<Point>,
    grid: f32,
) {
    if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
        ctx.floorplan.line_start = None;
        return;
    }

    if !response.clicked() {
        return;
    }
    let Some(world) = pointer_world else {
        return;
    };
    let snapped = snap_point(world, grid);

    match ctx.floorplan.line_start.take() {
        None => ctx.floorplan.line_start = Some(snapped),
        Some(start) => {
            let id = ctx.add_object(FloorplanObject::new_line(start, snapped));
            ctx.floorplan.select(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::LayerModel;

    #[test]
    fn test_snap_to_grid() {
        assert_eq!(snap_to_grid(23.0, 20.0), 20.0);
        assert_eq!(snap_to_grid(31.0, 20.0), 40.0);
        assert_eq!(snap_to_grid(-9.0, 20.0), 0.0);
        // Disabled grid leaves values alone.
        assert_eq!(snap_to_grid(23.0, 0.0), 23.0);
    }

    #[test]
    fn test_screen_world_round_trip() {
        let rect = Rect::from_min_size(egui::pos2(100.0, 50.0), egui::vec2(800.0, 600.0));
        let pan = egui::vec2(40.0, -25.0);
        let zoom = 1.7;
        let world = Point::new(123.0, 456.0);

        let screen = to_screen(rect, pan, zoom, world);
        let back = from_screen(rect, pan, zoom, screen);
        assert!((back.x - world.x).abs() < 1e-3);
        assert!((back.y - world.y).abs() < 1e-3);
    }

    #[test]
    fn test_point_in_polygon() {
        let square = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(Point::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &square));
        assert!(!point_in_polygon(Point::new(-1.0, -1.0), &square));
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((distance_to_segment(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-6);
        // Beyond the endpoints the distance is to the endpoint itself.
        assert!((distance_to_segment(Point::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_hit_test_honors_layer_state_and_order() {
        let mut editor = FloorplanEditor::new();
        let mut layers = LayerModel::new();

        let below = FloorplanObject::new_light(Point::new(0.0, 0.0));
        let below_id = below.id;
        layers.create_layer_for_object(&below);
        editor.insert_object(below);

        let above = FloorplanObject::new_light(Point::new(5.0, 0.0));
        let above_id = above.id;
        let above_layer = layers.create_layer_for_object(&above);
        editor.insert_object(above);

        // Overlapping point: the topmost layer wins.
        let probe = Point::new(4.0, 0.0);
        assert_eq!(editor.hit_test(probe, &layers), Some(above_id));

        // Hidden layers are skipped.
        layers.toggle_visibility(above_layer);
        assert_eq!(editor.hit_test(probe, &layers), Some(below_id));
        layers.toggle_visibility(above_layer);

        // Locked layers do not interact.
        layers.toggle_lock(above_layer);
        assert_eq!(editor.hit_test(probe, &layers), Some(below_id));

        // Empty space hits nothing.
        assert_eq!(editor.hit_test(Point::new(500.0, 500.0), &layers), None);
    }

    #[test]
    fn test_room_hit_test() {
        let mut editor = FloorplanEditor::new();
        let mut layers = LayerModel::new();
        let room = FloorplanObject::new_room(
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 80.0),
                Point::new(0.0, 80.0),
            ],
            "Kitchen",
        );
        let room_id = room.id;
        layers.create_layer_for_object(&room);
        editor.insert_object(room);

        assert_eq!(editor.hit_test(Point::new(50.0, 40.0), &layers), Some(room_id));
        assert_eq!(editor.hit_test(Point::new(150.0, 40.0), &layers), None);
    }
}
