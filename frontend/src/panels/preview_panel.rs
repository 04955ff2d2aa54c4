//! 3D preview panel: an isometric projection of rooms and lights.
//!
//! The derived scene graph is rebuilt from the floorplan, but never
//! per modification event: high-frequency changes (a drag gesture)
//! are coalesced with a fixed debounce window so one rebuild happens
//! after the gesture settles.

use std::time::{Duration, Instant};

use egui::{Color32, Pos2, Stroke};

use lightmapper_types::{EntityId, ObjectId, ObjectKind, Point};

use crate::context::EditorContext;
use crate::panel::{Panel, PanelResult};

const REBUILD_DEBOUNCE: Duration = Duration::from_millis(200);
/// World-units-per-meter used to scale wall heights into plan space.
const WALL_SCALE: f32 = 18.0;

#[derive(Clone)]
struct WallFace {
    corners: [[f32; 3]; 4],
    shade: f32,
    fill_color: String,
}

#[derive(Clone)]
struct FloorFace {
    corners: Vec<[f32; 3]>,
    fill_color: String,
}

#[derive(Clone)]
struct PreviewLight {
    position: [f32; 3],
    entity_id: Option<EntityId>,
}

pub struct PreviewPanel {
    floors: Vec<FloorFace>,
    walls: Vec<WallFace>,
    lights: Vec<PreviewLight>,
    dirty: bool,
    last_change: Option<Instant>,
}

impl PreviewPanel {
    pub fn new() -> Self {
        Self {
            floors: Vec::new(),
            walls: Vec::new(),
            lights: Vec::new(),
            dirty: true,
            last_change: None,
        }
    }

    fn mark_dirty(&mut self, now: Instant) {
        self.dirty = true;
        self.last_change = Some(now);
    }

    /// True once the debounce window after the last change has passed.
    fn should_rebuild(&self, now: Instant) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_change {
            Some(last) => now.duration_since(last) >= REBUILD_DEBOUNCE,
            None => true,
        }
    }

    fn rebuild(&mut self, ctx: &EditorContext) {
        self.floors.clear();
        self.walls.clear();
        self.lights.clear();

        for object in ctx.floorplan.objects() {
            match &object.kind {
                ObjectKind::Room {
                    points,
                    fill_color,
                    wall_height,
                    ..
                } => {
                    let height = wall_height * WALL_SCALE;
                    self.floors.push(FloorFace {
                        corners: points.iter().map(|p| [p.x, p.y, 0.0]).collect(),
                        fill_color: fill_color.clone(),
                    });
                    for i in 0..points.len() {
                        let a = points[i];
                        let b = points[(i + 1) % points.len()];
                        // Shade walls by edge direction for a hint of depth.
                        let shade = 0.55
                            + 0.35 * ((b.x - a.x).atan2(b.y - a.y).sin().abs());
                        self.walls.push(WallFace {
                            corners: [
                                [a.x, a.y, 0.0],
                                [b.x, b.y, 0.0],
                                [b.x, b.y, height],
                                [a.x, a.y, height],
                            ],
                            shade,
                            fill_color: fill_color.clone(),
                        });
                    }
                }
                ObjectKind::Light {
                    position, entity_id, ..
                } => {
                    self.lights.push(PreviewLight {
                        position: [position.x, position.y, 0.0],
                        entity_id: entity_id.clone(),
                    });
                }
                _ => {}
            }
        }
        self.dirty = false;
    }
}

impl Default for PreviewPanel {
    fn default() -> Self {
        Self::new()
    }
}

/// Isometric projection into 2D plan space.
fn project_iso(p: [f32; 3]) -> Point {
    let cos30 = 0.866_025_4;
    let sin30 = 0.5;
    Point::new((p[0] - p[1]) * cos30, (p[0] + p[1]) * sin30 - p[2])
}

impl Panel for PreviewPanel {
    fn id(&self) -> &'static str {
        "preview"
    }

    fn title(&self) -> &'static str {
        "3D Preview"
    }

    fn on_show(&mut self, _ctx: &mut EditorContext) {
        // Geometry may have changed while hidden.
        self.dirty = true;
        self.last_change = None;
    }

    fn on_object_added(&mut self, _object_id: ObjectId, _ctx: &mut EditorContext) -> PanelResult {
        self.mark_dirty(Instant::now());
        Ok(())
    }

    fn on_object_removed(&mut self, _object_id: ObjectId, _ctx: &mut EditorContext) -> PanelResult {
        self.mark_dirty(Instant::now());
        Ok(())
    }

    fn on_light_modified(&mut self, _object_id: ObjectId, _ctx: &mut EditorContext) -> PanelResult {
        self.mark_dirty(Instant::now());
        Ok(())
    }

    fn on_object_modified(&mut self, _object_id: ObjectId, _ctx: &mut EditorContext) -> PanelResult {
        self.mark_dirty(Instant::now());
        Ok(())
    }

    fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut EditorContext) {
        if self.should_rebuild(Instant::now()) {
            self.rebuild(ctx);
        }
        if self.dirty {
            // A rebuild is pending; keep repainting until the window
            // elapses.
            ui.ctx().request_repaint_after(REBUILD_DEBOUNCE);
        }

        let (response, painter) = ui.allocate_painter(
            ui.available_size_before_wrap(),
            egui::Sense::hover(),
        );
        let rect = response.rect;

        // Fit the projected bounds into the panel.
        let mut min = Point::new(f32::MAX, f32::MAX);
        let mut max = Point::new(f32::MIN, f32::MIN);
        let mut extend = |p: Point| {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        };
        for floor in &self.floors {
            for corner in &floor.corners {
                extend(project_iso(*corner));
            }
        }
        for wall in &self.walls {
            for corner in &wall.corners {
                extend(project_iso(*corner));
            }
        }
        for light in &self.lights {
            extend(project_iso(light.position));
        }
        if min.x > max.x {
            ui.painter()
                .text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Draw rooms and lights to see the preview",
                    egui::FontId::proportional(13.0),
                    Color32::from_gray(140),
                );
            return;
        }

        let span = egui::vec2((max.x - min.x).max(1.0), (max.y - min.y).max(1.0));
        let scale = ((rect.width() - 40.0) / span.x)
            .min((rect.height() - 40.0) / span.y)
            .clamp(0.05, 4.0);
        let to_panel = |p: [f32; 3]| -> Pos2 {
            let iso = project_iso(p);
            rect.center()
                + egui::vec2(
                    (iso.x - (min.x + max.x) / 2.0) * scale,
                    (iso.y - (min.y + max.y) / 2.0) * scale,
                )
        };

        painter.rect_filled(rect, 0.0, Color32::from_rgb(24, 24, 30));

        for floor in &self.floors {
            let screen: Vec<Pos2> = floor.corners.iter().map(|c| to_panel(*c)).collect();
            let fill = crate::floorplan::rendering::parse_hex_color(&floor.fill_color)
                .unwrap_or(Color32::from_rgb(58, 110, 165))
                .gamma_multiply(0.4);
            painter.add(egui::Shape::convex_polygon(
                screen,
                fill,
                Stroke::new(1.0, Color32::from_gray(90)),
            ));
        }

        // Walls sorted back-to-front by projected depth.
        let mut walls = self.walls.clone();
        walls.sort_by(|a, b| {
            let depth = |w: &WallFace| {
                w.corners.iter().map(|c| c[0] + c[1]).sum::<f32>() / 4.0
            };
            depth(a).partial_cmp(&depth(b)).unwrap_or(std::cmp::Ordering::Equal)
        });
        for wall in &walls {
            let screen: Vec<Pos2> = wall.corners.iter().map(|c| to_panel(*c)).collect();
            let base = crate::floorplan::rendering::parse_hex_color(&wall.fill_color)
                .unwrap_or(Color32::from_rgb(58, 110, 165));
            painter.add(egui::Shape::convex_polygon(
                screen,
                base.gamma_multiply(wall.shade * 0.6),
                Stroke::new(1.0, Color32::from_gray(70)),
            ));
        }

        for light in &self.lights {
            let pos = to_panel(light.position);
            let on = light
                .entity_id
                .as_deref()
                .and_then(|id| ctx.entities.get(id))
                .map(|s| s.is_on())
                .unwrap_or(false);
            let color = if on {
                Color32::from_rgb(255, 220, 120)
            } else {
                Color32::from_gray(100)
            };
            painter.circle_filled(pos, 5.0, color);
            if on {
                painter.circle_stroke(pos, 9.0, Stroke::new(1.5, color.gamma_multiply(0.5)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_coalesces_rapid_changes() {
        let mut panel = PreviewPanel::new();
        panel.dirty = false;
        let start = Instant::now();

        // A drag gesture: many modifications in quick succession.
        panel.mark_dirty(start);
        panel.mark_dirty(start + Duration::from_millis(50));
        panel.mark_dirty(start + Duration::from_millis(100));

        // Still inside the window measured from the *last* change.
        assert!(!panel.should_rebuild(start + Duration::from_millis(150)));
        assert!(!panel.should_rebuild(start + Duration::from_millis(250)));

        // One rebuild once the gesture settles.
        assert!(panel.should_rebuild(start + Duration::from_millis(301)));
    }

    #[test]
    fn test_clean_panel_never_rebuilds() {
        let mut panel = PreviewPanel::new();
        panel.dirty = false;
        assert!(!panel.should_rebuild(Instant::now() + Duration::from_secs(60)));
    }

    #[test]
    fn test_iso_projection_lifts_height() {
        let ground = project_iso([10.0, 10.0, 0.0]);
        let raised = project_iso([10.0, 10.0, 5.0]);
        assert_eq!(ground.x, raised.x);
        assert!(raised.y < ground.y, "height moves points up the screen");
    }
}
