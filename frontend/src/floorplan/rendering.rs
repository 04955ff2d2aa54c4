//! Painter projection of the floorplan arena.
//!
//! Rendering derives everything per frame: the draw order comes from
//! the layer model, light colors come from either the live entity
//! cache or the scene draft depending on the global display mode.

use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke};

use lightmapper_types::{
    DisplayMode, Layer, LightState, ObjectKind, Point, SceneLight,
};

use super::interaction::to_screen;
use crate::context::EditorContext;

const BACKGROUND_FILL: Color32 = Color32::from_rgb(30, 30, 36);
const GRID_LINE: Color32 = Color32::from_rgb(44, 44, 52);
const SELECTION: Color32 = Color32::from_rgb(100, 150, 255);
const UNBOUND_LIGHT: Color32 = Color32::from_rgb(120, 120, 130);
const OFF_LIGHT: Color32 = Color32::from_rgb(70, 70, 80);
const UNAVAILABLE_LIGHT: Color32 = Color32::from_rgb(160, 60, 60);

/// Parse a hex color string (e.g., "#4CAF50") to Color32.
pub fn parse_hex_color(hex: &str) -> Option<Color32> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color32::from_rgb(r, g, b))
}

/// Approximate blackbody color for a color temperature in Kelvin
/// (Tanner Helland's piecewise fit, clamped to the lamp range).
pub fn kelvin_to_rgb(kelvin: u32) -> [u8; 3] {
    let t = (kelvin.clamp(1000, 12000) as f32) / 100.0;

    let r = if t <= 66.0 {
        255.0
    } else {
        329.698_73 * (t - 60.0).powf(-0.133_204_76)
    };
    let g = if t <= 66.0 {
        99.470_8 * t.ln() - 161.119_57
    } else {
        288.122_17 * (t - 60.0).powf(-0.075_514_85)
    };
    let b = if t >= 66.0 {
        255.0
    } else if t <= 19.0 {
        0.0
    } else {
        138.517_73 * (t - 10.0).ln() - 305.044_8
    };

    [
        r.clamp(0.0, 255.0) as u8,
        g.clamp(0.0, 255.0) as u8,
        b.clamp(0.0, 255.0) as u8,
    ]
}

/// Hue (degrees) and saturation (percent) to RGB at full value.
pub fn hs_to_rgb(hue: f32, saturation: f32) -> [u8; 3] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let c = s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = 1.0 - c;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    ]
}

/// Fill color for a bound light rendered from its live state.
fn light_color_current(state: &LightState) -> Color32 {
    if !state.is_available() {
        return UNAVAILABLE_LIGHT;
    }
    if !state.is_on() {
        return OFF_LIGHT;
    }
    let rgb = if let Some(rgb) = state.attributes.rgb_color {
        rgb
    } else if let Some([hue, sat]) = state.attributes.hs_color {
        hs_to_rgb(hue, sat)
    } else if let Some(kelvin) = state.attributes.color_temp_kelvin {
        kelvin_to_rgb(kelvin)
    } else {
        [255, 220, 170]
    };
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

/// Fill color for a bound light rendered from the scene draft. A
/// light with no draft row renders as unset.
fn light_color_preview(row: Option<&SceneLight>) -> Color32 {
    let Some(row) = row else {
        return OFF_LIGHT;
    };
    let rgb = if let (Some(hue), Some(sat)) = (row.hue, row.saturation) {
        hs_to_rgb(hue, sat)
    } else if let Some(kelvin) = row.color_temp {
        kelvin_to_rgb(kelvin)
    } else {
        [255, 220, 170]
    };
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

/// Displayed brightness fraction (0.0-1.0) for the active mode.
fn brightness_fraction(
    mode: DisplayMode,
    state: Option<&LightState>,
    row: Option<&SceneLight>,
) -> Option<f32> {
    let raw = match mode {
        DisplayMode::CurrentState => state.filter(|s| s.is_on())?.attributes.brightness?,
        DisplayMode::ScenePreview => row?.brightness?,
    };
    Some(raw as f32 / 255.0)
}

fn centroid(points: &[Point]) -> Point {
    let n = points.len().max(1) as f32;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

/// Draw the whole floorplan in layer order (bottom-up).
pub fn draw_floorplan(painter: &Painter, rect: Rect, ctx: &EditorContext) {
    let pan = ctx.floorplan.pan_offset;
    let zoom = ctx.floorplan.zoom;
    let project = |p: Point| -> Pos2 { to_screen(rect, pan, zoom, p) };

    for layer in ctx.layers.ordered() {
        if !layer.visible {
            continue;
        }
        let Some(object) = ctx.floorplan.object(layer.object_id) else {
            continue;
        };
        let selected = ctx.floorplan.selected == Some(object.id);
        let hovered = ctx.floorplan.hovered == Some(object.id);

        match &object.kind {
            ObjectKind::Background { opacity, .. } => {
                let fill = BACKGROUND_FILL.gamma_multiply(opacity.clamp(0.0, 1.0));
                painter.rect_filled(rect, 0.0, fill);
            }
            ObjectKind::Grid { .. } => {
                if ctx.settings.show_grid {
                    draw_grid(painter, rect, pan, zoom, ctx.settings.grid_size);
                }
            }
            ObjectKind::Room {
                points,
                name,
                fill_color,
                ..
            } => {
                let screen: Vec<Pos2> = points.iter().map(|p| project(*p)).collect();
                let fill = parse_hex_color(fill_color)
                    .unwrap_or(Color32::from_rgb(58, 110, 165))
                    .gamma_multiply(0.35);
                let stroke_color = if selected { SELECTION } else { Color32::from_gray(150) };
                painter.add(egui::Shape::convex_polygon(
                    screen.clone(),
                    fill,
                    Stroke::new(if selected { 2.5 } else { 1.5 }, stroke_color),
                ));
                painter.text(
                    project(centroid(points)),
                    Align2::CENTER_CENTER,
                    name,
                    FontId::proportional(14.0 * zoom.clamp(0.5, 2.0)),
                    Color32::from_gray(210),
                );
            }
            ObjectKind::Line { from, to, width } => {
                let color = if selected { SELECTION } else { Color32::from_gray(170) };
                painter.line_segment(
                    [project(*from), project(*to)],
                    Stroke::new(width * zoom, color),
                );
            }
            ObjectKind::Text {
                position,
                content,
                size,
            } => {
                let color = if selected { SELECTION } else { Color32::from_gray(220) };
                painter.text(
                    project(*position),
                    Align2::LEFT_TOP,
                    content,
                    FontId::proportional(size * zoom),
                    color,
                );
            }
            ObjectKind::Light {
                position,
                radius,
                entity_id,
                ..
            } => {
                draw_light(
                    painter,
                    project(*position),
                    radius * zoom,
                    entity_id.as_deref(),
                    layer,
                    ctx,
                    selected,
                    hovered,
                );
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_light(
    painter: &Painter,
    center: Pos2,
    radius: f32,
    entity_id: Option<&str>,
    layer: &Layer,
    ctx: &EditorContext,
    selected: bool,
    hovered: bool,
) {
    let mode = ctx.floorplan.display_mode();
    let state = entity_id.and_then(|id| ctx.entities.get(id));
    let row = entity_id.and_then(|id| ctx.scenes.preview_for(id));

    let fill = match (entity_id, mode) {
        (None, _) => UNBOUND_LIGHT,
        (Some(_), DisplayMode::CurrentState) => state
            .map(light_color_current)
            .unwrap_or(UNBOUND_LIGHT),
        (Some(_), DisplayMode::ScenePreview) => light_color_preview(row),
    };

    // Coverage circle.
    if layer.circle_visible {
        painter.circle_stroke(center, radius, Stroke::new(1.0, fill.gamma_multiply(0.6)));
    }

    // Core marker.
    let marker = (radius * 0.45).max(4.0);
    painter.circle_filled(center, marker, fill);

    // Brightness ring around the marker.
    if layer.brightness_visible {
        if let Some(fraction) = brightness_fraction(mode, state, row) {
            painter.circle_stroke(
                center,
                marker + 3.0,
                Stroke::new(2.0, fill.gamma_multiply(0.3 + 0.7 * fraction)),
            );
        }
    }

    if selected || hovered {
        let color = if selected { SELECTION } else { Color32::from_gray(200) };
        painter.circle_stroke(center, marker + 6.0, Stroke::new(1.5, color));
    }

    if layer.label_visible {
        let label = entity_id.unwrap_or(layer.name.as_str());
        painter.text(
            center + egui::vec2(0.0, radius + 6.0),
            Align2::CENTER_TOP,
            label,
            FontId::proportional(11.0),
            Color32::from_gray(190),
        );
    }
}

fn draw_grid(painter: &Painter, rect: Rect, pan: egui::Vec2, zoom: f32, grid_size: f32) {
    let spacing = grid_size * zoom;
    if spacing < 4.0 {
        return;
    }
    let stroke = Stroke::new(1.0, GRID_LINE);

    let mut x = rect.min.x + pan.x.rem_euclid(spacing);
    while x < rect.max.x {
        painter.line_segment([Pos2::new(x, rect.min.y), Pos2::new(x, rect.max.y)], stroke);
        x += spacing;
    }
    let mut y = rect.min.y + pan.y.rem_euclid(spacing);
    while y < rect.max.y {
        painter.line_segment([Pos2::new(rect.min.x, y), Pos2::new(rect.max.x, y)], stroke);
        y += spacing;
    }
}

/// Preview for in-progress room/line drawing.
pub fn draw_tool_preview(
    painter: &Painter,
    rect: Rect,
    ctx: &EditorContext,
    pointer: Option<Pos2>,
) {
    let pan = ctx.floorplan.pan_offset;
    let zoom = ctx.floorplan.zoom;
    let project = |p: Point| -> Pos2 { to_screen(rect, pan, zoom, p) };
    let stroke = Stroke::new(1.5, SELECTION);

    if !ctx.floorplan.draw_points.is_empty() {
        let screen: Vec<Pos2> = ctx.floorplan.draw_points.iter().map(|p| project(*p)).collect();
        for pair in screen.windows(2) {
            painter.line_segment([pair[0], pair[1]], stroke);
        }
        for pos in &screen {
            painter.circle_filled(*pos, 3.0, SELECTION);
        }
        if let (Some(last), Some(pointer)) = (screen.last(), pointer) {
            painter.line_segment([*last, pointer], Stroke::new(1.0, SELECTION.gamma_multiply(0.5)));
        }
    }

    if let (Some(start), Some(pointer)) = (ctx.floorplan.line_start, pointer) {
        painter.line_segment([project(start), pointer], stroke);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightmapper_types::LightAttributes;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(
            parse_hex_color("#4CAF50"),
            Some(Color32::from_rgb(0x4c, 0xaf, 0x50))
        );
        assert_eq!(parse_hex_color("4CAF50"), Some(Color32::from_rgb(0x4c, 0xaf, 0x50)));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_kelvin_to_rgb_endpoints() {
        // Warm lamps lean red, cool daylight leans blue.
        let warm = kelvin_to_rgb(2000);
        assert_eq!(warm[0], 255);
        assert!(warm[2] < 100);

        let cool = kelvin_to_rgb(10000);
        assert_eq!(cool[2], 255);
        assert!(cool[0] < 255);
    }

    #[test]
    fn test_hs_to_rgb_primaries() {
        assert_eq!(hs_to_rgb(0.0, 100.0), [255, 0, 0]);
        assert_eq!(hs_to_rgb(120.0, 100.0), [0, 255, 0]);
        assert_eq!(hs_to_rgb(240.0, 100.0), [0, 0, 255]);
        // Zero saturation is white regardless of hue.
        assert_eq!(hs_to_rgb(200.0, 0.0), [255, 255, 255]);
    }

    #[test]
    fn test_light_color_prefers_rgb_over_temperature() {
        let state = LightState {
            entity_id: "light.a".to_string(),
            state: "on".to_string(),
            attributes: LightAttributes {
                rgb_color: Some([10, 20, 30]),
                color_temp_kelvin: Some(2700),
                ..Default::default()
            },
            last_changed: None,
            last_updated: None,
        };
        assert_eq!(light_color_current(&state), Color32::from_rgb(10, 20, 30));
    }

    #[test]
    fn test_light_color_off_and_unavailable() {
        let mut state = LightState {
            entity_id: "light.a".to_string(),
            state: "off".to_string(),
            attributes: Default::default(),
            last_changed: None,
            last_updated: None,
        };
        assert_eq!(light_color_current(&state), OFF_LIGHT);
        state.state = "unavailable".to_string();
        assert_eq!(light_color_current(&state), UNAVAILABLE_LIGHT);
    }

    #[test]
    fn test_preview_color_unset_row() {
        assert_eq!(light_color_preview(None), OFF_LIGHT);
        let mut row = SceneLight::new("light.a");
        row.color_temp = Some(2700);
        let color = light_color_preview(Some(&row));
        assert_ne!(color, OFF_LIGHT);
    }

    #[test]
    fn test_brightness_fraction_sources() {
        let state = LightState {
            entity_id: "light.a".to_string(),
            state: "on".to_string(),
            attributes: LightAttributes {
                brightness: Some(255),
                ..Default::default()
            },
            last_changed: None,
            last_updated: None,
        };
        let mut row = SceneLight::new("light.a");
        row.brightness = Some(0);

        // Current mode reads the entity, preview mode reads the draft.
        assert_eq!(
            brightness_fraction(DisplayMode::CurrentState, Some(&state), Some(&row)),
            Some(1.0)
        );
        assert_eq!(
            brightness_fraction(DisplayMode::ScenePreview, Some(&state), Some(&row)),
            Some(0.0)
        );
        assert_eq!(
            brightness_fraction(DisplayMode::ScenePreview, Some(&state), None),
            None
        );
    }
}
