//! Properties panel: editable fields of the selected object.
//!
//! Selection arrives via broadcast only; the panel never polls the
//! canvas for it.

use lightmapper_types::{ObjectId, ObjectKind, Point};

use crate::context::EditorContext;
use crate::floorplan::rendering::parse_hex_color;
use crate::panel::{Panel, PanelResult};
use crate::settings::Units;

pub struct PropertiesPanel {
    selected: Option<ObjectId>,
}

impl PropertiesPanel {
    pub fn new() -> Self {
        Self { selected: None }
    }
}

impl Default for PropertiesPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel for PropertiesPanel {
    fn id(&self) -> &'static str {
        "properties"
    }

    fn title(&self) -> &'static str {
        "Properties"
    }

    fn on_object_selected(&mut self, object_id: ObjectId, _ctx: &mut EditorContext) -> PanelResult {
        self.selected = Some(object_id);
        Ok(())
    }

    fn on_object_deselected(&mut self, _ctx: &mut EditorContext) -> PanelResult {
        self.selected = None;
        Ok(())
    }

    fn on_object_removed(&mut self, object_id: ObjectId, _ctx: &mut EditorContext) -> PanelResult {
        if self.selected == Some(object_id) {
            self.selected = None;
        }
        Ok(())
    }

    fn ui(&mut self, ui: &mut egui::Ui, ctx: &mut EditorContext) {
        let Some(id) = self.selected else {
            ui.weak("Nothing selected.");
            return;
        };
        // Stale selection (deletion raced a pending click): clear out.
        let Some(object) = ctx.floorplan.object(id) else {
            self.selected = None;
            return;
        };
        let mut kind = object.kind.clone();
        let mut changed = false;

        ui.horizontal(|ui| {
            ui.label("ID:");
            ui.monospace(id.to_string());
        });
        ui.separator();

        match &mut kind {
            ObjectKind::Light {
                position,
                radius,
                style,
                entity_id,
            } => {
                changed |= point_editor(ui, "Position", position);
                ui.horizontal(|ui| {
                    ui.label("Radius:");
                    changed |= ui
                        .add(egui::Slider::new(radius, 4.0..=120.0))
                        .changed();
                });
                ui.horizontal(|ui| {
                    ui.label("Style:");
                    for option in [
                        lightmapper_types::LightStyle::Bulb,
                        lightmapper_types::LightStyle::Spot,
                        lightmapper_types::LightStyle::Strip,
                    ] {
                        changed |= ui
                            .selectable_value(style, option, format!("{:?}", option))
                            .changed();
                    }
                });
                ui.horizontal(|ui| {
                    ui.label("Entity:");
                    match entity_id {
                        Some(entity) => {
                            ui.monospace(entity.as_str());
                        }
                        None => {
                            ui.weak("unassigned");
                        }
                    }
                });
                if entity_id.is_some() && ui.small_button("Unbind").clicked() {
                    ctx.floorplan.unassign_entity(id);
                    return;
                }
            }
            ObjectKind::Room {
                points,
                name,
                fill_color,
                wall_height,
            } => {
                ui.horizontal(|ui| {
                    ui.label("Name:");
                    changed |= ui.text_edit_singleline(name).changed();
                });
                ui.horizontal(|ui| {
                    ui.label("Fill:");
                    let mut color = parse_hex_color(fill_color)
                        .unwrap_or(egui::Color32::from_rgb(58, 110, 165));
                    if ui.color_edit_button_srgba(&mut color).changed() {
                        *fill_color =
                            format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b());
                        changed = true;
                    }
                });
                ui.horizontal(|ui| {
                    ui.label("Wall height:");
                    changed |= ui
                        .add(egui::Slider::new(wall_height, 2.0..=5.0).suffix(" m"))
                        .changed();
                });

                // Derived, never edited directly.
                let scale = ctx.settings.scale_px_per_meter.max(f32::EPSILON);
                let area_m2 = lightmapper_types::polygon_area(points) / (scale * scale);
                let area = match ctx.settings.units {
                    Units::Metric => format!("{:.1} m²", area_m2),
                    Units::Imperial => format!("{:.1} ft²", area_m2 * 10.7639),
                };
                ui.horizontal(|ui| {
                    ui.label("Area:");
                    ui.weak(area);
                });
                ui.weak(format!("{} corners", points.len()));
            }
            ObjectKind::Text {
                position,
                content,
                size,
            } => {
                ui.horizontal(|ui| {
                    ui.label("Text:");
                    changed |= ui.text_edit_singleline(content).changed();
                });
                changed |= point_editor(ui, "Position", position);
                ui.horizontal(|ui| {
                    ui.label("Size:");
                    changed |= ui.add(egui::Slider::new(size, 8.0..=72.0)).changed();
                });
            }
            ObjectKind::Line { from, to, width } => {
                changed |= point_editor(ui, "From", from);
                changed |= point_editor(ui, "To", to);
                ui.horizontal(|ui| {
                    ui.label("Width:");
                    changed |= ui.add(egui::Slider::new(width, 0.5..=12.0)).changed();
                });
            }
            ObjectKind::Background { opacity, .. } => {
                ui.horizontal(|ui| {
                    ui.label("Opacity:");
                    changed |= ui.add(egui::Slider::new(opacity, 0.0..=1.0)).changed();
                });
            }
            ObjectKind::Grid { spacing } => {
                ui.horizontal(|ui| {
                    ui.label("Spacing:");
                    changed |= ui.add(egui::Slider::new(spacing, 5.0..=200.0)).changed();
                });
            }
        }

        if changed {
            ctx.with_object_mut(id, |object| object.kind = kind);
        }

        ui.separator();
        if ui.button("Delete object").clicked() {
            ctx.remove_object(id);
        }
    }
}

fn point_editor(ui: &mut egui::Ui, label: &str, point: &mut Point) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label(format!("{}:", label));
        changed |= ui
            .add(egui::DragValue::new(&mut point.x).speed(1.0).prefix("x "))
            .changed();
        changed |= ui
            .add(egui::DragValue::new(&mut point.y).speed(1.0).prefix("y "))
            .changed();
    });
    changed
}
