//! Local editor preferences, persisted as a schema-versioned JSON
//! blob under the platform config directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Current settings schema. Version 1 stored `grid_size` in world
/// meters; version 2 stores it in floorplan pixels.
pub const SETTINGS_SCHEMA_VERSION: u32 = 2;

const SETTINGS_FILE: &str = "settings.json";
const MIN_GRID_SIZE: f32 = 5.0;
const MAX_GRID_SIZE: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn label(&self) -> &'static str {
        match self {
            Units::Metric => "Metric (m)",
            Units::Imperial => "Imperial (ft)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub units: Units,
    /// Pixel-to-real-world scale of the floorplan.
    pub scale_px_per_meter: f32,
    /// Grid spacing in floorplan pixels (schema v2).
    pub grid_size: f32,
    #[serde(default = "default_show_grid")]
    pub show_grid: bool,
}

fn default_show_grid() -> bool {
    true
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            schema_version: SETTINGS_SCHEMA_VERSION,
            units: Units::Metric,
            scale_px_per_meter: 50.0,
            grid_size: 20.0,
            show_grid: true,
        }
    }
}

impl AppSettings {
    /// One-time migration of an old schema found in storage. Runs
    /// before first use; the rewritten blob is persisted by `load`.
    pub fn migrate(mut self) -> Self {
        if self.schema_version < 2 {
            // v1 persisted the grid spacing in world meters; rescale
            // into pixels and clamp into the supported range.
            let migrated = self.grid_size * self.scale_px_per_meter;
            self.grid_size = if migrated.is_finite() && migrated > 0.0 {
                migrated.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE)
            } else {
                AppSettings::default().grid_size
            };
            self.schema_version = SETTINGS_SCHEMA_VERSION;
        }
        self
    }

    /// Load settings from disk, migrating old schemas in place.
    /// Missing or unreadable files fall back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str::<AppSettings>(&raw) {
            Ok(settings) => {
                let needs_rewrite = settings.schema_version < SETTINGS_SCHEMA_VERSION;
                let settings = settings.migrate();
                if needs_rewrite {
                    if let Err(e) = settings.save() {
                        tracing::warn!("Failed to persist migrated settings: {}", e);
                    }
                }
                settings
            }
            Err(e) => {
                tracing::warn!("Unreadable settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("io", "lightmapper", "LightMapper")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_v1_rescales_grid_size() {
        let v1 = AppSettings {
            schema_version: 1,
            units: Units::Metric,
            scale_px_per_meter: 50.0,
            grid_size: 0.5, // meters in the old schema
            show_grid: true,
        };
        let migrated = v1.migrate();
        assert_eq!(migrated.schema_version, SETTINGS_SCHEMA_VERSION);
        assert_eq!(migrated.grid_size, 25.0);
    }

    #[test]
    fn test_migrate_v1_clamps_degenerate_values() {
        let v1 = AppSettings {
            schema_version: 1,
            units: Units::Metric,
            scale_px_per_meter: 50.0,
            grid_size: 0.0,
            show_grid: true,
        };
        let migrated = v1.migrate();
        assert_eq!(migrated.grid_size, AppSettings::default().grid_size);
    }

    #[test]
    fn test_migrate_is_idempotent_on_current_schema() {
        let current = AppSettings::default();
        assert_eq!(current.clone().migrate(), current);
    }

    #[test]
    fn test_settings_round_trip() {
        let settings = AppSettings {
            schema_version: SETTINGS_SCHEMA_VERSION,
            units: Units::Imperial,
            scale_px_per_meter: 33.0,
            grid_size: 10.0,
            show_grid: false,
        };
        let json = serde_json::to_string(&settings).unwrap();
        let restored: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, settings);
    }
}
