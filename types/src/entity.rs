//! Cached state of externally-owned light entities.
//!
//! Entities are owned by Home Assistant; the editor keeps a read-mostly
//! cache keyed by `entity_id`, refreshed on demand or via realtime push,
//! never authoritative.

use serde::{Deserialize, Serialize};

/// Stable string id of an external entity, e.g. `light.kitchen`.
pub type EntityId = String;

/// Bitmask flag: the light supports brightness control.
pub const SUPPORT_BRIGHTNESS: u32 = 1;
/// Bitmask flag: the light supports color temperature.
pub const SUPPORT_COLOR_TEMP: u32 = 2;
/// Bitmask flag: the light supports hue/saturation color.
pub const SUPPORT_COLOR: u32 = 16;

/// A snapshot of one entity's state as reported by Home Assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    pub entity_id: EntityId,
    /// `"on"`, `"off"` or `"unavailable"`.
    pub state: String,
    #[serde(default)]
    pub attributes: LightAttributes,
    #[serde(default)]
    pub last_changed: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Optional per-light attributes. All fields may be absent depending on
/// what the light supports and whether it is on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightAttributes {
    /// Raw brightness, 0-255.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    /// Color temperature in Kelvin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_temp_kelvin: Option<u32>,
    /// Hue (0-360 degrees) and saturation (0-100 percent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hs_color: Option<[f32; 2]>,
    /// Red/green/blue channels, 0-255 each.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rgb_color: Option<[u8; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_features: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
}

impl LightState {
    pub fn is_on(&self) -> bool {
        self.state == "on"
    }

    pub fn is_available(&self) -> bool {
        self.state != "unavailable"
    }

    /// Brightness as displayed to the user, 0-100%.
    pub fn brightness_percent(&self) -> Option<u8> {
        self.attributes
            .brightness
            .map(|raw| ((raw as f32 / 255.0) * 100.0).round() as u8)
    }

    /// The name shown in entity lists: the friendly name when the entity
    /// carries one, otherwise the raw entity id.
    pub fn display_name(&self) -> &str {
        self.attributes
            .friendly_name
            .as_deref()
            .unwrap_or(&self.entity_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_state() {
        let json = r#"{
            "entity_id": "light.kitchen",
            "state": "on",
            "attributes": {
                "brightness": 200,
                "color_temp_kelvin": 3200,
                "friendly_name": "Kitchen",
                "supported_features": 19
            },
            "last_changed": "2024-05-01T10:00:00+00:00",
            "last_updated": "2024-05-01T10:00:01+00:00"
        }"#;
        let state: LightState = serde_json::from_str(json).unwrap();
        assert!(state.is_on());
        assert_eq!(state.attributes.brightness, Some(200));
        assert_eq!(state.attributes.color_temp_kelvin, Some(3200));
        assert_eq!(state.display_name(), "Kitchen");
        assert_eq!(state.brightness_percent(), Some(78));
    }

    #[test]
    fn test_parse_minimal_state() {
        let json = r#"{"entity_id": "light.hall", "state": "unavailable"}"#;
        let state: LightState = serde_json::from_str(json).unwrap();
        assert!(!state.is_on());
        assert!(!state.is_available());
        assert_eq!(state.brightness_percent(), None);
        assert_eq!(state.display_name(), "light.hall");
    }

    #[test]
    fn test_brightness_percent_bounds() {
        let mut state = LightState {
            entity_id: "light.a".into(),
            state: "on".into(),
            attributes: LightAttributes::default(),
            last_changed: None,
            last_updated: None,
        };
        state.attributes.brightness = Some(255);
        assert_eq!(state.brightness_percent(), Some(100));
        state.attributes.brightness = Some(0);
        assert_eq!(state.brightness_percent(), Some(0));
    }
}
