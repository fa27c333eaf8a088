//! Configuration types for Zonesnap.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{
    DEFAULT_HIGHLIGHT_INTERVAL_MS, DEFAULT_SETTLE_DELAY_MS, MAX_HIGHLIGHT_INTERVAL_MS,
    MAX_SETTLE_DELAY_MS, MIN_HIGHLIGHT_INTERVAL_MS,
};
use crate::modules::zoning::Zone;

/// Timer configuration for the zoning engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct TimingConfig {
    /// Delay in milliseconds before a newly created window is tiled.
    /// Gives the window time to receive its initial geometry and monitor.
    /// Range: 0-5000. Default: 100
    pub settle_delay_ms: u64,

    /// Interval in milliseconds between hover-highlight polls during a drag.
    /// Range: 10-1000. Default: 50
    pub highlight_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            highlight_interval_ms: DEFAULT_HIGHLIGHT_INTERVAL_MS,
        }
    }
}

impl TimingConfig {
    /// Returns the settle delay clamped to its supported range.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms.min(MAX_SETTLE_DELAY_MS))
    }

    /// Returns the highlight interval clamped to its supported range.
    #[must_use]
    pub fn highlight_interval(&self) -> Duration {
        Duration::from_millis(
            self.highlight_interval_ms.clamp(MIN_HIGHLIGHT_INTERVAL_MS, MAX_HIGHLIGHT_INTERVAL_MS),
        )
    }
}

/// Root configuration.
///
/// Zones are listed in priority order: when zones overlap, the first one
/// listed wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoneSnapConfig {
    /// Whether zoning is enabled.
    /// Default: true
    pub enabled: bool,

    /// Restore a window's pre-snap geometry when it is dragged out of all zones.
    /// Default: true
    pub restore_on_untile: bool,

    /// Snap newly created windows into the zone under their center.
    /// Default: false
    pub tile_new_windows: bool,

    /// Highlight the hovered zone while dragging.
    /// Default: true
    pub highlight_on_hover: bool,

    /// Timer settings.
    pub timing: TimingConfig,

    /// Zone definitions, relative to each monitor's work area.
    /// An invalid list is ignored (treated as empty) rather than failing the load.
    #[serde(deserialize_with = "deserialize_zones_lenient")]
    #[schemars(with = "Vec<Zone>")]
    pub zones: Vec<Zone>,
}

impl Default for ZoneSnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            restore_on_untile: true,
            tile_new_windows: false,
            highlight_on_hover: true,
            timing: TimingConfig::default(),
            zones: Vec::new(),
        }
    }
}

impl ZoneSnapConfig {
    /// Returns whether zoning is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool { self.enabled }
}

/// Deserializes the zone list, degrading to an empty list on malformed data.
fn deserialize_zones_lenient<'de, D>(deserializer: D) -> Result<Vec<Zone>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;

    if value.is_null() {
        return Ok(Vec::new());
    }

    match serde_json::from_value::<Vec<Zone>>(value) {
        Ok(zones) => Ok(zones),
        Err(err) => {
            tracing::warn!(error = %err, "zonesnap: ignoring malformed zone list");
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ZoneSnapConfig::default();
        assert!(config.is_enabled());
        assert!(config.restore_on_untile);
        assert!(!config.tile_new_windows);
        assert!(config.highlight_on_hover);
        assert!(config.zones.is_empty());
        assert_eq!(config.timing.settle_delay_ms, DEFAULT_SETTLE_DELAY_MS);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: ZoneSnapConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ZoneSnapConfig::default());
    }

    #[test]
    fn test_full_config_deserializes() {
        let json = r#"{
            "enabled": true,
            "restoreOnUntile": false,
            "tileNewWindows": true,
            "highlightOnHover": false,
            "timing": { "settleDelayMs": 250 },
            "zones": [
                { "name": "left", "monitorIndex": 0, "x": 0, "y": 0, "width": 960, "height": 1080 },
                { "name": "right", "monitorIndex": 0, "x": 960, "y": 0, "width": 960, "height": 1080 }
            ]
        }"#;

        let config: ZoneSnapConfig = serde_json::from_str(json).unwrap();
        assert!(!config.restore_on_untile);
        assert!(config.tile_new_windows);
        assert!(!config.highlight_on_hover);
        assert_eq!(config.timing.settle_delay_ms, 250);
        assert_eq!(config.timing.highlight_interval_ms, DEFAULT_HIGHLIGHT_INTERVAL_MS);
        assert_eq!(config.zones.len(), 2);
        assert_eq!(config.zones[1].name, "right");
    }

    #[test]
    fn test_malformed_zones_become_empty() {
        let json = r#"{ "tileNewWindows": true, "zones": [{ "name": "broken", "x": "wide" }] }"#;

        let config: ZoneSnapConfig = serde_json::from_str(json).unwrap();
        assert!(config.zones.is_empty());
        assert!(config.tile_new_windows);
    }

    #[test]
    fn test_zones_not_an_array_become_empty() {
        let config: ZoneSnapConfig = serde_json::from_str(r#"{ "zones": 42 }"#).unwrap();
        assert!(config.zones.is_empty());

        let config: ZoneSnapConfig = serde_json::from_str(r#"{ "zones": null }"#).unwrap();
        assert!(config.zones.is_empty());
    }

    #[test]
    fn test_timing_is_clamped() {
        let timing = TimingConfig {
            settle_delay_ms: 60_000,
            highlight_interval_ms: 1,
        };
        assert_eq!(timing.settle_delay(), Duration::from_millis(MAX_SETTLE_DELAY_MS));
        assert_eq!(timing.highlight_interval(), Duration::from_millis(MIN_HIGHLIGHT_INTERVAL_MS));

        let timing = TimingConfig {
            settle_delay_ms: 0,
            highlight_interval_ms: 10_000,
        };
        assert_eq!(timing.settle_delay(), Duration::ZERO);
        assert_eq!(timing.highlight_interval(), Duration::from_millis(MAX_HIGHLIGHT_INTERVAL_MS));
    }
}
