//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template.
///
/// Feature toggles are left at their defaults and a two-zone layout for the
/// first monitor is active, so the file is usable as written.
#[must_use]
pub fn generate_config_template() -> String {
    r##"// Zonesnap Configuration File
// ============================
// This file uses JSONC format (JSON with comments).
// Zone coordinates are relative to each monitor's work area (the part of the
// screen not covered by panels and docks).

{
  // Enable or disable zoning entirely
  "enabled": true,

  // Put a window back where it was before it was snapped when it is dragged
  // out of every zone
  "restoreOnUntile": true,

  // Snap new windows into the zone under their center once they settle
  "tileNewWindows": false,

  // Highlight the zone under the pointer while dragging a window
  "highlightOnHover": true,

  // "timing": {
  //   // Wait before tiling a new window, in milliseconds (0-5000)
  //   "settleDelayMs": 100,
  //
  //   // Hover highlight polling interval, in milliseconds (10-1000)
  //   "highlightIntervalMs": 50
  // },

  // Zones in priority order: where zones overlap, the first one wins
  "zones": [
    { "name": "left", "monitorIndex": 0, "x": 0, "y": 0, "width": 960, "height": 1080 },
    { "name": "right", "monitorIndex": 0, "x": 960, "y": 0, "width": 960, "height": 1080 }
  ]
}
"##
    .to_string()
}

/// Creates a configuration file with the template at the specified path.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZoneSnapConfig;

    #[test]
    fn test_generate_config_template_is_valid_jsonc() {
        let template = generate_config_template();
        let reader = json_comments::StripComments::new(template.as_bytes());
        let config: ZoneSnapConfig = serde_json::from_reader(reader).unwrap();

        assert!(config.is_enabled());
        assert_eq!(config.zones.len(), 2);
        assert_eq!(config.zones[0].name, "left");
    }

    #[test]
    fn test_generate_config_template_documents_timing() {
        let template = generate_config_template();
        assert!(template.contains("settleDelayMs"));
        assert!(template.contains("highlightIntervalMs"));
    }

    #[test]
    fn test_create_config_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.jsonc");

        create_config_file(&path).unwrap();
        assert!(path.exists());
    }
}
