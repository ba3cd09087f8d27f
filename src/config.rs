//! Configuration persistence for BasinView settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Serializable color representation for config storage and draw calls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl RgbColor {
    /// Convert to RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            255,
        ]
    }
}

impl Default for RgbColor {
    fn default() -> Self {
        // Default annotation black
        Self {
            r: 0.0,
            g: 0.0,
            b: 0.0,
        }
    }
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasinViewConfig {
    /// Annotation symbol diameter in view units
    pub symbol_size: f64,
    /// Font family for annotation labels
    pub label_font: String,
    /// Font size for annotation labels
    pub label_font_size: f64,
    /// Color for annotation symbols
    pub symbol_color: RgbColor,
    /// Color for connecting lines between endpoints
    pub line_color: RgbColor,
    /// Width of connecting lines
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    /// Color for annotation label text
    pub text_color: RgbColor,
    /// CRS identifier the map view displays in
    pub map_crs: String,
    /// Directory the open-dataset dialog starts in
    #[serde(default)]
    pub dataset_dir: Option<PathBuf>,
}

fn default_line_width() -> f64 {
    1.5
}

impl BasinViewConfig {
    /// Config file name under the platform config directory
    pub const FILE_NAME: &'static str = "basinview.json";

    /// Path of the config file, when a config directory exists
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("basinview").join(Self::FILE_NAME))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            log::warn!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load from an explicit path, falling back to defaults on any failure
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(err) => {
                    log::warn!("Error parsing config, using defaults: {err}");
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!("Could not read config ({err}), using defaults");
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            log::error!("No config directory available, not saving config");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {err:#}");
        }
    }

    /// Save to an explicit path
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

impl Default for BasinViewConfig {
    fn default() -> Self {
        Self {
            // Symbol size matching the network layout default
            symbol_size: 6.0,
            label_font: "Helvetica".into(),
            label_font_size: 10.0,
            // Black symbols and text over a light basemap
            symbol_color: RgbColor::default(),
            text_color: RgbColor::default(),
            // Default red for connecting lines, matching selection highlights
            line_color: RgbColor {
                r: 0.9,
                g: 0.1,
                b: 0.1,
            },
            line_width: default_line_width(),
            // Geographic coordinates unless a project says otherwise
            map_crs: "EPSG:4326".into(),
            dataset_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join(BasinViewConfig::FILE_NAME);
        let config = BasinViewConfig {
            symbol_size: 9.0,
            map_crs: "EPSG:26913".into(),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = BasinViewConfig::load_from(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = BasinViewConfig::load_from(&dir.path().join("absent.json"));
        assert_eq!(loaded, BasinViewConfig::default());
    }

    #[test]
    fn test_color_to_rgba() {
        let c = RgbColor {
            r: 1.0,
            g: 0.5,
            b: 0.0,
        };
        assert_eq!(c.to_rgba_u8(), [255, 128, 0, 255]);
    }
}
