use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use emu_core::logging::{log, LogCategory, LogLevel};

use crate::clock::BUFFER_LINES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read TIA settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TIA settings: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayFormat {
    Ntsc,
    Pal,
}

impl DisplayFormat {
    pub fn base_framerate(self) -> f32 {
        match self {
            DisplayFormat::Ntsc => 60.0,
            DisplayFormat::Pal => 50.0,
        }
    }
}

/// Console settings the TIA consults on reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TiaConfig {
    /// Undriven data-bus bits read back random instead of the last bus value
    pub tia_driven: bool,
    /// Emulate PAL color loss on frames with an odd scanline count
    pub color_loss: bool,
    /// Fixed framerate; zero or negative enables autodetection
    pub framerate: f32,
    pub display_format: DisplayFormat,
    /// First scanline exposed by the framebuffer accessors
    pub ystart: u32,
    /// Scanlines exposed by the framebuffer accessors
    pub height: u32,
    /// Allow the HMOVE blank artifact
    pub hmove_blanks: bool,
}

impl Default for TiaConfig {
    fn default() -> Self {
        Self {
            tia_driven: false,
            color_loss: false,
            framerate: 0.0,
            display_format: DisplayFormat::Ntsc,
            ystart: 34,
            height: 210,
            hmove_blanks: true,
        }
    }
}

impl TiaConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                log(LogCategory::State, LogLevel::Warn, || {
                    format!("TIA: {} ({}), using defaults", e, path.display())
                });
                Self::default()
            }
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Framerate in effect after a reset
    pub fn initial_framerate(&self) -> f32 {
        if self.framerate > 0.0 {
            self.framerate
        } else {
            self.display_format.base_framerate()
        }
    }

    pub fn autoframe(&self) -> bool {
        self.framerate <= 0.0
    }

    /// `(ystart, height)` clamped so the visible window fits in the framebuffer
    pub fn visible_window(&self) -> (u32, u32) {
        let ystart = self.ystart.min(BUFFER_LINES - 1);
        let height = self.height.clamp(1, BUFFER_LINES - ystart);
        (ystart, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TiaConfig::default();
        assert!(config.autoframe());
        assert_eq!(config.initial_framerate(), 60.0);
        assert_eq!(config.visible_window(), (34, 210));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TiaConfig::from_json(r#"{ "display_format": "pal", "color_loss": true }"#).unwrap();
        assert_eq!(config.display_format, DisplayFormat::Pal);
        assert!(config.color_loss);
        assert_eq!(config.ystart, 34);
        assert_eq!(config.initial_framerate(), 50.0);
    }

    #[test]
    fn test_fixed_framerate_disables_autoframe() {
        let config = TiaConfig {
            framerate: 55.0,
            ..TiaConfig::default()
        };
        assert!(!config.autoframe());
        assert_eq!(config.initial_framerate(), 55.0);
    }

    #[test]
    fn test_visible_window_clamped() {
        let config = TiaConfig {
            ystart: 300,
            height: 100,
            ..TiaConfig::default()
        };
        assert_eq!(config.visible_window(), (300, 20));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            TiaConfig::from_json("{ ystart: }"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = TiaConfig::load_or_default(Path::new("/nonexistent/tia.json"));
        assert_eq!(config.height, 210);
    }
}
