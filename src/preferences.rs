//! User preferences for abdraw
//!
//! Defaults for new editing sessions, persisted as JSON in the config
//! directory.

use std::fs;
use std::path::{Path, PathBuf};

use abdraw_core::{Font, GridSettings, Style};
use abdraw_geometry::Point;
use abdraw_session::config::{
    DEFAULT_HANDLE_RADIUS, DEFAULT_HIT_TOLERANCE, DEFAULT_PASTE_OFFSET,
};
use abdraw_session::{SessionConfig, Tool};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const APP_DIR: &str = "abdraw";
const FILE_NAME: &str = "preferences.json";

/// Persisted session defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub tool: Tool,
    pub style: Style,
    pub font: Font,
    pub grid: GridSettings,
    pub snap_radius: Option<f64>,
    pub hit_tolerance: f64,
    pub handle_radius: f64,
    pub paste_offset: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            tool: Tool::default(),
            style: Style::default(),
            font: Font::default(),
            grid: GridSettings::default(),
            snap_radius: None,
            hit_tolerance: DEFAULT_HIT_TOLERANCE,
            handle_radius: DEFAULT_HANDLE_RADIUS,
            paste_offset: DEFAULT_PASTE_OFFSET,
        }
    }
}

impl Preferences {
    /// Load preferences from the platform config directory, or the defaults
    /// when there is none
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("no config directory, using default preferences");
                Self::default()
            }
        }
    }

    /// Load preferences from `path`. A missing or unreadable file yields the
    /// defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no preferences file, using defaults");
            return Self::default();
        }
        match Self::read(path) {
            Ok(prefs) => prefs,
            Err(err) => {
                warn!(path = %path.display(), "ignoring preferences: {err:#}");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).context("Invalid preferences JSON")
    }

    /// `abdraw/preferences.json` under the platform config directory
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| Self::path_in(&dir))
    }

    fn path_in(config_dir: &Path) -> PathBuf {
        config_dir.join(APP_DIR).join(FILE_NAME)
    }

    /// Session configuration seeded from these preferences. Out-of-range
    /// grid spacing is clamped.
    pub fn into_config(self) -> SessionConfig {
        SessionConfig {
            tool: self.tool,
            style: self.style,
            font: self.font,
            grid: self.grid.with_spacing(self.grid.spacing),
            snap_radius: self.snap_radius,
            hit_tolerance: self.hit_tolerance,
            handle_radius: self.handle_radius,
            paste_offset: Point::new(self.paste_offset, self.paste_offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let prefs = Preferences::load_from(&dir.path().join("preferences.json"));
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, r#"{"tool":"ellipse","paste_offset":10}"#).unwrap();
        let prefs = Preferences::load_from(&path);
        assert_eq!(prefs.tool, Tool::Ellipse);
        assert_eq!(prefs.paste_offset, 10.0);
        assert_eq!(prefs.grid, GridSettings::default());
    }

    #[test]
    fn test_garbage_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(Preferences::load_from(&path), Preferences::default());
    }

    #[test]
    fn test_path_under_config_dir() {
        let dir = TempDir::new().unwrap();
        let path = Preferences::path_in(dir.path());
        assert_eq!(path, dir.path().join("abdraw").join("preferences.json"));

        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"tool":"text"}"#).unwrap();
        assert_eq!(Preferences::load_from(&path).tool, Tool::Text);
    }

    #[test]
    fn test_into_config_clamps_spacing() {
        let prefs = Preferences {
            grid: GridSettings {
                spacing: 500,
                ..GridSettings::default()
            },
            ..Preferences::default()
        };
        let config = prefs.into_config();
        assert_eq!(config.grid.spacing, 50);
        assert_eq!(config.paste_offset, Point::new(20.0, 20.0));
    }
}
