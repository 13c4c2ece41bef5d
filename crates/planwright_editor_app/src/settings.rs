// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor settings.
//!
//! Settings are stored as RON. The file is looked up at the path in
//! `PLANWRIGHT_SETTINGS`, falling back to `planwright.ron` in the working
//! directory. Every field is optional in the file; missing fields take their
//! default values.

use planwright_editor_graph::schema::DEFAULT_TYPE_NAME;
use planwright_editor_graph::{GraphCanvas, NodeRegistry, NotificationLog};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "planwright.ron";

/// Environment variable overriding the settings path
pub const SETTINGS_ENV_VAR: &str = "PLANWRIGHT_SETTINGS";

/// Settings loading errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// File could not be read
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid settings RON
    #[error("Invalid settings file: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// User-configurable editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Initial window size in logical pixels
    pub window_size: [u32; 2],
    /// Snap dropped and moved nodes to the grid
    pub snap_to_grid: bool,
    /// Grid cell size
    pub grid_size: f32,
    /// Show the minimap on the canvas
    pub show_minimap: bool,
    /// Draw the background grid
    pub show_grid: bool,
    /// Type given to new objects and parameters
    pub default_object_type: String,
    /// Notifications retained in the history
    pub max_notifications: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            window_size: [1600, 900],
            snap_to_grid: true,
            grid_size: 15.0,
            show_minimap: true,
            show_grid: true,
            default_object_type: DEFAULT_TYPE_NAME.to_string(),
            max_notifications: 100,
        }
    }
}

impl EditorSettings {
    /// Parse settings from RON text
    pub fn from_ron(text: &str) -> Result<Self, SettingsError> {
        let settings: EditorSettings = ron::from_str(text)?;
        Ok(settings.sanitized())
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Serialize settings as pretty RON
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        let config = ron::ser::PrettyConfig::default()
            .depth_limit(2)
            .separate_tuple_members(true);
        ron::ser::to_string_pretty(self, config)
    }

    /// Path the settings are read from
    pub fn resolve_path() -> PathBuf {
        std::env::var_os(SETTINGS_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME))
    }

    /// Load settings from [`Self::resolve_path`], using defaults on any failure
    pub fn load_or_default() -> Self {
        Self::load_from_or_default(&Self::resolve_path())
    }

    fn load_from_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                tracing::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Ignoring settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Node registry using the configured default type
    pub fn registry(&self) -> NodeRegistry {
        NodeRegistry::with_default_type_name(self.default_object_type.clone())
    }

    /// Notification history sized by the settings
    pub fn notification_log(&self) -> NotificationLog {
        NotificationLog::new(self.max_notifications)
    }

    /// Apply the canvas options
    pub fn apply_to_canvas(&self, canvas: &mut GraphCanvas) {
        canvas.snap_to_grid = self.snap_to_grid;
        canvas.snap_size = self.grid_size;
        canvas.show_minimap = self.show_minimap;
        canvas.show_grid = self.show_grid;
    }

    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.grid_size.is_finite() && self.grid_size >= 1.0) {
            self.grid_size = defaults.grid_size;
        }
        if self.default_object_type.trim().is_empty() {
            self.default_object_type = defaults.default_object_type;
        }
        self.window_size = [self.window_size[0].max(800), self.window_size[1].max(600)];
        self.max_notifications = self.max_notifications.max(1);
        self
    }
}
