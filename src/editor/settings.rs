// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Diagrammr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Diagrammr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canvas/editor settings and the config file that seeds them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{Position, Viewport};

pub const DEFAULT_MAX_HISTORY_SIZE: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    pub zoom: f64,
    pub pan: Position,
    pub snap_to_grid: bool,
    pub grid_size: f64,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Position::default(),
            snap_to_grid: true,
            grid_size: 20.0,
        }
    }
}

impl CanvasSettings {
    pub fn apply(&mut self, patch: &CanvasSettingsPatch) {
        if let Some(zoom) = patch.zoom {
            self.zoom = zoom;
        }
        if let Some(pan) = patch.pan {
            self.pan = pan;
        }
        if let Some(snap_to_grid) = patch.snap_to_grid {
            self.snap_to_grid = snap_to_grid;
        }
        if let Some(grid_size) = patch.grid_size {
            self.grid_size = grid_size;
        }
    }

    pub(crate) fn follow_viewport(&mut self, viewport: &Viewport) {
        self.zoom = viewport.zoom;
        self.pan = Position::new(viewport.x, viewport.y);
    }
}

/// Partial [`CanvasSettings`] override; `None` keeps the current value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettingsPatch {
    pub zoom: Option<f64>,
    pub pan: Option<Position>,
    pub snap_to_grid: Option<bool>,
    pub grid_size: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub show_grid: bool,
    pub show_minimap: bool,
    pub show_controls: bool,
    pub auto_save: bool,
    pub auto_save_interval_ms: u64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_minimap: true,
            show_controls: true,
            auto_save: true,
            auto_save_interval_ms: 3000,
        }
    }
}

impl EditorSettings {
    pub fn apply(&mut self, patch: &EditorSettingsPatch) {
        if let Some(show_grid) = patch.show_grid {
            self.show_grid = show_grid;
        }
        if let Some(show_minimap) = patch.show_minimap {
            self.show_minimap = show_minimap;
        }
        if let Some(show_controls) = patch.show_controls {
            self.show_controls = show_controls;
        }
        if let Some(auto_save) = patch.auto_save {
            self.auto_save = auto_save;
        }
        if let Some(interval) = patch.auto_save_interval_ms {
            self.auto_save_interval_ms = interval;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettingsPatch {
    pub show_grid: Option<bool>,
    pub show_minimap: Option<bool>,
    pub show_controls: Option<bool>,
    pub auto_save: Option<bool>,
    pub auto_save_interval_ms: Option<u64>,
}

/// Baseline settings for a new editor session.
///
/// Every field is optional in the JSON file:
///
/// ```json
/// { "canvas": { "grid_size": 10 }, "max_history_size": 100 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub canvas: CanvasSettings,
    pub editor: EditorSettings,
    pub max_history_size: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSettings::default(),
            editor: EditorSettings::default(),
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded editor config");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history_size == 0 {
            return Err(ConfigError::InvalidHistorySize);
        }
        if self.canvas.grid_size.is_nan() || self.canvas.grid_size <= 0.0 {
            return Err(ConfigError::InvalidGridSize {
                grid_size: self.canvas.grid_size,
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("max_history_size must be at least 1")]
    InvalidHistorySize,
    #[error("grid_size must be positive (got {grid_size})")]
    InvalidGridSize { grid_size: f64 },
}
