//! Configuration schema types for `mapsmith.toml`
//!
//! Every field has an explicit default, so an empty file (or no file at all)
//! is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::editor::DEFAULT_CELL_SIZE;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::team::{TeamPalette, DEFAULT_TEAM_SHIFTS, SHIFTED_TEAMS};

/// Largest accepted cell size, in pixels.
pub const MAX_CELL_SIZE: u32 = 256;

/// Editing session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Pixels per grid cell on screen and in renders
    #[serde(default = "default_cell_size")]
    pub cell_size: u32,
    /// Maximum number of undo steps kept
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Start with mirrored editing enabled
    #[serde(default)]
    pub mirror_x: bool,
    /// Where to autosave on exit; disabled when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autosave: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
            history_capacity: default_history_capacity(),
            mirror_x: false,
            autosave: None,
        }
    }
}

fn default_cell_size() -> u32 {
    DEFAULT_CELL_SIZE
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

/// Item catalog sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Sprite asset directory
    #[serde(default = "default_assets")]
    pub assets: PathBuf,
    /// Directory scanned for mod item files
    #[serde(default = "default_mods")]
    pub mods: PathBuf,
    /// Load the built-in item set before mods
    #[serde(default = "default_true")]
    pub include_vanilla: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { assets: default_assets(), mods: default_mods(), include_vanilla: true }
    }
}

fn default_assets() -> PathBuf {
    PathBuf::from("assets")
}

fn default_mods() -> PathBuf {
    PathBuf::from("mods")
}

fn default_true() -> bool {
    true
}

/// Team sprite recoloring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamsConfig {
    /// Hue range `[lo, hi]` (fractions of a turn) recolored per team
    #[serde(default = "default_hue_band")]
    pub hue_band: [f64; 2],
    /// Pixels at or below this saturation keep their color
    #[serde(default = "default_min_saturation")]
    pub min_saturation: f64,
    /// Hue shift for each of teams 0 through 6
    #[serde(default = "default_shifts")]
    pub shifts: Vec<f64>,
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self {
            hue_band: default_hue_band(),
            min_saturation: default_min_saturation(),
            shifts: default_shifts(),
        }
    }
}

fn default_hue_band() -> [f64; 2] {
    [0.5, 0.75]
}

fn default_min_saturation() -> f64 {
    0.1
}

fn default_shifts() -> Vec<f64> {
    DEFAULT_TEAM_SHIFTS.to_vec()
}

impl TeamsConfig {
    /// The recoloring table. A shift list of the wrong length (rejected by
    /// validation) falls back to the defaults.
    pub fn palette(&self) -> TeamPalette {
        let shifts: [f64; SHIFTED_TEAMS] =
            self.shifts.as_slice().try_into().unwrap_or(DEFAULT_TEAM_SHIFTS);
        TeamPalette {
            hue_band: (self.hue_band[0], self.hue_band[1]),
            min_saturation: self.min_saturation,
            shifts,
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapsmithConfig {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub teams: TeamsConfig,
}

/// Validation error for config
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "teams.hue_band")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mapsmith.toml: '{}' {}", self.field, self.message)
    }
}

impl MapsmithConfig {
    /// Validate the configuration and return all errors.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: &str| {
            errors.push(ConfigValidationError { field: field.to_string(), message: message.to_string() });
        };

        if self.editor.cell_size == 0 || self.editor.cell_size > MAX_CELL_SIZE {
            push("editor.cell_size", "must be between 1 and 256");
        }
        if self.editor.history_capacity == 0 {
            push("editor.history_capacity", "must be a positive integer");
        }

        let [lo, hi] = self.teams.hue_band;
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) {
            push("teams.hue_band", "bounds must lie within [0, 1]");
        } else if lo > hi {
            push("teams.hue_band", "lower bound must not exceed upper bound");
        }
        if !(0.0..=1.0).contains(&self.teams.min_saturation) {
            push("teams.min_saturation", "must lie within [0, 1]");
        }
        if self.teams.shifts.len() != SHIFTED_TEAMS {
            push("teams.shifts", "must list exactly 7 values, one per team 0-6");
        }

        errors
    }

    /// Check if the configuration is valid.
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Make relative paths relative to the directory holding the config file.
    pub fn resolve_paths(&mut self, root: &Path) {
        self.catalog.assets = super::resolve_path(root, &self.catalog.assets);
        self.catalog.mods = super::resolve_path(root, &self.catalog.mods);
        if let Some(autosave) = &self.editor.autosave {
            self.editor.autosave = Some(super::resolve_path(root, autosave));
        }
    }
}
