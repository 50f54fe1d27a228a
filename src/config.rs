//! Board and animation configuration
//!
//! Loaded from JSON by the host. Missing fields fall back to defaults.

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("board must be at least 1x1, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("max_visible_row must be in 1..={height}, got {max_visible_row}")]
    InvalidVisibleRows { max_visible_row: i32, height: i32 },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
}

/// Board dimensions and animation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Columns in the board
    pub width: i32,
    /// Rows in storage (including any hidden rows above the play area)
    pub height: i32,
    /// Rows `0..max_visible_row` are playable; the rest are a spawn buffer
    pub max_visible_row: i32,
    /// Grid tile speed (world units/s)
    pub tile_speed: f32,
    /// Exit animation speed (world units/s)
    pub destroy_speed: f32,

    // === Layout ===
    /// Side length of one cell in world units
    pub cell_size: f32,
    /// World position of cell (0, 0)
    pub origin: Vec2,

    // === Exit animation ===
    /// Max per-axis scatter distance before converging on the anchor
    pub scatter_radius: f32,
    /// Where removed tiles converge before disposal
    pub destroy_anchor: Vec3,

    /// Interval between settle checks while a turn is suspended (seconds)
    pub settle_poll_interval: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            max_visible_row: DEFAULT_HEIGHT,
            tile_speed: DEFAULT_TILE_SPEED,
            destroy_speed: DEFAULT_DESTROY_SPEED,

            cell_size: 1.0,
            origin: Vec2::ZERO,

            scatter_radius: 1.0,
            destroy_anchor: Vec3::new(-2.0, -2.0, -5.0),

            settle_poll_interval: SETTLE_POLL_INTERVAL,
        }
    }
}

impl GameConfig {
    /// Config for a `width x height` board with every row visible
    pub fn with_size(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            max_visible_row: height,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!(
            "Loaded config from {}: {}x{} board, {} visible rows",
            path.display(),
            config.width,
            config.height,
            config.max_visible_row
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 1 || self.height < 1 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.max_visible_row < 1 || self.max_visible_row > self.height {
            return Err(ConfigError::InvalidVisibleRows {
                max_visible_row: self.max_visible_row,
                height: self.height,
            });
        }
        for (field, value) in [
            ("tile_speed", self.tile_speed),
            ("destroy_speed", self.destroy_speed),
            ("cell_size", self.cell_size),
            ("settle_poll_interval", self.settle_poll_interval),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.scatter_radius < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "scatter_radius",
                value: self.scatter_radius,
            });
        }
        Ok(())
    }

    /// Whether rows above `max_visible_row` exist as a hidden buffer
    pub fn has_hidden_rows(&self) -> bool {
        self.max_visible_row < self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.has_hidden_rows());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = GameConfig::from_json_str(
            r#"{ "width": 6, "height": 12, "max_visible_row": 6, "tile_speed": 4.5 }"#,
        )
        .unwrap();
        assert_eq!(config.width, 6);
        assert_eq!(config.height, 12);
        assert_eq!(config.max_visible_row, 6);
        assert_eq!(config.tile_speed, 4.5);
        assert_eq!(config.destroy_speed, DEFAULT_DESTROY_SPEED);
        assert!(config.has_hidden_rows());
    }

    #[test]
    fn test_rejects_visible_rows_beyond_height() {
        let err = GameConfig::from_json_str(r#"{ "height": 4, "max_visible_row": 5 }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidVisibleRows {
                max_visible_row: 5,
                height: 4
            }
        ));
    }

    #[test]
    fn test_rejects_zero_speed() {
        let config = GameConfig {
            tile_speed: 0.0,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "tile_speed",
                ..
            })
        ));
    }

    #[test]
    fn test_load_validates_file_contents() {
        let path = std::env::temp_dir().join(format!("tile-cascade-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "width": 0 }"#).unwrap();
        let result = GameConfig::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidDimensions { width: 0, .. })
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("tile-cascade-does-not-exist.json");
        assert!(matches!(GameConfig::load(&path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            GameConfig::from_json_str("{ width: 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_keeps_anchor() {
        let config = GameConfig {
            destroy_anchor: Vec3::new(1.0, 2.0, 3.0),
            ..GameConfig::with_size(5, 5)
        };
        let json = config.to_json().unwrap();
        assert_eq!(GameConfig::from_json_str(&json).unwrap(), config);
    }
}
