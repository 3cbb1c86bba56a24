// src/config.rs
//! Data-driven settings for the world map, read from a `.ron` file.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::world_map::pool::PoolPolicy;
use crate::world_map::rect::MAX_VIEW_EXTENT;

pub const DEFAULT_CONFIG_PATH: &str = "assets/config/world_map.ron";

/// What `submit_view` does with a rect wider or taller than `max_extent`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OversizePolicy {
    /// Shrink to `max_extent` and warn.
    #[default]
    Clamp,
    /// Refuse the submission; the view keeps its previous rect.
    Reject,
}

#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldMapConfig {
    /// Cells added on every side of a camera's ground footprint.
    pub padding: i32,
    /// Max width/height of a view rect, at most 1000.
    pub max_extent: i32,
    pub pool_policy: PoolPolicy,
    /// Optional bound on parked tiles; oldest are destroyed first.
    pub pool_cap: Option<usize>,
    pub oversize: OversizePolicy,
    pub noise_seed: u32,
    /// World units per grid cell.
    pub tile_size: f32,
    /// One linear RGB color per elevation bucket, lowest first.
    pub appearance: Vec<[f32; 3]>,
    /// Draw each ground-projected camera's footprint with gizmos.
    pub debug_corners: bool,
}

impl Default for WorldMapConfig {
    fn default() -> Self {
        Self {
            padding: 5,
            max_extent: MAX_VIEW_EXTENT,
            pool_policy: PoolPolicy::Lagged,
            pool_cap: None,
            oversize: OversizePolicy::Clamp,
            noise_seed: 0,
            tile_size: 1.0,
            appearance: vec![
                [0.10, 0.30, 0.60], // water
                [0.76, 0.70, 0.50], // sand
                [0.25, 0.55, 0.20], // grass
                [0.45, 0.42, 0.40], // rock
                [0.95, 0.95, 0.97], // snow
            ],
            debug_corners: false,
        }
    }
}

impl WorldMapConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = ron::de::from_str(text).map_err(|e| ConfigError::Ron(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_ron_str(&text)
    }

    /// Loads `path`, falling back to defaults with a warning.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("WorldMap: using default config ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Copy with every field forced into range, for configs built in code
    /// that never went through `validate`.
    pub fn sanitized(&self) -> Self {
        let mut cfg = self.clone();
        cfg.max_extent = cfg.max_extent.clamp(1, MAX_VIEW_EXTENT);
        cfg.padding = cfg.padding.max(0);
        if !(cfg.tile_size.is_finite() && cfg.tile_size > 0.0) {
            cfg.tile_size = 1.0;
        }
        if cfg.appearance.is_empty() {
            cfg.appearance = Self::default().appearance;
        }
        cfg
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_VIEW_EXTENT).contains(&self.max_extent) {
            return Err(ConfigError::Invalid(format!(
                "max_extent {} outside 1..={}",
                self.max_extent, MAX_VIEW_EXTENT
            )));
        }
        if self.padding < 0 {
            return Err(ConfigError::Invalid(format!("negative padding {}", self.padding)));
        }
        if self.appearance.is_empty() {
            return Err(ConfigError::Invalid("appearance needs at least one color".into()));
        }
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(ConfigError::Invalid(format!("tile_size {} must be positive", self.tile_size)));
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("I/O while reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = WorldMapConfig::from_ron_str("(padding: 2, pool_policy: Immediate, pool_cap: Some(64))").unwrap();
        assert_eq!(cfg.padding, 2);
        assert_eq!(cfg.pool_policy, PoolPolicy::Immediate);
        assert_eq!(cfg.pool_cap, Some(64));
        assert_eq!(cfg.max_extent, 1000);
        assert_eq!(cfg.appearance.len(), 5);
    }

    #[test]
    fn rejects_extent_above_hard_cap() {
        let err = WorldMapConfig::from_ron_str("(max_extent: 5000)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn rejects_empty_palette_and_bad_syntax() {
        assert!(matches!(
            WorldMapConfig::from_ron_str("(appearance: [])"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(WorldMapConfig::from_ron_str("(padding: )"), Err(ConfigError::Ron(_))));
    }

    #[test]
    fn sanitized_forces_fields_into_range() {
        let cfg = WorldMapConfig {
            max_extent: 1500,
            padding: -2,
            tile_size: f32::NAN,
            appearance: Vec::new(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let fixed = cfg.sanitized();
        assert_eq!(fixed.max_extent, MAX_VIEW_EXTENT);
        assert_eq!(fixed.padding, 0);
        assert_eq!(fixed.tile_size, 1.0);
        assert_eq!(fixed.appearance.len(), 5);
        fixed.validate().unwrap();

        assert_eq!(WorldMapConfig { max_extent: 0, ..Default::default() }.sanitized().max_extent, 1);
        assert_eq!(WorldMapConfig::default().sanitized(), WorldMapConfig::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = WorldMapConfig::load("does/not/exist.ron").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn shipped_config_parses() {
        let cfg = WorldMapConfig::load(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/config/world_map.ron")).unwrap();
        assert_eq!(cfg.max_extent, 1000);
        assert_eq!(cfg.padding, 5);
    }
}
