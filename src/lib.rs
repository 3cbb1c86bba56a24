pub mod config;
pub mod heightfield;
pub mod world_map;

pub use config::{ConfigError, OversizePolicy, WorldMapConfig, DEFAULT_CONFIG_PATH};
pub use heightfield::HeightField;
pub use world_map::WorldMapPlugin;
