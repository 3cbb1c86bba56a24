// src/world_map/plugin.rs
use bevy::ecs::schedule::common_conditions::resource_exists;
use bevy::prelude::*;

use crate::config::WorldMapConfig;
use crate::heightfield::HeightField;

use super::components::{StreamingStats, TilePalette};
use super::engine::TileStreamer;
use super::systems::{
    draw_view_corners, extract_camera_views, setup_tile_palette, stream_tiles, submit_views,
};

/// Per-frame ordering of the world map.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum WorldMapSet {
    Extract, // cameras → MapView
    Submit,  // MapView → streamer
    Stream,  // step + tile entities
}

pub struct WorldMapPlugin {
    pub config: WorldMapConfig,
    /// Skip mesh/material creation (no render plugin in the app).
    pub headless: bool,
}

impl WorldMapPlugin {
    pub fn new(config: WorldMapConfig) -> Self {
        Self { config, headless: false }
    }

    pub fn headless() -> Self {
        Self { config: WorldMapConfig::default(), headless: true }
    }

    pub fn with_config(mut self, config: WorldMapConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for WorldMapPlugin {
    fn default() -> Self {
        Self::new(WorldMapConfig::default())
    }
}

impl Plugin for WorldMapPlugin {
    fn build(&self, app: &mut App) {
        if let Err(e) = self.config.validate() {
            warn!("WorldMap: {}; out-of-range fields forced into range", e);
        }
        let cfg = self.config.sanitized();
        info!(
            "WorldMap: padding {}, max extent {}, pool {:?} (cap {:?}), oversize {:?}, seed {}, {} buckets{}",
            cfg.padding,
            cfg.max_extent,
            cfg.pool_policy,
            cfg.pool_cap,
            cfg.oversize,
            cfg.noise_seed,
            cfg.appearance.len(),
            if self.headless { ", headless" } else { "" },
        );

        app
            .insert_resource(cfg.clone())
            .insert_resource(TileStreamer::new(&cfg))
            .insert_resource(HeightField::new(cfg.noise_seed))
            .init_resource::<StreamingStats>()
            .configure_sets(
                Update,
                (WorldMapSet::Extract, WorldMapSet::Submit, WorldMapSet::Stream).chain(),
            )
            .add_systems(Update, extract_camera_views.in_set(WorldMapSet::Extract))
            .add_systems(Update, submit_views.in_set(WorldMapSet::Submit))
            // the palette shows up after Startup in rendered apps
            .add_systems(
                Update,
                stream_tiles
                    .in_set(WorldMapSet::Stream)
                    .run_if(resource_exists::<TilePalette>),
            );

        if self.headless {
            app.insert_resource(TilePalette::placeholder(cfg.appearance.len()));
        } else {
            app.add_systems(Startup, setup_tile_palette);
            if cfg.debug_corners {
                app.add_systems(Update, draw_view_corners.after(WorldMapSet::Extract));
            }
        }
    }
}
