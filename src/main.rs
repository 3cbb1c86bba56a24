use bevy::prelude::*;

mod input;
mod setup;

use input::camera_controller;
use worldmap::world_map::{StreamingStats, WorldMapSet};
use worldmap::{WorldMapConfig, WorldMapPlugin, DEFAULT_CONFIG_PATH};

fn main() {
    let config = WorldMapConfig::load_or_default(DEFAULT_CONFIG_PATH);

    App::new()
        // core engine plugins
        .add_plugins(DefaultPlugins)
        // the streamed grid
        .add_plugins(WorldMapPlugin::new(config))
        // camera, lights
        .add_systems(Startup, setup::setup)
        // move the camera before its footprint is extracted
        .add_systems(Update, camera_controller.before(WorldMapSet::Extract))
        .add_systems(Update, report_stats.after(WorldMapSet::Stream))
        .run();
}

/// Logs pool/tile counts every few seconds.
fn report_stats(
    time: Res<Time>,
    mut timer: Local<Option<Timer>>,
    stats: Res<StreamingStats>,
    streamer: Res<worldmap::world_map::TileStreamer>,
) {
    let timer = timer.get_or_insert_with(|| Timer::from_seconds(5.0, TimerMode::Repeating));
    if timer.tick(time.delta()).just_finished() {
        info!(
            "WorldMap: {} live tiles, {} pooled, frame {} (last {:?})",
            streamer.live_tile_count(),
            streamer.pooled_len(),
            stats.frames,
            stats.last,
        );
    }
}
