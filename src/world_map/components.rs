// src/world_map/components.rs
use bevy::prelude::*;

use super::engine::FrameReport;
use super::rect::{TileCoord, ViewRect};
use super::tile::TileId;

/// One external view onto the grid. Whoever owns the entity writes the
/// rect; `None` means the view sees no ground this frame.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapView {
    pub rect: Option<ViewRect>,
}

impl MapView {
    #[inline]
    pub const fn new(rect: ViewRect) -> Self {
        Self { rect: Some(rect) }
    }
}

/// Marks a camera whose `MapView` is projected from its frustum every frame.
#[derive(Component, Clone, Copy, Debug, Default)]
#[require(MapView)]
pub struct GroundProjectedView;

/// Visual of one streamed tile.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldMapTile {
    pub id: TileId,
    pub coord: TileCoord,
}

/// Counters from the most recent `step`.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct StreamingStats {
    pub last: FrameReport,
    pub frames: u64,
}

/// Shared mesh plus one material per appearance bucket.
#[derive(Resource, Clone, Debug, Default)]
pub struct TilePalette {
    pub mesh: Handle<Mesh>,
    pub materials: Vec<Handle<StandardMaterial>>,
}

impl TilePalette {
    /// Placeholder handles, one per bucket; nothing is drawn.
    pub fn placeholder(buckets: usize) -> Self {
        Self {
            mesh: Handle::default(),
            materials: vec![Handle::default(); buckets],
        }
    }
}
