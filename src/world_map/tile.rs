// src/world_map/tile.rs
use super::rect::TileCoord;

/// Stable slot index of a tile inside the streamer; survives recycling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u32);

impl TileId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Opaque handle to whatever the renderer allocated for a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderHandle(pub u64);

/// One materialized grid cell.
///
/// Coordinate and pool membership are owned by the streamer; the
/// decorator only touches `elevation`, `visual` and `dirty`.
#[derive(Clone, Debug)]
pub struct Tile {
    pub(crate) coord: TileCoord,
    pub(crate) elevation: i32,
    pub(crate) dirty: bool,
    pub(crate) out_of_view: bool,
    pub(crate) visual: Option<RenderHandle>,
}

impl Tile {
    pub(crate) fn fresh(coord: TileCoord) -> Self {
        Self {
            coord,
            elevation: 0,
            dirty: true,
            out_of_view: false,
            visual: None,
        }
    }

    /// Moves a pooled tile to `coord` and flags it for redecoration.
    pub(crate) fn reclaim(&mut self, coord: TileCoord) {
        self.coord = coord;
        self.out_of_view = false;
        self.dirty = true;
    }

    #[inline]
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    #[inline]
    pub fn elevation(&self) -> i32 {
        self.elevation
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn is_out_of_view(&self) -> bool {
        self.out_of_view
    }

    #[inline]
    pub fn visual(&self) -> Option<RenderHandle> {
        self.visual
    }

    /// True when the decoration pass has to visit this tile.
    #[inline]
    pub(crate) fn needs_decoration(&self) -> bool {
        !self.out_of_view && (self.dirty || self.visual.is_none())
    }
}

/// Read-only view of a tile handed out by `TileStreamer::iter_tiles`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileSnapshot {
    pub id: TileId,
    pub coord: TileCoord,
    pub elevation: i32,
    pub dirty: bool,
    pub pooled: bool,
}
