// src/world_map/decorator.rs
//! Assigns visuals to freshly spawned or recycled tiles.
//!
//! The renderer is passed in per call; the decorator never reaches for
//! shared assets on its own.

use rayon::prelude::*;

use crate::heightfield::HeightField;

use super::tile::{RenderHandle, Tile, TileId};

/// Consumer of decorated tiles (entity spawner, test recorder, ...).
pub trait TileRenderer {
    /// Number of appearance buckets the renderer can show.
    fn appearance_count(&self) -> usize;

    /// Creates or refreshes the visual of `tile`. `tile.visual()` holds the
    /// previous handle when the tile was recycled.
    fn decorate(&mut self, id: TileId, tile: &Tile, bucket: usize) -> RenderHandle;

    /// A decorated tile was parked in the pool.
    fn park(&mut self, _handle: RenderHandle) {}

    /// A tile was destroyed by the pool cap; its visual must go.
    fn release(&mut self, _handle: RenderHandle) {}
}

/// `clamp(elevation, 0, N - 1)`.
#[inline]
pub fn appearance_bucket(elevation: i32, buckets: usize) -> usize {
    let top = buckets.saturating_sub(1) as i64;
    (elevation as i64).clamp(0, top) as usize
}

/// Mutable access to the visual fields of one tile awaiting decoration.
/// Coordinate and pool flags stay read-only.
pub struct DecorationSlot<'a> {
    id: TileId,
    tile: &'a mut Tile,
}

impl<'a> DecorationSlot<'a> {
    pub(crate) fn new(id: TileId, tile: &'a mut Tile) -> Self {
        Self { id, tile }
    }

    #[inline]
    pub fn id(&self) -> TileId {
        self.id
    }

    #[inline]
    pub fn tile(&self) -> &Tile {
        &*self.tile
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TileDecorator;

impl TileDecorator {
    /// Refreshes elevation and visuals of every slot, then clears `dirty`.
    /// Returns the number of tiles decorated.
    pub fn decorate<R: TileRenderer>(
        &self,
        mut slots: Vec<DecorationSlot<'_>>,
        field: &HeightField,
        renderer: &mut R,
    ) -> usize {
        // noise evaluation is the only heavy part and is independent per tile
        slots.par_iter_mut().for_each(|slot| {
            let c = slot.tile.coord;
            slot.tile.elevation = field.elevation(c.x, c.y);
        });

        let buckets = renderer.appearance_count();
        for slot in slots.iter_mut() {
            let bucket = appearance_bucket(slot.tile.elevation, buckets);
            let handle = renderer.decorate(slot.id, &*slot.tile, bucket);
            slot.tile.visual = Some(handle);
            slot.tile.dirty = false;
        }
        slots.len()
    }
}

/// Renderer that keeps visuals as plain records; handy for headless hosts
/// and tests.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    pub buckets: usize,
    pub next_handle: u64,
    /// `(handle, tile coord, bucket)` in decoration order.
    pub decorated: Vec<(RenderHandle, super::rect::TileCoord, usize)>,
    pub parked: Vec<RenderHandle>,
    pub released: Vec<RenderHandle>,
}

impl HeadlessRenderer {
    pub fn new(buckets: usize) -> Self {
        Self { buckets, ..Default::default() }
    }
}

impl TileRenderer for HeadlessRenderer {
    fn appearance_count(&self) -> usize {
        self.buckets
    }

    fn decorate(&mut self, _id: TileId, tile: &Tile, bucket: usize) -> RenderHandle {
        let handle = match tile.visual() {
            Some(handle) => handle,
            None => {
                self.next_handle += 1;
                RenderHandle(self.next_handle)
            }
        };
        self.decorated.push((handle, tile.coord(), bucket));
        handle
    }

    fn park(&mut self, handle: RenderHandle) {
        self.parked.push(handle);
    }

    fn release(&mut self, handle: RenderHandle) {
        self.released.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world_map::rect::TileCoord;

    #[test]
    fn bucket_clamps_to_palette() {
        assert_eq!(appearance_bucket(-3, 5), 0);
        assert_eq!(appearance_bucket(2, 5), 2);
        assert_eq!(appearance_bucket(9, 5), 4);
        assert_eq!(appearance_bucket(3, 1), 0);
        assert_eq!(appearance_bucket(3, 0), 0);
    }

    #[test]
    fn decorate_sets_elevation_and_clears_dirty() {
        let field = HeightField::new(11);
        let mut tiles = vec![Tile::fresh(TileCoord::new(40, -12)), Tile::fresh(TileCoord::new(0, 0))];
        let slots = tiles
            .iter_mut()
            .enumerate()
            .map(|(i, t)| DecorationSlot::new(TileId(i as u32), t))
            .collect();

        let mut renderer = HeadlessRenderer::new(3);
        let n = TileDecorator.decorate(slots, &field, &mut renderer);

        assert_eq!(n, 2);
        for tile in &tiles {
            assert!(!tile.is_dirty());
            assert_eq!(tile.elevation(), field.elevation(tile.coord().x, tile.coord().y));
            assert!(tile.visual().is_some());
        }
        assert_eq!(renderer.decorated[0].1, TileCoord::new(40, -12));
        assert!(renderer.decorated.iter().all(|&(_, _, b)| b < 3));
    }

    #[test]
    fn recycled_tile_keeps_its_handle() {
        let field = HeightField::new(0);
        let mut tile = Tile::fresh(TileCoord::new(1, 1));
        tile.visual = Some(RenderHandle(99));
        tile.reclaim(TileCoord::new(50, 50));

        let mut renderer = HeadlessRenderer::new(5);
        TileDecorator.decorate(vec![DecorationSlot::new(TileId(0), &mut tile)], &field, &mut renderer);

        assert_eq!(tile.visual(), Some(RenderHandle(99)));
        assert_eq!(renderer.next_handle, 0);
        assert_eq!(renderer.decorated[0].1, TileCoord::new(50, 50));
    }
}
