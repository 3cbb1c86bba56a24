// src/world_map/engine.rs
//! The tile streaming cache.
//!
//! One `step` runs four passes in a fixed order:
//! 1. reconcile the tracked views with the submitted ones,
//! 2. park every live tile that no current view covers,
//! 3. fill cells each changed view gained since it was last processed,
//!    recycling parked tiles before allocating,
//! 4. decorate tiles that are new or dirty.
//!
//! Passes 2 and 3 evaluate in parallel and emit changelists that are
//! applied single-threaded at the end of the pass.

use std::collections::HashMap;

use bevy::prelude::*;
use rayon::prelude::*;

use crate::config::{OversizePolicy, WorldMapConfig};
use crate::heightfield::HeightField;

use super::decorator::{DecorationSlot, TileDecorator, TileRenderer};
use super::error::{GridError, RectIssue};
use super::pool::{PoolPolicy, ReuseBudget, TilePool};
use super::rect::{TileCoord, ViewRect, MAX_VIEW_EXTENT};
use super::tile::{Tile, TileId, TileSnapshot};
use super::views::{ViewId, ViewLifecycle, ViewState};

/// Counters for one `step`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub views_created: usize,
    pub views_destroyed: usize,
    /// Tiles parked by the cleanup pass.
    pub evicted: usize,
    /// Cells filled from the pool.
    pub reused: usize,
    /// Cells filled by allocating a new tile.
    pub fresh: usize,
    pub decorated: usize,
    /// Parked tiles destroyed by the pool cap.
    pub destroyed: usize,
}

impl FrameReport {
    #[inline]
    pub fn spawned(&self) -> usize {
        self.reused + self.fresh
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Owns every tile, the pool, and the per-view state.
#[derive(Resource)]
pub struct TileStreamer {
    /// Tile slots indexed by `TileId`; `None` after a cap destruction.
    tiles: Vec<Option<Tile>>,
    vacant: Vec<TileId>,
    /// Coordinate of every tile that is not parked.
    occupied: HashMap<TileCoord, TileId>,
    pool: TilePool,
    views: ViewLifecycle,
    field: HeightField,
    decorator: TileDecorator,
    policy: PoolPolicy,
    pool_cap: Option<usize>,
    oversize: OversizePolicy,
    max_extent: i32,
}

impl TileStreamer {
    /// `max_extent` is forced into `1..=MAX_VIEW_EXTENT` whatever the config says.
    pub fn new(config: &WorldMapConfig) -> Self {
        Self {
            tiles: Vec::new(),
            vacant: Vec::new(),
            occupied: HashMap::new(),
            pool: TilePool::new(),
            views: ViewLifecycle::default(),
            field: HeightField::new(config.noise_seed),
            decorator: TileDecorator,
            policy: config.pool_policy,
            pool_cap: config.pool_cap,
            oversize: config.oversize,
            max_extent: config.max_extent.clamp(1, MAX_VIEW_EXTENT),
        }
    }

    // ---------- External interface ----------

    /// Registers or updates a view (`Some`) or withdraws it (`None`).
    ///
    /// An invalid rect leaves the view's previous rect in place. Oversized
    /// rects are clamped or rejected depending on the configured policy.
    pub fn submit_view(&mut self, view: ViewId, rect: Option<ViewRect>) -> Result<(), GridError> {
        let Some(rect) = rect else {
            self.views.set_live(view, None);
            return Ok(());
        };

        let accepted = match rect.check(self.max_extent) {
            Ok(()) => rect,
            Err(RectIssue::TooLarge { .. }) if self.oversize == OversizePolicy::Clamp => {
                let clamped = rect.clamped(self.max_extent);
                // clamping can't fix an origin near i32::MAX
                if let Err(issue) = clamped.check(self.max_extent) {
                    return Err(self.reject(view, rect, issue));
                }
                warn!("WorldMap: view {:?} rect {:?} clamped to {:?}", view, rect, clamped);
                clamped
            }
            Err(issue) => return Err(self.reject(view, rect, issue)),
        };

        self.views.set_live(view, Some(accepted));
        Ok(())
    }

    fn reject(&self, view: ViewId, rect: ViewRect, issue: RectIssue) -> GridError {
        let err = GridError::InvalidRect { view, rect, issue };
        warn!("WorldMap: {}", err);
        err
    }

    /// Advances one frame.
    pub fn step<R: TileRenderer>(&mut self, renderer: &mut R) -> FrameReport {
        let mut report = FrameReport::default();

        // 1) view reconciliation
        let reconciled = self.views.reconcile();
        report.views_created = reconciled.created;
        report.views_destroyed = reconciled.destroyed;

        // the lagged policy may only reuse what was parked before cleanup
        let mut budget = ReuseBudget::snapshot(&self.pool, self.policy);

        // 2) cleanup
        report.evicted = self.cleanup_pass(renderer);

        // 3) spawn
        let (reused, fresh) = self.spawn_pass(&mut budget);
        report.reused = reused;
        report.fresh = fresh;

        if let Some(cap) = self.pool_cap {
            report.destroyed = self.enforce_pool_cap(cap, renderer);
        }

        // 4) decoration
        report.decorated = self.decoration_pass(renderer);

        if !report.is_idle() {
            debug!(
                "WorldMap step: views +{}/-{}, evicted {}, reused {}, fresh {}, decorated {}, destroyed {} (pool {})",
                report.views_created,
                report.views_destroyed,
                report.evicted,
                report.reused,
                report.fresh,
                report.decorated,
                report.destroyed,
                self.pool.len(),
            );
        }
        report
    }

    /// Every tile slot in id order, parked ones included.
    pub fn iter_tiles(&self) -> impl Iterator<Item = TileSnapshot> + '_ {
        self.tiles.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref().map(|t| TileSnapshot {
                id: TileId(i as u32),
                coord: t.coord,
                elevation: t.elevation,
                dirty: t.dirty,
                pooled: t.out_of_view,
            })
        })
    }

    // ---------- Queries ----------

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.index()).and_then(|t| t.as_ref())
    }

    /// The live (not parked) tile at a coordinate.
    pub fn tile_at(&self, coord: TileCoord) -> Option<(TileId, &Tile)> {
        let id = *self.occupied.get(&coord)?;
        self.tile(id).map(|t| (id, t))
    }

    /// Tiles allocated and not destroyed, parked ones included.
    pub fn tile_count(&self) -> usize {
        self.tiles.len() - self.vacant.len()
    }

    pub fn live_tile_count(&self) -> usize {
        self.occupied.len()
    }

    pub fn pooled_len(&self) -> usize {
        self.pool.len()
    }

    pub fn pooled_ids(&self) -> Vec<TileId> {
        self.pool.iter().collect()
    }

    pub fn view_state(&self, view: ViewId) -> Result<&ViewState, GridError> {
        self.views.get(view).ok_or(GridError::UnknownView(view))
    }

    /// Rect the spawn pass last filled for `view`.
    pub fn last_processed(&self, view: ViewId) -> Option<ViewRect> {
        self.views.get(view).and_then(|s| s.last_processed)
    }

    /// The rect most recently accepted for `view`, reconciled or not.
    pub fn view_rect(&self, view: ViewId) -> Option<ViewRect> {
        self.views.live_rect(view)
    }

    pub fn views(&self) -> impl Iterator<Item = (ViewId, &ViewState)> + '_ {
        self.views.states()
    }

    pub fn height_field(&self) -> &HeightField {
        &self.field
    }

    pub fn policy(&self) -> PoolPolicy {
        self.policy
    }

    // ---------- Passes ----------

    fn cleanup_pass<R: TileRenderer>(&mut self, renderer: &mut R) -> usize {
        let rects = self.views.current_rects();

        // changelist of tiles no view covers, in id order
        let to_park: Vec<TileId> = self
            .tiles
            .par_iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                let tile = slot.as_ref()?;
                if tile.out_of_view || rects.iter().any(|r| r.contains(tile.coord)) {
                    None
                } else {
                    Some(TileId(i as u32))
                }
            })
            .collect();

        for &id in &to_park {
            let Some(tile) = self.tiles[id.index()].as_mut() else { continue };
            tile.out_of_view = true;
            if self.occupied.get(&tile.coord) == Some(&id) {
                self.occupied.remove(&tile.coord);
            }
            if let Some(handle) = tile.visual {
                renderer.park(handle);
            }
            self.pool.park(id);
        }
        to_park.len()
    }

    fn spawn_pass(&mut self, budget: &mut ReuseBudget) -> (usize, usize) {
        // a new view diffs against the empty sentinel, i.e. a full fill
        let changed: Vec<(ViewId, ViewRect, Option<ViewRect>)> = self
            .views
            .states()
            .filter(|(_, s)| s.changed())
            .map(|(id, s)| (id, s.current, s.last_processed))
            .collect();
        if changed.is_empty() {
            return (0, 0);
        }

        // needed cells per view, computed in parallel, applied in view order
        let needed: Vec<(ViewId, Vec<TileCoord>)> = changed
            .par_iter()
            .map(|&(id, current, last)| (id, current.cells_not_in(last)))
            .collect();

        let (mut reused, mut fresh) = (0, 0);
        for (_, cells) in &needed {
            for &cell in cells {
                // another view may already hold this cell
                if self.occupied.contains_key(&cell) {
                    continue;
                }
                if self.reclaim_pooled(cell, budget) {
                    reused += 1;
                } else {
                    self.allocate(cell);
                    fresh += 1;
                }
            }
        }

        let done: HashMap<ViewId, ViewRect> = changed.iter().map(|&(id, cur, _)| (id, cur)).collect();
        for (id, state) in self.views.states_mut() {
            if let Some(&rect) = done.get(&id) {
                state.last_processed = Some(rect);
            }
        }
        (reused, fresh)
    }

    /// Moves the oldest usable parked tile to `cell`.
    fn reclaim_pooled(&mut self, cell: TileCoord, budget: &mut ReuseBudget) -> bool {
        while let Some(id) = budget.take_from(&mut self.pool) {
            let Some(tile) = self.tiles.get_mut(id.index()).and_then(|t| t.as_mut()) else {
                debug_assert!(false, "pool held destroyed tile {id:?}");
                error!("WorldMap: dropping destroyed tile {:?} from pool", id);
                continue;
            };
            if !tile.out_of_view {
                debug_assert!(false, "tile {id:?} is both pooled and in use");
                error!("WorldMap: tile {:?} was pooled while in use; dropping pool entry", id);
                continue;
            }
            tile.reclaim(cell);
            self.occupied.insert(cell, id);
            return true;
        }
        false
    }

    fn allocate(&mut self, cell: TileCoord) -> TileId {
        let tile = Tile::fresh(cell);
        let id = match self.vacant.pop() {
            Some(id) => {
                self.tiles[id.index()] = Some(tile);
                id
            }
            None => {
                self.tiles.push(Some(tile));
                TileId((self.tiles.len() - 1) as u32)
            }
        };
        self.occupied.insert(cell, id);
        id
    }

    /// Destroys the oldest parked tiles beyond `cap`.
    fn enforce_pool_cap<R: TileRenderer>(&mut self, cap: usize, renderer: &mut R) -> usize {
        let dropped = self.pool.trim_to(cap);
        for &id in &dropped {
            if let Some(tile) = self.tiles[id.index()].take() {
                if let Some(handle) = tile.visual {
                    renderer.release(handle);
                }
                self.vacant.push(id);
            }
        }
        // keep slot reuse lowest-id first
        self.vacant.sort_unstable_by(|a, b| b.cmp(a));
        dropped.len()
    }

    fn decoration_pass<R: TileRenderer>(&mut self, renderer: &mut R) -> usize {
        let slots: Vec<DecorationSlot<'_>> = self
            .tiles
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| {
                let tile = slot.as_mut()?;
                if tile.needs_decoration() {
                    Some(DecorationSlot::new(TileId(i as u32), tile))
                } else {
                    None
                }
            })
            .collect();
        if slots.is_empty() {
            return 0;
        }
        self.decorator.decorate(slots, &self.field, renderer)
    }
}

impl Default for TileStreamer {
    fn default() -> Self {
        Self::new(&WorldMapConfig::default())
    }
}
