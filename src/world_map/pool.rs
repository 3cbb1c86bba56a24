// src/world_map/pool.rs
//! Parking lot for tiles that scrolled out of every view.
//!
//! Tiles are never freed while parked; spawning pulls from the front so the
//! oldest evictions are recycled first and the order is reproducible.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::tile::TileId;

/// When tiles evicted by a frame's cleanup become reusable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolPolicy {
    /// Spawn only consumes tiles pooled before the frame started.
    /// Tiles evicted this frame are reusable from the next frame on.
    #[default]
    Lagged,
    /// Cleanup fully lands before spawn, so same-frame evictions are reused.
    Immediate,
}

/// FIFO of parked tile ids.
#[derive(Debug, Default)]
pub struct TilePool {
    queue: VecDeque<TileId>,
}

impl TilePool {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Parks a tile at the back of the queue.
    pub fn park(&mut self, id: TileId) {
        self.queue.push_back(id);
    }

    /// Takes the oldest parked tile.
    pub fn take(&mut self) -> Option<TileId> {
        self.queue.pop_front()
    }

    /// Drops the oldest entries until at most `cap` remain, returning them.
    pub fn trim_to(&mut self, cap: usize) -> Vec<TileId> {
        let excess = self.queue.len().saturating_sub(cap);
        self.queue.drain(..excess).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = TileId> + '_ {
        self.queue.iter().copied()
    }
}

/// How many pooled tiles one frame's spawn pass may consume.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReuseBudget(usize);

impl ReuseBudget {
    /// Must be taken before the cleanup pass parks anything.
    pub(crate) fn snapshot(pool: &TilePool, policy: PoolPolicy) -> Self {
        match policy {
            PoolPolicy::Lagged => Self(pool.len()),
            PoolPolicy::Immediate => Self(usize::MAX),
        }
    }

    pub(crate) fn take_from(&mut self, pool: &mut TilePool) -> Option<TileId> {
        if self.0 == 0 {
            return None;
        }
        let id = pool.take()?;
        self.0 -= 1;
        Some(id)
    }
}
