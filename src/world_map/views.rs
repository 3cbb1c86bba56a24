// src/world_map/views.rs
//! Bookkeeping for the set of live views and their last processed rects.

use std::collections::BTreeMap;

use super::rect::ViewRect;

/// Identity of one external view (a camera entity in the Bevy host).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

/// Per-view record owned by the streamer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewState {
    /// Rect submitted by the view producer.
    pub current: ViewRect,
    /// Rect the spawn pass last materialized; `None` is the empty sentinel.
    pub last_processed: Option<ViewRect>,
}

impl ViewState {
    fn new(current: ViewRect) -> Self {
        Self { current, last_processed: None }
    }

    #[inline]
    pub fn changed(&self) -> bool {
        self.last_processed != Some(self.current)
    }
}

/// What one reconciliation did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reconciled {
    pub created: usize,
    pub destroyed: usize,
}

/// Live rects as submitted, plus one `ViewState` per reconciled view.
/// Both maps are ordered so every pass visits views by ascending id.
#[derive(Debug, Default)]
pub struct ViewLifecycle {
    live: BTreeMap<ViewId, ViewRect>,
    states: BTreeMap<ViewId, ViewState>,
}

impl ViewLifecycle {
    /// Sets (`Some`) or withdraws (`None`) the live rect of a view.
    pub fn set_live(&mut self, view: ViewId, rect: Option<ViewRect>) {
        match rect {
            Some(rect) => {
                self.live.insert(view, rect);
            }
            None => {
                self.live.remove(&view);
            }
        }
    }

    pub fn live_rect(&self, view: ViewId) -> Option<ViewRect> {
        self.live.get(&view).copied()
    }

    /// Creates states for new views, drops states of vanished views, and
    /// copies the live rect into `current` for the rest.
    pub fn reconcile(&mut self) -> Reconciled {
        let before = self.states.len();
        self.states.retain(|id, _| self.live.contains_key(id));
        let destroyed = before - self.states.len();

        let mut created = 0;
        for (&id, &rect) in &self.live {
            match self.states.get_mut(&id) {
                Some(state) => state.current = rect,
                None => {
                    self.states.insert(id, ViewState::new(rect));
                    created += 1;
                }
            }
        }
        Reconciled { created, destroyed }
    }

    pub fn get(&self, view: ViewId) -> Option<&ViewState> {
        self.states.get(&view)
    }

    pub fn states(&self) -> impl Iterator<Item = (ViewId, &ViewState)> + '_ {
        self.states.iter().map(|(&id, state)| (id, state))
    }

    pub(crate) fn states_mut(&mut self) -> impl Iterator<Item = (ViewId, &mut ViewState)> + '_ {
        self.states.iter_mut().map(|(&id, state)| (id, state))
    }

    /// Current rects of every reconciled view.
    pub fn current_rects(&self) -> Vec<ViewRect> {
        self.states.values().map(|s| s.current).collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_view_starts_with_sentinel() {
        let mut views = ViewLifecycle::default();
        views.set_live(ViewId(1), Some(ViewRect::new(0, 0, 4, 4)));
        assert_eq!(views.reconcile(), Reconciled { created: 1, destroyed: 0 });

        let state = views.get(ViewId(1)).unwrap();
        assert_eq!(state.last_processed, None);
        assert!(state.changed());
    }

    #[test]
    fn withdrawn_view_is_destroyed_on_reconcile() {
        let mut views = ViewLifecycle::default();
        views.set_live(ViewId(1), Some(ViewRect::new(0, 0, 4, 4)));
        views.set_live(ViewId(2), Some(ViewRect::new(9, 9, 1, 1)));
        views.reconcile();

        views.set_live(ViewId(1), None);
        assert!(views.get(ViewId(1)).is_some());
        assert_eq!(views.reconcile(), Reconciled { created: 0, destroyed: 1 });
        assert!(views.get(ViewId(1)).is_none());
        assert_eq!(views.current_rects(), vec![ViewRect::new(9, 9, 1, 1)]);
    }

    #[test]
    fn reconcile_refreshes_current_rect() {
        let mut views = ViewLifecycle::default();
        views.set_live(ViewId(4), Some(ViewRect::new(0, 0, 2, 2)));
        views.reconcile();
        views.set_live(ViewId(4), Some(ViewRect::new(1, 0, 2, 2)));
        assert_eq!(views.reconcile(), Reconciled::default());
        assert_eq!(views.get(ViewId(4)).unwrap().current, ViewRect::new(1, 0, 2, 2));
    }
}
