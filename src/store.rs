//! Central state container with synchronous change notification.
//!
//! One [`Store`] is the single source of truth the rest of the client reads:
//! the last authority snapshot, the shape index derived from it, and the
//! interaction state (selection, anchors). Mutation goes through
//! [`Store::set`], which applies a sparse [`StatePatch`] as one struct
//! replacement and then runs every subscriber before returning. Callers
//! that change several fields in one logical step must pass them in one
//! patch; there is no batching, so split patches mean split notifications.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use crate::consts::DEFAULT_PIXEL_SIZE;
use crate::picker::ShapeIndex;
use crate::scene::{Point, Pos, ShapeId};

/// Everything subscribers can observe.
///
/// `shapes` is always the index of `snapshot`: [`Store::set`] rebuilds it in
/// the same call that installs a new snapshot, before any subscriber runs.
#[derive(Debug, Clone, Default)]
pub struct State {
    /// The ordered point set last returned by the authority.
    pub snapshot: Vec<Point>,
    /// Shape id → point list, derived from `snapshot`.
    pub shapes: ShapeIndex,
    /// The shape the user currently has selected, if any.
    pub selected_id: Option<ShapeId>,
    /// Explicit pivot for wheel rotate/scale gestures.
    pub rotate_center: Option<Pos>,
    /// Anchor of the current incremental drag; deltas are measured from here.
    pub move_start: Option<Pos>,
    /// Square side used for points that carry no per-point width.
    pub pixel_size: u32,
}

impl State {
    #[must_use]
    pub fn new() -> Self {
        Self { pixel_size: DEFAULT_PIXEL_SIZE, ..Self::default() }
    }
}

/// Sparse update for [`State`]. Only present fields are applied.
///
/// Clearable fields are doubly optional: `None` leaves the field alone,
/// `Some(None)` clears it, `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default)]
pub struct StatePatch {
    /// Replacement snapshot; installing one also rebuilds the shape index.
    pub snapshot: Option<Vec<Point>>,
    /// New selection, if being updated.
    pub selected_id: Option<Option<ShapeId>>,
    /// New rotation pivot, if being updated.
    pub rotate_center: Option<Option<Pos>>,
    /// New drag anchor, if being updated.
    pub move_start: Option<Option<Pos>>,
    /// New default point size, if being updated.
    pub pixel_size: Option<u32>,
}

/// Token returned by [`Store::subscribe`], used to remove the listener.
pub type SubscriberId = usize;

type Subscriber = Box<dyn FnMut(&State)>;

/// The state container. See the module docs for the mutation contract.
pub struct Store {
    state: State,
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_subscriber: SubscriberId,
}

impl Store {
    #[must_use]
    pub fn new() -> Self {
        Self { state: State::new(), subscribers: Vec::new(), next_subscriber: 0 }
    }

    /// Read-only view of the current state.
    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Apply `patch` atomically, then synchronously notify every subscriber.
    ///
    /// The patch is applied to a scratch copy which replaces the live state
    /// in one assignment, so subscribers never observe a half-applied
    /// patch. All subscribers run before `set` returns; their relative
    /// order is unspecified.
    pub fn set(&mut self, patch: StatePatch) {
        let mut next = self.state.clone();
        if let Some(snapshot) = patch.snapshot {
            next.shapes = ShapeIndex::rebuild(&snapshot);
            next.snapshot = snapshot;
        }
        if let Some(selected_id) = patch.selected_id {
            next.selected_id = selected_id;
        }
        if let Some(rotate_center) = patch.rotate_center {
            next.rotate_center = rotate_center;
        }
        if let Some(move_start) = patch.move_start {
            next.move_start = move_start;
        }
        if let Some(pixel_size) = patch.pixel_size {
            next.pixel_size = pixel_size;
        }
        self.state = next;

        let state = &self.state;
        for (_, subscriber) in &mut self.subscribers {
            subscriber(state);
        }
    }

    /// Register a change listener; it runs on every subsequent [`Store::set`].
    pub fn subscribe(&mut self, subscriber: impl FnMut(&State) + 'static) -> SubscriberId {
        let id = self.next_subscriber;
        self.next_subscriber += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a listener. Returns `false` if the token is unknown.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
