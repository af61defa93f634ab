//! Drag/transform controller: turns pointer gestures into remote calls.
//!
//! A gesture is pointer-down → pointer-move* → pointer-up, with optional
//! wheel ticks while active. The controller converts it into one batch on
//! the authority: `transform_begin`, zero or more incremental mutations,
//! `transform_end`. Begin and end are paired exactly once per session no
//! matter how many incremental calls happen in between or how many of them
//! fail — a begin failure downgrades undo granularity, it never breaks the
//! edit.
//!
//! Events arrive through [`Controller::handle`], an `async fn` the event
//! pump awaits to completion before dispatching the next event. That makes
//! the in-flight policy structural: at most one remote call is outstanding
//! per session, and pointer deltas that arrive while a call would be in
//! flight coalesce into the next delta because the anchor only advances
//! when a response lands.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::api::{ApiError, Authority, MutationReply};
use crate::consts::{PICK_THRESHOLD_PX, ROTATE_STEP_RAD, SCALE_STEP_DOWN, SCALE_STEP_UP};
use crate::input::{Gesture, InputEvent, Modifiers, WheelDirection};
use crate::scene::{Point, Pos, ShapeId};
use crate::store::{StatePatch, Store};

/// The drag/transform controller. Owns the store, the authority handle, and
/// the per-gesture session state.
pub struct Controller<A> {
    authority: A,
    store: Store,
    gesture: Gesture,
    pick_threshold: f64,
}

impl<A: Authority> Controller<A> {
    #[must_use]
    pub fn new(authority: A) -> Self {
        Self {
            authority,
            store: Store::new(),
            gesture: Gesture::Idle,
            pick_threshold: PICK_THRESHOLD_PX,
        }
    }

    /// Override the pick tolerance (pixels).
    pub fn set_pick_threshold(&mut self, threshold: f64) {
        self.pick_threshold = threshold;
    }

    /// The store this controller mutates. Subscribe here for repaints.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Read-only view of the store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Whether a drag session is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// Place (or clear) the pivot used by wheel rotate/scale.
    pub fn set_rotate_center(&mut self, center: Option<Pos>) {
        self.store.set(StatePatch { rotate_center: Some(center), ..StatePatch::default() });
    }

    /// Feed one input event through the state machine.
    ///
    /// Transport failures inside a session are logged, never propagated:
    /// the user keeps dragging and the next event re-syncs. Events that
    /// don't apply in the current state (a move with no session, a wheel
    /// tick with nothing selected) are no-ops.
    pub async fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(x, y).await,
            InputEvent::PointerMove { x, y } => self.pointer_move(x, y).await,
            InputEvent::PointerUp => self.pointer_up().await,
            InputEvent::WheelTick { direction, modifiers } => {
                self.wheel_tick(direction, modifiers).await;
            }
            InputEvent::Deselect => self.deselect(),
        }
    }

    /// Fetch the authoritative snapshot and install it.
    ///
    /// # Errors
    /// Transport or decode failure; the store is left unchanged.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let points = self.authority.get_points().await?;
        self.store.set(StatePatch { snapshot: Some(points), ..StatePatch::default() });
        Ok(())
    }

    /// Revert the last committed batch and install the resulting snapshot.
    /// Selection is reset: the reverted shape may no longer exist.
    ///
    /// # Errors
    /// Transport or decode failure; selection is still reset.
    pub async fn undo(&mut self) -> Result<(), ApiError> {
        match self.authority.undo().await {
            Ok(points) => {
                self.store.set(StatePatch {
                    snapshot: Some(points),
                    selected_id: Some(None),
                    move_start: Some(None),
                    ..StatePatch::default()
                });
                Ok(())
            }
            Err(error) => {
                self.store.set(StatePatch {
                    selected_id: Some(None),
                    move_start: Some(None),
                    ..StatePatch::default()
                });
                Err(error)
            }
        }
    }

    /// Empty the scene and install the resulting snapshot.
    ///
    /// # Errors
    /// Transport or decode failure; selection is still reset.
    pub async fn clear(&mut self) -> Result<(), ApiError> {
        match self.authority.clear().await {
            Ok(points) => {
                self.store.set(StatePatch {
                    snapshot: Some(points),
                    selected_id: Some(None),
                    move_start: Some(None),
                    ..StatePatch::default()
                });
                Ok(())
            }
            Err(error) => {
                self.store.set(StatePatch {
                    selected_id: Some(None),
                    move_start: Some(None),
                    ..StatePatch::default()
                });
                Err(error)
            }
        }
    }

    // --- state machine ---

    async fn pointer_down(&mut self, x: i64, y: i64) {
        if self.gesture != Gesture::Idle {
            return;
        }
        // A pre-existing selection wins over a fresh pick, so a second drag
        // of the same shape doesn't need pixel-accurate aim.
        let id: ShapeId = match self.store.state().selected_id.clone() {
            Some(id) => id,
            None => match self.store.state().shapes.pick(x, y, self.pick_threshold) {
                Some(hit) => hit.id,
                None => {
                    tracing::debug!(x, y, "pointer down hit nothing; no session");
                    return;
                }
            },
        };

        let anchor = Pos::new(x, y);
        self.store.set(StatePatch {
            selected_id: Some(Some(id.clone())),
            move_start: Some(Some(anchor)),
            ..StatePatch::default()
        });

        if let Err(error) = self.authority.transform_begin().await {
            tracing::warn!(%error, "transform_begin failed; gesture continues unbatched");
        }
        self.gesture = Gesture::Active { id, anchor };
    }

    async fn pointer_move(&mut self, x: i64, y: i64) {
        let Gesture::Active { id, anchor } = &self.gesture else {
            return;
        };
        let (dx, dy) = (x - anchor.x, y - anchor.y);
        if dx == 0 && dy == 0 {
            return;
        }
        let id = id.clone();

        let reply = match self.authority.translate(&id, dx, dy).await {
            Ok(reply) => reply,
            Err(error) => {
                // Anchor stays put: the lost delta folds into the next move.
                tracing::warn!(%error, id, dx, dy, "translate failed; skipping tick");
                return;
            }
        };
        let Some(snapshot) = self.resolve_reply(reply).await else {
            return;
        };

        let anchor = Pos::new(x, y);
        self.store.set(StatePatch {
            snapshot: Some(snapshot),
            move_start: Some(Some(anchor)),
            ..StatePatch::default()
        });
        if let Gesture::Active { anchor: current, .. } = &mut self.gesture {
            *current = anchor;
        }
    }

    async fn wheel_tick(&mut self, direction: WheelDirection, modifiers: Modifiers) {
        // Pivot preference: explicit rotation center, else the drag anchor.
        // From idle the gesture has no anchor, so both a selection and a
        // center are required (rotate-about-point mode).
        let (id, pivot) = match &self.gesture {
            Gesture::Active { id, anchor } => {
                (id.clone(), self.store.state().rotate_center.unwrap_or(*anchor))
            }
            Gesture::Idle => {
                let state = self.store.state();
                match (state.selected_id.clone(), state.rotate_center) {
                    (Some(id), Some(center)) => (id, center),
                    _ => return,
                }
            }
        };

        let result = if modifiers.shift {
            let theta = match direction {
                WheelDirection::Up => ROTATE_STEP_RAD,
                WheelDirection::Down => -ROTATE_STEP_RAD,
            };
            self.authority.rotate(&id, theta, pivot).await
        } else {
            let factor = match direction {
                WheelDirection::Up => SCALE_STEP_UP,
                WheelDirection::Down => SCALE_STEP_DOWN,
            };
            self.authority.scale(&id, factor, factor, pivot).await
        };

        let reply = match result {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(%error, id, "wheel transform failed; skipping tick");
                return;
            }
        };
        if let Some(snapshot) = self.resolve_reply(reply).await {
            self.store.set(StatePatch { snapshot: Some(snapshot), ..StatePatch::default() });
        }
    }

    async fn pointer_up(&mut self) {
        if self.gesture == Gesture::Idle {
            return;
        }
        // End the batch exactly once per session, even when nothing moved
        // or every incremental call failed.
        if let Err(error) = self.authority.transform_end().await {
            tracing::warn!(%error, "transform_end failed");
        }
        self.gesture = Gesture::Idle;

        // Selection clears even when the refresh fails; a stuck highlight
        // is worse than one stale frame.
        match self.authority.get_points().await {
            Ok(points) => self.store.set(StatePatch {
                snapshot: Some(points),
                selected_id: Some(None),
                move_start: Some(None),
                ..StatePatch::default()
            }),
            Err(error) => {
                tracing::warn!(%error, "post-gesture refresh failed; geometry may be stale");
                self.store.set(StatePatch {
                    selected_id: Some(None),
                    move_start: Some(None),
                    ..StatePatch::default()
                });
            }
        }
    }

    fn deselect(&mut self) {
        // Mid-gesture escape is ignored: pointer-up owns session teardown,
        // and ending the batch here would double the transform_end.
        if self.gesture != Gesture::Idle {
            return;
        }
        self.store.set(StatePatch {
            selected_id: Some(None),
            rotate_center: Some(None),
            move_start: Some(None),
            ..StatePatch::default()
        });
    }

    /// Unwrap a mutation reply into the new snapshot, re-fetching when the
    /// authority only acknowledged. `None` means this tick is skipped.
    async fn resolve_reply(&self, reply: MutationReply) -> Option<Vec<Point>> {
        match reply {
            MutationReply::Points(points) => Some(points),
            MutationReply::Ack { ok } => {
                if !ok {
                    tracing::debug!("authority reported ok=false; re-fetching anyway");
                }
                match self.authority.get_points().await {
                    Ok(points) => Some(points),
                    Err(error) => {
                        tracing::warn!(%error, "snapshot re-fetch failed; skipping tick");
                        None
                    }
                }
            }
        }
    }
}
