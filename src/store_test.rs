use super::*;

use std::cell::RefCell;
use std::rc::Rc;

use crate::scene::{Point, PointKind};

fn point(x: i64, y: i64, id: &str) -> Point {
    Point {
        x,
        y,
        color: "#ff0000".to_owned(),
        id: Some(id.to_owned()),
        w: None,
        kind: PointKind::Stroke,
    }
}

// =============================================================
// State defaults
// =============================================================

#[test]
fn new_state_uses_default_pixel_size() {
    let state = State::new();
    assert_eq!(state.pixel_size, crate::consts::DEFAULT_PIXEL_SIZE);
    assert!(state.snapshot.is_empty());
    assert!(state.shapes.is_empty());
    assert_eq!(state.selected_id, None);
}

// =============================================================
// set
// =============================================================

#[test]
fn set_applies_only_present_fields() {
    let mut store = Store::new();
    store.set(StatePatch { selected_id: Some(Some("s1".to_owned())), ..StatePatch::default() });
    store.set(StatePatch { pixel_size: Some(4), ..StatePatch::default() });
    // The second patch left the selection alone.
    assert_eq!(store.state().selected_id.as_deref(), Some("s1"));
    assert_eq!(store.state().pixel_size, 4);
}

#[test]
fn set_clears_doubly_optional_fields() {
    let mut store = Store::new();
    store.set(StatePatch {
        selected_id: Some(Some("s1".to_owned())),
        move_start: Some(Some(crate::scene::Pos::new(3, 4))),
        ..StatePatch::default()
    });
    store.set(StatePatch {
        selected_id: Some(None),
        move_start: Some(None),
        ..StatePatch::default()
    });
    assert_eq!(store.state().selected_id, None);
    assert_eq!(store.state().move_start, None);
}

#[test]
fn installing_snapshot_rebuilds_index_before_notifying() {
    let mut store = Store::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    store.subscribe(move |state| {
        // The index must already match the snapshot when subscribers run.
        sink.borrow_mut().push((state.snapshot.len(), state.shapes.len()));
    });

    store.set(StatePatch {
        snapshot: Some(vec![point(0, 0, "a"), point(1, 1, "b")]),
        ..StatePatch::default()
    });
    assert_eq!(seen.borrow().as_slice(), &[(2, 2)]);
}

#[test]
fn multi_field_patch_is_observed_atomically() {
    let mut store = Store::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    store.subscribe(move |state| {
        sink.borrow_mut().push((state.snapshot.len(), state.selected_id.clone()));
    });

    store.set(StatePatch {
        snapshot: Some(vec![point(0, 0, "a")]),
        selected_id: Some(Some("a".to_owned())),
        ..StatePatch::default()
    });
    // One notification carrying both changes, never an intermediate state.
    assert_eq!(seen.borrow().as_slice(), &[(1, Some("a".to_owned()))]);
}

#[test]
fn every_set_notifies_even_with_empty_patch() {
    let mut store = Store::new();
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    store.subscribe(move |_| *sink.borrow_mut() += 1);

    store.set(StatePatch::default());
    store.set(StatePatch::default());
    assert_eq!(*count.borrow(), 2);
}

// =============================================================
// subscribe / unsubscribe
// =============================================================

#[test]
fn all_subscribers_run_before_set_returns() {
    let mut store = Store::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    for tag in ["one", "two", "three"] {
        let sink = Rc::clone(&order);
        store.subscribe(move |_| sink.borrow_mut().push(tag));
    }
    store.set(StatePatch::default());
    assert_eq!(order.borrow().len(), 3);
}

#[test]
fn unsubscribe_stops_notifications() {
    let mut store = Store::new();
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    let token = store.subscribe(move |_| *sink.borrow_mut() += 1);

    store.set(StatePatch::default());
    assert!(store.unsubscribe(token));
    store.set(StatePatch::default());
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn unsubscribe_unknown_token_returns_false() {
    let mut store = Store::new();
    assert!(!store.unsubscribe(42));
}

#[test]
fn tokens_are_not_reused_after_unsubscribe() {
    let mut store = Store::new();
    let first = store.subscribe(|_| {});
    assert!(store.unsubscribe(first));
    let second = store.subscribe(|_| {});
    assert_ne!(first, second);
}
