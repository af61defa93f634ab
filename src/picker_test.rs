use super::*;

use crate::scene::PointKind;

fn point(x: i64, y: i64, id: Option<&str>) -> Point {
    Point {
        x,
        y,
        color: "#ff0000".to_owned(),
        id: id.map(ToOwned::to_owned),
        w: None,
        kind: PointKind::Stroke,
    }
}

// =============================================================
// rebuild
// =============================================================

#[test]
fn rebuild_groups_points_by_id_in_snapshot_order() {
    let snapshot = vec![
        point(0, 0, Some("a")),
        point(5, 5, Some("b")),
        point(1, 0, Some("a")),
    ];
    let index = ShapeIndex::rebuild(&snapshot);
    assert_eq!(index.len(), 2);
    assert_eq!(index.groups()[0].id, "a");
    assert_eq!(index.groups()[1].id, "b");
    assert_eq!(index.points("a").map(<[Point]>::len), Some(2));
    assert_eq!(index.points("b").map(<[Point]>::len), Some(1));
}

#[test]
fn rebuild_skips_points_without_id() {
    let snapshot = vec![point(0, 0, None), point(1, 1, Some("a")), point(2, 2, None)];
    let index = ShapeIndex::rebuild(&snapshot);
    assert_eq!(index.len(), 1);
    assert_eq!(index.points("a").map(<[Point]>::len), Some(1));
}

#[test]
fn rebuild_is_idempotent() {
    let snapshot = vec![
        point(0, 0, Some("a")),
        point(1, 0, Some("b")),
        point(2, 0, Some("a")),
        point(3, 0, None),
    ];
    let first = ShapeIndex::rebuild(&snapshot);
    let second = ShapeIndex::rebuild(&snapshot);
    assert_eq!(first, second);
}

#[test]
fn rebuild_of_empty_snapshot_is_empty() {
    let index = ShapeIndex::rebuild(&[]);
    assert!(index.is_empty());
    assert_eq!(index.pick(0, 0, 100.0), None);
}

#[test]
fn group_points_preserve_snapshot_order() {
    let snapshot = vec![point(9, 0, Some("a")), point(3, 0, Some("a")), point(6, 0, Some("a"))];
    let index = ShapeIndex::rebuild(&snapshot);
    let xs: Vec<i64> = index.points("a").unwrap().iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![9, 3, 6]);
}

// =============================================================
// pick
// =============================================================

#[test]
fn pick_returns_nearest_shape_with_distance() {
    // The spec scenario: two points of s1 at (0,0) and (0,3), query (0,1).
    let snapshot = vec![point(0, 0, Some("s1")), point(0, 3, Some("s1"))];
    let index = ShapeIndex::rebuild(&snapshot);
    let hit = index.pick(0, 1, 12.0).unwrap();
    assert_eq!(hit.id, "s1");
    assert!((hit.dist - 1.0).abs() < f64::EPSILON);
}

#[test]
fn pick_misses_when_everything_is_beyond_threshold() {
    let snapshot = vec![point(100, 100, Some("far"))];
    let index = ShapeIndex::rebuild(&snapshot);
    assert_eq!(index.pick(0, 0, 12.0), None);
}

#[test]
fn pick_hit_exactly_at_threshold_distance() {
    let snapshot = vec![point(0, 12, Some("edge"))];
    let index = ShapeIndex::rebuild(&snapshot);
    let hit = index.pick(0, 0, 12.0).unwrap();
    assert_eq!(hit.id, "edge");
    assert!((hit.dist - 12.0).abs() < f64::EPSILON);
}

#[test]
fn pick_prefers_closer_shape() {
    let snapshot = vec![point(0, 10, Some("far")), point(0, 2, Some("near"))];
    let index = ShapeIndex::rebuild(&snapshot);
    assert_eq!(index.pick(0, 0, 12.0).unwrap().id, "near");
}

#[test]
fn pick_tie_break_goes_to_earlier_snapshot_shape() {
    // Both shapes are exactly 5 away from the query point.
    let snapshot = vec![point(0, 5, Some("first")), point(5, 0, Some("second"))];
    let index = ShapeIndex::rebuild(&snapshot);
    assert_eq!(index.pick(0, 0, 12.0).unwrap().id, "first");

    let reversed = vec![point(5, 0, Some("second")), point(0, 5, Some("first"))];
    let index = ShapeIndex::rebuild(&reversed);
    assert_eq!(index.pick(0, 0, 12.0).unwrap().id, "second");
}

#[test]
fn pick_exact_overlap_returns_zero_distance() {
    let snapshot = vec![point(7, 7, Some("s1"))];
    let index = ShapeIndex::rebuild(&snapshot);
    let hit = index.pick(7, 7, 12.0).unwrap();
    assert_eq!(hit.dist, 0.0);
}

#[test]
fn pick_earlier_zero_not_displaced_by_later_zero() {
    let snapshot = vec![point(4, 4, Some("a")), point(4, 4, Some("b"))];
    let index = ShapeIndex::rebuild(&snapshot);
    assert_eq!(index.pick(4, 4, 12.0).unwrap().id, "a");
}

#[test]
fn pick_ignores_preview_points() {
    // The id-less point sits right on the query; only "a" is pickable.
    let snapshot = vec![point(0, 0, None), point(0, 4, Some("a"))];
    let index = ShapeIndex::rebuild(&snapshot);
    let hit = index.pick(0, 0, 12.0).unwrap();
    assert_eq!(hit.id, "a");
    assert!((hit.dist - 4.0).abs() < f64::EPSILON);
}
