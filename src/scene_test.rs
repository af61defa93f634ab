use super::*;

fn point(x: i64, y: i64, id: Option<&str>) -> Point {
    Point {
        x,
        y,
        color: "#123456".to_owned(),
        id: id.map(ToOwned::to_owned),
        w: None,
        kind: PointKind::default(),
    }
}

// =============================================================
// Point
// =============================================================

#[test]
fn size_uses_default_when_width_absent() {
    let p = point(1, 2, Some("s1"));
    assert_eq!(p.size(2), 2);
    assert_eq!(p.size(5), 5);
}

#[test]
fn size_prefers_per_point_width() {
    let p = Point { w: Some(7), ..point(1, 2, Some("s1")) };
    assert_eq!(p.size(2), 7);
}

#[test]
fn kind_defaults_to_stroke() {
    assert_eq!(PointKind::default(), PointKind::Stroke);
}

#[test]
fn deserializes_minimal_wire_record() {
    let p: Point = serde_json::from_str(r#"{"x":3,"y":4}"#).unwrap();
    assert_eq!(p.x, 3);
    assert_eq!(p.y, 4);
    assert_eq!(p.color, "#ff0000");
    assert_eq!(p.id, None);
    assert_eq!(p.w, None);
    assert_eq!(p.kind, PointKind::Stroke);
}

#[test]
fn deserializes_full_wire_record() {
    let p: Point = serde_json::from_str(
        r##"{"x":1,"y":2,"color":"#00ff00","id":"s9","w":3,"kind":"fill"}"##,
    )
    .unwrap();
    assert_eq!(p.id.as_deref(), Some("s9"));
    assert_eq!(p.w, Some(3));
    assert_eq!(p.kind, PointKind::Fill);
}

// =============================================================
// normalize_kinds
// =============================================================

#[test]
fn normalize_upgrades_fill_prefixed_ids() {
    let mut points = vec![point(0, 0, Some("fill-3")), point(1, 0, Some("line-1"))];
    normalize_kinds(&mut points);
    assert_eq!(points[0].kind, PointKind::Fill);
    assert_eq!(points[1].kind, PointKind::Stroke);
}

#[test]
fn normalize_leaves_explicit_kinds_alone() {
    let mut points = vec![Point { kind: PointKind::Fill, ..point(0, 0, Some("region-1")) }];
    normalize_kinds(&mut points);
    assert_eq!(points[0].kind, PointKind::Fill);
}

#[test]
fn normalize_skips_idless_points() {
    let mut points = vec![point(0, 0, None)];
    normalize_kinds(&mut points);
    assert_eq!(points[0].kind, PointKind::Stroke);
}

#[test]
fn normalize_is_idempotent() {
    let mut points = vec![point(0, 0, Some("fill-1")), point(1, 1, Some("s1"))];
    normalize_kinds(&mut points);
    let once = points.clone();
    normalize_kinds(&mut points);
    assert_eq!(points, once);
}
