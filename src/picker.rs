//! Spatial picking: maps a pixel coordinate to the shape nearest it.
//!
//! The index is a flat grouping of the current snapshot's points by shape
//! id. Shapes are small point clouds, so queries are linear scans — no
//! acceleration structure. The index is rebuilt from scratch whenever the
//! snapshot changes (see [`crate::store::Store::set`]); it is never queried
//! against a stale snapshot.

#[cfg(test)]
#[path = "picker_test.rs"]
mod picker_test;

use std::collections::HashMap;

use crate::scene::{Point, ShapeId};

/// The points of one shape, in snapshot order.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeGroup {
    /// Owning shape id.
    pub id: ShapeId,
    /// Every snapshot point carrying that id, in snapshot order.
    pub points: Vec<Point>,
}

/// Result of a successful pick.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// The nearest shape.
    pub id: ShapeId,
    /// Euclidean distance from the query point to that shape's closest point.
    pub dist: f64,
}

/// Shape id → ordered point list, derived from one snapshot.
///
/// Groups appear in order of each id's first occurrence in the snapshot.
/// That order is what makes pick tie-breaks deterministic: of two
/// equidistant shapes, the one whose first point appears earlier wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeIndex {
    groups: Vec<ShapeGroup>,
    by_id: HashMap<ShapeId, usize>,
}

impl ShapeIndex {
    /// Group `snapshot` points by shape id, skipping id-less preview points.
    ///
    /// Deterministic and idempotent: two rebuilds from the same snapshot
    /// yield identical indexes.
    #[must_use]
    pub fn rebuild(snapshot: &[Point]) -> Self {
        let mut groups: Vec<ShapeGroup> = Vec::new();
        let mut by_id: HashMap<ShapeId, usize> = HashMap::new();
        for point in snapshot {
            let Some(id) = &point.id else {
                continue;
            };
            let slot = match by_id.get(id) {
                Some(slot) => *slot,
                None => {
                    by_id.insert(id.clone(), groups.len());
                    groups.push(ShapeGroup { id: id.clone(), points: Vec::new() });
                    groups.len() - 1
                }
            };
            groups[slot].points.push(point.clone());
        }
        Self { groups, by_id }
    }

    /// The points of one shape, if the shape exists in this index.
    #[must_use]
    pub fn points(&self, id: &str) -> Option<&[Point]> {
        self.by_id.get(id).map(|slot| self.groups[*slot].points.as_slice())
    }

    /// All shape groups in first-appearance order.
    #[must_use]
    pub fn groups(&self) -> &[ShapeGroup] {
        &self.groups
    }

    /// Number of distinct shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` when the index holds no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The shape nearest `(x, y)`, if its closest point is within
    /// `threshold` pixels.
    ///
    /// Scans every shape; the winner is the globally minimal distance, with
    /// ties going to the earlier group. A shape's inner scan stops at the
    /// first exact overlap (distance zero), but later shapes are still
    /// examined — a later shape cannot beat zero, yet an earlier zero must
    /// not be displaced by it either, so only strict improvements move the
    /// winner. Absence of a hit is a normal result, not an error.
    #[must_use]
    pub fn pick(&self, x: i64, y: i64, threshold: f64) -> Option<Hit> {
        let mut winner: Option<(usize, f64)> = None;
        for (slot, group) in self.groups.iter().enumerate() {
            let dist = min_dist_to_points(&group.points, x, y);
            if winner.is_none_or(|(_, best)| dist < best) {
                winner = Some((slot, dist));
            }
        }
        let (slot, dist) = winner?;
        if dist <= threshold {
            Some(Hit { id: self.groups[slot].id.clone(), dist })
        } else {
            None
        }
    }
}

/// Minimum Euclidean distance from `(x, y)` to any point in the cloud.
///
/// Returns `f64::INFINITY` for an empty cloud. Short-circuits on exact
/// overlap.
fn min_dist_to_points(points: &[Point], x: i64, y: i64) -> f64 {
    let mut best = f64::INFINITY;
    for point in points {
        let dx = (point.x - x) as f64;
        let dy = (point.y - y) as f64;
        let dist = dx.hypot(dy);
        if dist < best {
            best = dist;
        }
        if best == 0.0 {
            break;
        }
    }
    best
}
