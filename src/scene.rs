//! Scene data model: the point records the authority returns and the
//! snapshot they form.
//!
//! Points are produced exclusively by the remote authority; the client never
//! invents coordinates for committed geometry. A snapshot is replaced
//! wholesale on every successful response — it is never patched in place,
//! because server-side clipping, transforms, and fills can change geometry
//! the client cannot recompute.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_COLOR;

/// Opaque, authority-assigned identifier grouping points into one shape.
///
/// Stable across mutations of the same shape. Points without an id are
/// ephemeral previews and take no part in picking or highlighting.
pub type ShapeId = String;

/// Legacy wire convention: flood-fill output carries ids with this prefix.
/// Translated into [`PointKind::Fill`] at the API boundary; nothing past
/// that boundary looks at the prefix.
pub const FILL_ID_PREFIX: &str = "fill-";

/// An integer pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pos {
    pub x: i64,
    pub y: i64,
}

impl Pos {
    #[must_use]
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Whether a point is ordinary stroke output or part of a flood-fill region.
///
/// Fill points are compacted into row runs by the compositor instead of
/// being drawn one square at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    /// Drawn individually as a filled square.
    #[default]
    Stroke,
    /// Part of a flood-fill region; merged into horizontal runs when drawn.
    Fill,
}

/// One rendered point as returned by the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// Pixel column.
    pub x: i64,
    /// Pixel row.
    pub y: i64,
    /// Fill style, an arbitrary color string usable directly by a surface.
    #[serde(default = "default_color")]
    pub color: String,
    /// Owning shape, if any. `None` marks an ephemeral preview point.
    #[serde(default)]
    pub id: Option<ShapeId>,
    /// Per-point square side in pixels; `None` means the global default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<u32>,
    /// Stroke/fill classification. Older authorities omit this field and
    /// signal fill output through the id prefix instead; see
    /// [`normalize_kinds`].
    #[serde(default)]
    pub kind: PointKind,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_owned()
}

impl Point {
    /// Rendered square side for this point given the scene default.
    #[must_use]
    pub fn size(&self, default: u32) -> u32 {
        self.w.unwrap_or(default)
    }
}

/// Upgrade legacy fill markers to the explicit kind tag.
///
/// A point whose id starts with [`FILL_ID_PREFIX`] is fill output even when
/// the wire record predates the `kind` field. Runs once per decoded
/// response, in the API layer; idempotent.
pub fn normalize_kinds(points: &mut [Point]) {
    for point in points {
        if point.kind == PointKind::Stroke
            && point.id.as_deref().is_some_and(|id| id.starts_with(FILL_ID_PREFIX))
        {
            point.kind = PointKind::Fill;
        }
    }
}
