//! Shared numeric and visual constants.

/// Default pick tolerance in pixels: a pointer-down within this distance of
/// any point of a shape counts as a hit on that shape.
pub const PICK_THRESHOLD_PX: f64 = 12.0;

/// Multiplicative scale step per wheel tick scrolling up (grow).
pub const SCALE_STEP_UP: f64 = 1.1;

/// Multiplicative scale step per wheel tick scrolling down (shrink).
pub const SCALE_STEP_DOWN: f64 = 0.9;

/// Rotation step in radians per wheel tick while the rotate modifier is held.
pub const ROTATE_STEP_RAD: f64 = 0.1;

/// Side length in pixels of a rendered point square when the point carries
/// no per-point width.
pub const DEFAULT_PIXEL_SIZE: u32 = 2;

/// Stroke color applied when the authority omits one.
pub const DEFAULT_COLOR: &str = "#ff0000";

/// Translucent halo drawn under each point of the selected shape.
pub const HIGHLIGHT_GLOW_COLOR: &str = "rgba(33,150,243,0.3)";

/// Extra side length added to a point square for its selection halo.
pub const HIGHLIGHT_GLOW_PAD: u32 = 3;

/// Marker color for an explicitly placed rotation center.
pub const ROTATE_MARKER_COLOR: &str = "#00ff00";
