//! Interactive client for a remote raster-drawing authority.
//!
//! The authority owns the true geometry: it rasterizes lines and curves,
//! computes flood fills, clips, transforms, and keeps the undo history. This
//! crate is the manipulation side of that contract. It holds the last point
//! set the authority returned, answers "which shape is near this pixel",
//! turns pointer gestures into batched transform calls, and composites the
//! sparse point stream back into a dense image.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`scene`] | Point and snapshot data model shared with the wire |
//! | [`store`] | Central state container with synchronous change listeners |
//! | [`picker`] | Shape index and nearest-shape queries |
//! | [`input`] | Input event types and gesture state |
//! | [`session`] | Drag/transform controller driving the remote authority |
//! | [`render`] | Scene compositing onto a [`render::Surface`] |
//! | [`api`] | HTTP client for the authority endpoints |
//! | [`consts`] | Shared numeric constants (pick tolerance, wheel steps, etc.) |

pub mod api;
pub mod consts;
pub mod input;
pub mod picker;
pub mod render;
pub mod scene;
pub mod session;
pub mod store;
