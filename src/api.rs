//! HTTP client for the remote scene authority.
//!
//! Every mutating endpoint either returns the new full point set directly or
//! an `{ok}` acknowledgment that obliges the caller to re-fetch; the
//! [`MutationReply`] decode covers both. The [`Authority`] trait is the seam
//! the controller is written against, so gesture tests run against an
//! in-memory fake instead of a server.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::Deserialize;
use serde_json::Value;

use crate::scene::{self, Point, Pos};

/// Failure modes when talking to the authority.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authority returned HTTP {status} for {endpoint}")]
    Status { endpoint: &'static str, status: u16 },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Reply to `translate` / `rotate` / `scale`.
///
/// Authorities differ: translate returns the re-rastered point set, rotate
/// and scale return a bare acknowledgment. Decoded untagged; an ack means
/// the caller must follow up with a points fetch.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MutationReply {
    /// The full new scene snapshot.
    Points(Vec<Point>),
    /// Acknowledgment only; the snapshot must be re-fetched.
    Ack {
        /// Whether the authority applied the mutation.
        ok: bool,
    },
}

/// The remote scene authority, as consumed by the controller.
///
/// All calls are request/response over the single event loop; implementors
/// need no internal synchronization.
#[allow(async_fn_in_trait)]
pub trait Authority {
    /// Fetch the full current scene snapshot.
    ///
    /// # Errors
    /// Transport or decode failure.
    async fn get_points(&self) -> Result<Vec<Point>, ApiError>;

    /// Incrementally move one shape by `(dx, dy)`.
    ///
    /// # Errors
    /// Transport or decode failure.
    async fn translate(&self, id: &str, dx: i64, dy: i64) -> Result<MutationReply, ApiError>;

    /// Rotate one shape by `theta` radians about `pivot`.
    ///
    /// # Errors
    /// Transport or decode failure.
    async fn rotate(&self, id: &str, theta: f64, pivot: Pos) -> Result<MutationReply, ApiError>;

    /// Scale one shape by `(sx, sy)` about `pivot`.
    ///
    /// # Errors
    /// Transport or decode failure.
    async fn scale(&self, id: &str, sx: f64, sy: f64, pivot: Pos) -> Result<MutationReply, ApiError>;

    /// Open an undo batch: mutations until `transform_end` fold into one
    /// undo step.
    ///
    /// # Errors
    /// Transport failure.
    async fn transform_begin(&self) -> Result<(), ApiError>;

    /// Close the current undo batch.
    ///
    /// # Errors
    /// Transport failure.
    async fn transform_end(&self) -> Result<(), ApiError>;

    /// Revert the last committed batch or shape; returns the new snapshot.
    ///
    /// # Errors
    /// Transport or decode failure.
    async fn undo(&self) -> Result<Vec<Point>, ApiError>;

    /// Empty the scene; returns the (empty) snapshot.
    ///
    /// # Errors
    /// Transport or decode failure.
    async fn clear(&self) -> Result<Vec<Point>, ApiError>;
}

/// Reply to a flood-fill request.
#[derive(Debug, Clone)]
pub struct FillReply {
    /// The full new scene snapshot.
    pub points: Vec<Point>,
    /// Id of the newly created fill region, when the authority reports one.
    pub fill_id: Option<String>,
}

/// [`Authority`] over HTTP, plus the shape-creation endpoints the drawing
/// tools post to.
pub struct HttpAuthority {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthority {
    /// Build a client for an authority rooted at `base_url` (the `/api/v1`
    /// prefix is appended per request).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client: reqwest::Client::new(), base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    async fn get_value(&self, endpoint: &'static str) -> Result<Value, ApiError> {
        let response = self.client.get(self.url(endpoint)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { endpoint, status: status.as_u16() });
        }
        Ok(response.json::<Value>().await?)
    }

    async fn post_value(&self, endpoint: &'static str, body: Value) -> Result<Value, ApiError> {
        let response = self.client.post(self.url(endpoint)).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { endpoint, status: status.as_u16() });
        }
        Ok(response.json::<Value>().await?)
    }

    /// POST with an empty JSON body, checking only the status. Batch
    /// markers reply with nothing useful, sometimes with no body at all.
    async fn post_unit(&self, endpoint: &'static str) -> Result<(), ApiError> {
        let body = Value::Object(serde_json::Map::new());
        let response = self.client.post(self.url(endpoint)).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { endpoint, status: status.as_u16() });
        }
        Ok(())
    }

    /// Wire body for the point-list creation endpoints (bezier, b-spline,
    /// polygon). `degree` is only meaningful for b-splines.
    fn curve_body(control: &[Pos], color: &str, width: u32, degree: Option<u32>) -> Value {
        let mut body = serde_json::json!({ "points": control, "color": color, "width": width });
        if let (Some(degree), Some(map)) = (degree, body.as_object_mut()) {
            map.insert("degree".to_owned(), degree.into());
        }
        body
    }

    /// Wire body for the three-point creation endpoints (circle, arc).
    fn three_point_body(a: Pos, b: Pos, c: Pos, color: &str, width: u32) -> Value {
        serde_json::json!({
            "x1": a.x, "y1": a.y, "x2": b.x, "y2": b.y, "x3": c.x, "y3": c.y,
            "color": color, "width": width,
        })
    }

    fn decode_points(value: Value) -> Result<Vec<Point>, ApiError> {
        let mut points = serde_json::from_value::<Vec<Point>>(value)?;
        scene::normalize_kinds(&mut points);
        Ok(points)
    }

    fn decode_reply(value: Value) -> Result<MutationReply, ApiError> {
        let reply = serde_json::from_value::<MutationReply>(value)?;
        Ok(match reply {
            MutationReply::Points(mut points) => {
                scene::normalize_kinds(&mut points);
                MutationReply::Points(points)
            }
            ack @ MutationReply::Ack { .. } => ack,
        })
    }

    // --- shape creation (posted by the drawing tools / CLI) ---

    /// Create a line between two endpoints; returns the new snapshot.
    ///
    /// # Errors
    /// Transport or decode failure.
    pub async fn add_line(&self, a: Pos, b: Pos, color: &str, width: u32) -> Result<Vec<Point>, ApiError> {
        let body = serde_json::json!({
            "x1": a.x, "y1": a.y, "x2": b.x, "y2": b.y,
            "color": color, "width": width,
        });
        Self::decode_points(self.post_value("/lines", body).await?)
    }

    /// Create an axis-aligned rectangle from two corners; returns the new
    /// snapshot.
    ///
    /// # Errors
    /// Transport or decode failure.
    pub async fn add_rect(&self, a: Pos, b: Pos, color: &str, width: u32) -> Result<Vec<Point>, ApiError> {
        let body = serde_json::json!({
            "x1": a.x, "y1": a.y, "x2": b.x, "y2": b.y,
            "color": color, "width": width,
        });
        Self::decode_points(self.post_value("/rectangles", body).await?)
    }

    /// Create the circle through three points; returns the new snapshot.
    ///
    /// # Errors
    /// Transport or decode failure.
    pub async fn add_circle(&self, a: Pos, b: Pos, c: Pos, color: &str, width: u32) -> Result<Vec<Point>, ApiError> {
        let body = Self::three_point_body(a, b, c, color, width);
        Self::decode_points(self.post_value("/circles", body).await?)
    }

    /// Create the circular arc through three points (endpoints plus one
    /// point on the arc); returns the new snapshot.
    ///
    /// # Errors
    /// Transport or decode failure.
    pub async fn add_arc(&self, a: Pos, b: Pos, c: Pos, color: &str, width: u32) -> Result<Vec<Point>, ApiError> {
        let body = Self::three_point_body(a, b, c, color, width);
        Self::decode_points(self.post_value("/arc", body).await?)
    }

    /// Create a Bézier curve from its control points, in order; returns the
    /// new snapshot.
    ///
    /// # Errors
    /// Transport or decode failure.
    pub async fn add_bezier(&self, control: &[Pos], color: &str, width: u32) -> Result<Vec<Point>, ApiError> {
        let body = Self::curve_body(control, color, width, None);
        Self::decode_points(self.post_value("/bezier", body).await?)
    }

    /// Create a B-spline of the given degree from its control points;
    /// returns the new snapshot.
    ///
    /// # Errors
    /// Transport or decode failure.
    pub async fn add_bspline(
        &self,
        control: &[Pos],
        degree: u32,
        color: &str,
        width: u32,
    ) -> Result<Vec<Point>, ApiError> {
        let body = Self::curve_body(control, color, width, Some(degree));
        Self::decode_points(self.post_value("/bspline", body).await?)
    }

    /// Create a closed polygon from its vertices, in order; returns the new
    /// snapshot.
    ///
    /// # Errors
    /// Transport or decode failure.
    pub async fn add_polygon(&self, vertices: &[Pos], color: &str, width: u32) -> Result<Vec<Point>, ApiError> {
        let body = Self::curve_body(vertices, color, width, None);
        Self::decode_points(self.post_value("/polygons", body).await?)
    }

    /// Clip one shape to the axis-aligned rectangle spanned by two corners.
    ///
    /// Replies vary like the transform endpoints: either the re-rastered
    /// point set or a bare ack obliging a points re-fetch.
    ///
    /// # Errors
    /// Transport or decode failure.
    pub async fn clip_rect(&self, id: &str, a: Pos, b: Pos) -> Result<MutationReply, ApiError> {
        let body = serde_json::json!({ "id": id, "x1": a.x, "y1": a.y, "x2": b.x, "y2": b.y });
        Self::decode_reply(self.post_value("/clip_rect", body).await?)
    }

    /// Fetch the authority's structured scene dump: per-shape geometry
    /// definitions plus accumulated transform matrices. A debug surface,
    /// passed through undecoded.
    ///
    /// # Errors
    /// Transport or decode failure.
    pub async fn scene_state(&self) -> Result<Value, ApiError> {
        self.get_value("/scene").await
    }

    /// Flood-fill from a seed point within a `width` × `height` canvas.
    ///
    /// Newer authorities return `{points, fill_id, pixels}`; older ones
    /// return the bare point array. Both decode to a [`FillReply`].
    ///
    /// # Errors
    /// Transport or decode failure.
    pub async fn fill(
        &self,
        seed: Pos,
        color: &str,
        connectivity: u8,
        width: u32,
        height: u32,
    ) -> Result<FillReply, ApiError> {
        let body = serde_json::json!({
            "x": seed.x, "y": seed.y, "color": color,
            "connectivity": connectivity, "tol": 0,
            "w": width, "h": height,
        });
        let value = self.post_value("/fill", body).await?;
        if value.is_array() {
            return Ok(FillReply { points: Self::decode_points(value)?, fill_id: None });
        }
        let fill_id = value
            .get("fill_id")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned);
        let points = value.get("points").cloned().unwrap_or(Value::Array(Vec::new()));
        Ok(FillReply { points: Self::decode_points(points)?, fill_id })
    }
}

impl Authority for HttpAuthority {
    async fn get_points(&self) -> Result<Vec<Point>, ApiError> {
        Self::decode_points(self.get_value("/points").await?)
    }

    async fn translate(&self, id: &str, dx: i64, dy: i64) -> Result<MutationReply, ApiError> {
        let body = serde_json::json!({ "id": id, "dx": dx, "dy": dy });
        Self::decode_reply(self.post_value("/translate", body).await?)
    }

    async fn rotate(&self, id: &str, theta: f64, pivot: Pos) -> Result<MutationReply, ApiError> {
        let body = serde_json::json!({ "id": id, "theta": theta, "cx": pivot.x, "cy": pivot.y });
        Self::decode_reply(self.post_value("/rotate", body).await?)
    }

    async fn scale(&self, id: &str, sx: f64, sy: f64, pivot: Pos) -> Result<MutationReply, ApiError> {
        let body = serde_json::json!({ "id": id, "sx": sx, "sy": sy, "cx": pivot.x, "cy": pivot.y });
        Self::decode_reply(self.post_value("/scale", body).await?)
    }

    async fn transform_begin(&self) -> Result<(), ApiError> {
        self.post_unit("/transform_begin").await
    }

    async fn transform_end(&self) -> Result<(), ApiError> {
        self.post_unit("/transform_end").await
    }

    async fn undo(&self) -> Result<Vec<Point>, ApiError> {
        Self::decode_points(self.post_value("/undo", Value::Object(serde_json::Map::new())).await?)
    }

    async fn clear(&self) -> Result<Vec<Point>, ApiError> {
        Self::decode_points(self.post_value("/clear", Value::Object(serde_json::Map::new())).await?)
    }
}
