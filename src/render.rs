//! Scene compositing: turns the current snapshot into draw calls.
//!
//! [`paint`] is a pure function of (snapshot, selection state) onto a
//! [`Surface`]; it performs no network calls and accumulates nothing, so it
//! is safe to run on every store change. Ordinary points become individual
//! squares. Fill-region points are compacted first: grouped by row and
//! color, deduplicated, sorted, and merged into maximal runs of consecutive
//! x coordinates — one draw call per run instead of one per pixel, which is
//! the difference between O(1) and O(W) draw calls for a W-wide filled row.
//!
//! [`Pixmap`] is the software surface behind the CLI's snapshot export.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::consts::{HIGHLIGHT_GLOW_COLOR, HIGHLIGHT_GLOW_PAD, ROTATE_MARKER_COLOR};
use crate::scene::PointKind;
use crate::store::State;

/// Something pixels can be drawn onto.
pub trait Surface {
    /// Reset the surface to its background.
    fn clear(&mut self);
    /// Fill an axis-aligned rectangle. Coordinates may fall outside the
    /// surface; implementations clip.
    fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: &str);
}

/// Composite the full scene: base image, selection highlight, rotation
/// marker.
pub fn paint(surface: &mut dyn Surface, state: &State) {
    surface.clear();

    // Base image. Fill rows keyed (row, color); BTreeMap so emission order
    // is deterministic.
    let mut rows: BTreeMap<(i64, &str), Vec<i64>> = BTreeMap::new();
    for point in &state.snapshot {
        match point.kind {
            PointKind::Stroke => {
                let size = point.size(state.pixel_size);
                surface.fill_rect(point.x, point.y, size, size, &point.color);
            }
            PointKind::Fill => {
                rows.entry((point.y, point.color.as_str())).or_default().push(point.x);
            }
        }
    }
    for ((y, color), xs) in &rows {
        for (start, end) in merge_runs(xs) {
            let width = u32::try_from(end - start + 1).unwrap_or(u32::MAX);
            surface.fill_rect(start, *y, width, 1, color);
        }
    }

    // Highlight: one translucent glow pass under the shape, then the shape
    // repainted in its own colors so the glow never occludes them.
    if let Some(id) = &state.selected_id {
        if let Some(points) = state.shapes.points(id) {
            for point in points {
                let glow = point.size(state.pixel_size) + HIGHLIGHT_GLOW_PAD;
                surface.fill_rect(point.x - 1, point.y - 1, glow, glow, HIGHLIGHT_GLOW_COLOR);
            }
            for point in points {
                let size = point.size(state.pixel_size);
                surface.fill_rect(point.x, point.y, size, size, &point.color);
            }
        }
    }

    if let Some(center) = state.rotate_center {
        let size = state.pixel_size + 1;
        surface.fill_rect(center.x, center.y, size, size, ROTATE_MARKER_COLOR);
    }
}

/// Merge x coordinates into maximal runs of consecutive integers.
///
/// Input order and duplicates don't matter; output runs are `(start, end)`
/// inclusive, ascending. `{5,6,7,10,11}` merges to `[(5,7), (10,11)]`.
#[must_use]
pub fn merge_runs(xs: &[i64]) -> Vec<(i64, i64)> {
    let mut xs = xs.to_vec();
    xs.sort_unstable();
    xs.dedup();

    let mut runs = Vec::new();
    let mut iter = xs.into_iter();
    let Some(first) = iter.next() else {
        return runs;
    };
    let mut start = first;
    let mut prev = first;
    for x in iter {
        if x != prev + 1 {
            runs.push((start, prev));
            start = x;
        }
        prev = x;
    }
    runs.push((start, prev));
    runs
}

/// An RGB color with an alpha fraction, parsed from a CSS-style string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: [u8; 3],
    pub alpha: f32,
}

/// Parse `#rgb`, `#rrggbb`, `rgb(r,g,b)`, or `rgba(r,g,b,a)`.
///
/// Anything else (including named colors) is `None`; the pixmap skips draws
/// it cannot parse rather than guessing.
#[must_use]
pub fn parse_color(color: &str) -> Option<Rgba> {
    let color = color.trim();
    if let Some(hex) = color.strip_prefix('#') {
        let rgb = match hex.len() {
            3 => {
                let mut rgb = [0_u8; 3];
                for (slot, ch) in rgb.iter_mut().zip(hex.chars()) {
                    let nibble = ch.to_digit(16)?;
                    *slot = (nibble * 17) as u8;
                }
                rgb
            }
            6 => {
                let mut rgb = [0_u8; 3];
                for (slot, part) in rgb.iter_mut().zip([0, 2, 4]) {
                    let Ok(byte) = u8::from_str_radix(&hex[part..part + 2], 16) else {
                        return None;
                    };
                    *slot = byte;
                }
                rgb
            }
            _ => return None,
        };
        return Some(Rgba { rgb, alpha: 1.0 });
    }
    if let Some(args) = strip_call(color, "rgba") {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return None;
        }
        let rgb = parse_channels(&parts[..3])?;
        let Ok(alpha) = parts[3].parse::<f32>() else {
            return None;
        };
        return Some(Rgba { rgb, alpha: alpha.clamp(0.0, 1.0) });
    }
    if let Some(args) = strip_call(color, "rgb") {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return None;
        }
        return Some(Rgba { rgb: parse_channels(&parts)?, alpha: 1.0 });
    }
    None
}

fn strip_call<'a>(value: &'a str, name: &str) -> Option<&'a str> {
    value.strip_prefix(name)?.strip_prefix('(')?.strip_suffix(')')
}

fn parse_channels(parts: &[&str]) -> Option<[u8; 3]> {
    let mut rgb = [0_u8; 3];
    for (slot, part) in rgb.iter_mut().zip(parts) {
        let Ok(channel) = part.parse::<u8>() else {
            return None;
        };
        *slot = channel;
    }
    Some(rgb)
}

/// A software RGB surface with alpha blending and binary PPM export.
pub struct Pixmap {
    width: u32,
    height: u32,
    background: [u8; 3],
    pixels: Vec<[u8; 3]>,
}

impl Pixmap {
    /// A white-backed pixmap of the given dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let background = [255, 255, 255];
        let pixels = vec![background; (width as usize) * (height as usize)];
        Self { width, height, background, pixels }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The pixel at `(x, y)`, or `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y as usize) * (self.width as usize) + (x as usize)])
    }

    /// Write the image as binary PPM (P6).
    ///
    /// # Errors
    /// Propagates writer failures.
    pub fn write_ppm(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "P6\n{} {}\n255", self.width, self.height)?;
        for pixel in &self.pixels {
            out.write_all(pixel)?;
        }
        Ok(())
    }
}

impl Surface for Pixmap {
    fn clear(&mut self) {
        self.pixels.fill(self.background);
    }

    fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: &str) {
        let Some(Rgba { rgb, alpha }) = parse_color(color) else {
            tracing::debug!(color, "unparseable color; rect skipped");
            return;
        };
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + i64::from(w)).min(i64::from(self.width));
        let y1 = (y + i64::from(h)).min(i64::from(self.height));
        for row in y0..y1 {
            for col in x0..x1 {
                let index = (row as usize) * (self.width as usize) + (col as usize);
                self.pixels[index] = blend(self.pixels[index], rgb, alpha);
            }
        }
    }
}

fn blend(under: [u8; 3], over: [u8; 3], alpha: f32) -> [u8; 3] {
    if alpha >= 1.0 {
        return over;
    }
    let mut out = [0_u8; 3];
    for channel in 0..3 {
        let mixed = f32::from(over[channel]).mul_add(alpha, f32::from(under[channel]) * (1.0 - alpha));
        out[channel] = mixed.round().clamp(0.0, 255.0) as u8;
    }
    out
}
