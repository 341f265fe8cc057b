//! Drawing surfaces.
//!
//! [`Surface`] is the narrow slice of a 2D canvas API the render primitives
//! need. The browser backend lives in `web` (feature `web`); this module
//! ships [`RecordingSurface`], a headless backend that keeps the list of
//! operations painted since the last clear. Tests and the replay binary
//! read it back as "what is currently visible".

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use serde::Serialize;

use crate::error::SurfaceError;
use crate::geometry::Point;

/// A 2D drawing target.
pub trait Surface {
    /// Erase everything painted so far.
    fn clear(&mut self);

    /// Global alpha (0.0–1.0) for subsequent paints.
    fn set_alpha(&mut self, alpha: f64);

    /// Stroke a straight line with round caps.
    fn stroke_line(&mut self, from: Point, to: Point, color: &str, width: f64);

    /// Fill a closed polygon.
    fn fill_polygon(&mut self, points: &[Point], color: &str);

    /// Stroke a full circle.
    ///
    /// # Errors
    ///
    /// Returns `Backend` if the underlying canvas refuses the arc (e.g. a
    /// negative radius).
    fn stroke_circle(&mut self, center: Point, radius: f64, color: &str, thickness: f64) -> Result<(), SurfaceError>;
}

/// One recorded paint operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SurfaceOp {
    Alpha { alpha: f64 },
    Line { from: Point, to: Point, color: String, width: f64 },
    Polygon { points: Vec<Point>, color: String },
    Circle { center: Point, radius: f64, color: String, thickness: f64 },
}

/// Headless surface that records paint operations.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    ops: Vec<SurfaceOp>,
    alpha: f64,
    clears: usize,
    refuse_arcs: bool,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self { ops: Vec::new(), alpha: 1.0, clears: 0, refuse_arcs: false }
    }
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface whose `stroke_circle` always fails, for exercising error paths.
    #[must_use]
    pub fn refusing_arcs() -> Self {
        Self { refuse_arcs: true, ..Self::default() }
    }

    /// Operations painted since the last clear, in order.
    #[must_use]
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Whether nothing has been painted since the last clear.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        !self.ops.iter().any(|op| !matches!(op, SurfaceOp::Alpha { .. }))
    }

    /// Number of times the surface has been cleared.
    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.clears
    }

    /// Current global alpha.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Visible line strokes as `(from, to, color)`.
    #[must_use]
    pub fn lines(&self) -> Vec<(Point, Point, &str)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Line { from, to, color, .. } => Some((*from, *to, color.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Visible circles as `(center, radius, color)`.
    #[must_use]
    pub fn circles(&self) -> Vec<(Point, f64, &str)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Circle { center, radius, color, .. } => Some((*center, *radius, color.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Visible filled polygons.
    #[must_use]
    pub fn polygons(&self) -> Vec<&[Point]> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Polygon { points, .. } => Some(points.as_slice()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.ops.clear();
        self.clears += 1;
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
        self.ops.push(SurfaceOp::Alpha { alpha });
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: &str, width: f64) {
        self.ops.push(SurfaceOp::Line { from, to, color: color.to_owned(), width });
    }

    fn fill_polygon(&mut self, points: &[Point], color: &str) {
        self.ops.push(SurfaceOp::Polygon { points: points.to_vec(), color: color.to_owned() });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, color: &str, thickness: f64) -> Result<(), SurfaceError> {
        if self.refuse_arcs || radius < 0.0 {
            return Err(SurfaceError::Backend(format!("arc refused: radius {radius}")));
        }
        self.ops.push(SurfaceOp::Circle { center, radius, color: color.to_owned(), thickness });
        Ok(())
    }
}
