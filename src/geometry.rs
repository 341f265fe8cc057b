//! Coordinate mapping between overlay pixels and board squares.
//!
//! Pixel coordinates are in the overlay's drawing space, which is CSS pixels:
//! `board_px_width` is the backing-store width, `res_factor` times the CSS
//! width, and the context is scaled back down by the same factor. One square
//! therefore spans `board_px_width / (res_factor * 8)` units.
//! Mapping is not clamped; see [`crate::square`]. Far-off coordinates saturate
//! instead of overflowing.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::consts::{CIRCLE_PADDING_PX, NUM_SQUARES};
use crate::error::OverlayError;
use crate::square::Square;

/// A point in overlay pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which side of the board is drawn at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Rank 8 at pixel row 0, a-file at pixel column 0.
    #[default]
    White,
    /// Rank 1 at pixel row 0, h-file at pixel column 0.
    Black,
}

impl Orientation {
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

/// Board dimensions and orientation; the only state the mapping needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardGeometry {
    board_px_width: f64,
    res_factor: f64,
    orientation: Orientation,
}

impl BoardGeometry {
    /// # Errors
    ///
    /// Returns `Geometry` if either dimension is not a positive finite number.
    pub fn new(board_px_width: f64, res_factor: f64) -> Result<Self, OverlayError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(board_px_width) || !valid(res_factor) {
            return Err(OverlayError::Geometry { width: board_px_width, res_factor });
        }
        Ok(Self { board_px_width, res_factor, orientation: Orientation::White })
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Edge length of one square in pixels.
    #[must_use]
    pub fn square_size(&self) -> f64 {
        self.board_px_width / (self.res_factor * f64::from(NUM_SQUARES))
    }

    /// Radius for a circle annotation: half a square less the padding.
    #[must_use]
    pub fn circle_radius(&self) -> f64 {
        self.square_size() / 2.0 - CIRCLE_PADDING_PX
    }

    /// Pixel center of `square`.
    #[must_use]
    pub fn square_to_point(&self, square: Square) -> Point {
        let (col, row) = match self.orientation {
            Orientation::White => (square.file(), NUM_SQUARES.saturating_sub(square.rank())),
            Orientation::Black => ((NUM_SQUARES - 1).saturating_sub(square.file()), square.rank().saturating_sub(1)),
        };
        let size = self.square_size();
        Point::new((f64::from(col) + 0.5) * size, (f64::from(row) + 0.5) * size)
    }

    /// Square containing the pixel `(x, y)`. Not clamped to the board.
    #[must_use]
    pub fn point_to_square(&self, pt: Point) -> Square {
        let col = self.cell(pt.x);
        let row = self.cell(pt.y);
        match self.orientation {
            Orientation::White => Square::new(col, NUM_SQUARES.saturating_sub(row)),
            Orientation::Black => Square::new((NUM_SQUARES - 1).saturating_sub(col), row.saturating_add(1)),
        }
    }

    /// Mid-tread quantization of one coordinate to the nearest square center.
    #[must_use]
    pub fn quantize(&self, pixel: f64) -> f64 {
        let size = self.square_size();
        size * ((pixel / size).floor() + 0.5)
    }

    /// Snap both coordinates of `pt` to the center of the square under it.
    #[must_use]
    pub fn quantize_point(&self, pt: Point) -> Point {
        Point::new(self.quantize(pt.x), self.quantize(pt.y))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell(&self, pixel: f64) -> i32 {
        (pixel / self.square_size()).floor() as i32
    }
}
