//! Render primitives: arrows and circles painted onto a [`Surface`].
//!
//! These functions are stateless. Each one sets the surface alpha from the
//! style before painting and restores full opacity afterwards, so one call's
//! style never leaks into the next.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::PI;

use crate::error::SurfaceError;
use crate::geometry::Point;
use crate::style::{ArrowStyle, CircleStyle};
use crate::surface::Surface;

/// Angle between adjacent vertices of the arrowhead triangle (120°).
const HEAD_VERTEX_STEP: f64 = 2.0 * PI / 3.0;

// =============================================================
// Arrows
// =============================================================

/// Point on the `from → to` line that lies `head_size` pixels short of `to`.
///
/// The shaft stops here so it does not poke through the head. Axis-aligned
/// lines are offset along that axis only.
#[must_use]
pub fn shaft_end(from: Point, to: Point, head_size: f64) -> Point {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let (x_off, y_off) = if dx == 0.0 {
        (0.0, dy.signum() * head_size)
    } else if dy == 0.0 {
        (dx.signum() * head_size, 0.0)
    } else {
        let slope = (dy / dx).abs();
        let x_off = dx.signum() * head_size / slope.mul_add(slope, 1.0).sqrt();
        (x_off, dy.signum() * x_off.abs() * slope)
    };
    Point::new(to.x - x_off, to.y - y_off)
}

/// Vertices of the filled arrowhead for a shaft ending at `base`.
///
/// The triangle is centered on `base` with circumradius `head_size`; the
/// first vertex points along the shaft direction, so it lands on the arrow
/// tip, and the other two are rotated ±120° from it.
#[must_use]
pub fn arrow_head(from: Point, base: Point, head_size: f64) -> [Point; 3] {
    let angle = (base.y - from.y).atan2(base.x - from.x);
    let vertex = |a: f64| Point::new(head_size.mul_add(a.cos(), base.x), head_size.mul_add(a.sin(), base.y));
    [vertex(angle), vertex(angle + HEAD_VERTEX_STEP), vertex(angle + 2.0 * HEAD_VERTEX_STEP)]
}

/// Paint the arrowhead on its own, at the style's opacity.
pub fn draw_arrow_head<S: Surface + ?Sized>(surface: &mut S, from: Point, base: Point, style: &ArrowStyle) {
    surface.set_alpha(style.alpha());
    fill_head(surface, from, base, style);
    surface.set_alpha(1.0);
}

fn fill_head<S: Surface + ?Sized>(surface: &mut S, from: Point, base: Point, style: &ArrowStyle) {
    surface.fill_polygon(&arrow_head(from, base, style.head_size), &style.color);
}

/// Paint a full arrow: round-capped shaft plus head with its tip at `to`.
///
/// A zero-length arrow has no direction and paints nothing.
pub fn draw_arrow<S: Surface + ?Sized>(surface: &mut S, from: Point, to: Point, style: &ArrowStyle) {
    if from == to {
        return;
    }
    let base = shaft_end(from, to, style.head_size);

    surface.set_alpha(style.alpha());
    surface.stroke_line(from, base, &style.color, style.width);
    // Head after shaft, so it covers the shaft's rounded end.
    fill_head(surface, from, base, style);
    surface.set_alpha(1.0);
}

// =============================================================
// Circles
// =============================================================

/// Paint a stroked circle.
///
/// # Errors
///
/// Propagates the surface's refusal to draw the arc. Opacity is restored
/// either way.
pub fn draw_circle<S: Surface + ?Sized>(
    surface: &mut S,
    center: Point,
    radius: f64,
    style: &CircleStyle,
) -> Result<(), SurfaceError> {
    surface.set_alpha(style.alpha());
    let result = surface.stroke_circle(center, radius, &style.color, style.thickness);
    surface.set_alpha(1.0);
    result
}
