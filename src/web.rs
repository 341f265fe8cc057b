//! Browser backend: [`Surface`] over a 2D canvas context.
//!
//! The host owns the canvas elements and sizes them (backing store
//! `res_factor` times the CSS size, context pre-scaled by the same factor);
//! this impl only issues path and paint calls.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::error::SurfaceError;
use crate::geometry::Point;
use crate::surface::Surface;

impl Surface for CanvasRenderingContext2d {
    fn clear(&mut self) {
        let Some(canvas) = self.canvas() else {
            return;
        };
        self.clear_rect(0.0, 0.0, f64::from(canvas.width()), f64::from(canvas.height()));
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.set_global_alpha(alpha);
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: &str, width: f64) {
        self.set_stroke_style_str(color);
        self.set_line_cap("round");
        self.set_line_width(width);
        self.begin_path();
        self.move_to(from.x, from.y);
        self.line_to(to.x, to.y);
        self.stroke();
    }

    fn fill_polygon(&mut self, points: &[Point], color: &str) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.set_fill_style_str(color);
        self.begin_path();
        self.move_to(first.x, first.y);
        for p in rest {
            self.line_to(p.x, p.y);
        }
        self.close_path();
        self.fill();
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, color: &str, thickness: f64) -> Result<(), SurfaceError> {
        self.set_stroke_style_str(color);
        self.set_line_width(thickness);
        self.begin_path();
        self.arc(center.x, center.y, radius, 0.0, 2.0 * PI).map_err(js_err)?;
        self.stroke();
        Ok(())
    }
}

fn js_err(value: JsValue) -> SurfaceError {
    SurfaceError::Backend(format!("{value:?}"))
}
