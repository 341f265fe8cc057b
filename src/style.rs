//! Arrow and circle styles, and the sparse patches used to update them.
//!
//! Every element captures a full style value when it is created, so later
//! changes to the controller's current style never restyle it.

#[cfg(test)]
#[path = "style_test.rs"]
mod style_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_ARROW_HEAD_SIZE, DEFAULT_ARROW_WIDTH, DEFAULT_CIRCLE_THICKNESS, DEFAULT_USER_COLOUR, OPAQUE,
};

/// Stroke and head parameters for an arrow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowStyle {
    /// CSS colour string.
    pub color: String,
    /// Shaft line width in pixels.
    pub width: f64,
    /// Distance from the arrow tip to each base vertex of the head, in pixels.
    pub head_size: f64,
    /// Opacity on a 0–100 scale.
    pub opacity: u8,
}

impl Default for ArrowStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_USER_COLOUR.to_owned(),
            width: DEFAULT_ARROW_WIDTH,
            head_size: DEFAULT_ARROW_HEAD_SIZE,
            opacity: OPAQUE,
        }
    }
}

impl ArrowStyle {
    /// Global alpha in 0.0–1.0 for the drawing surface.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        opacity_to_alpha(self.opacity)
    }

    /// A copy of this style with a different colour.
    #[must_use]
    pub fn with_color(&self, color: &str) -> Self {
        Self { color: color.to_owned(), ..self.clone() }
    }

    /// Merge the present fields of `patch` into this style.
    pub fn apply(&mut self, patch: &ArrowStylePatch) {
        if let Some(ref color) = patch.color {
            self.color.clone_from(color);
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(head_size) = patch.head_size {
            self.head_size = head_size;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity.min(OPAQUE);
        }
    }
}

/// Stroke parameters for a circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleStyle {
    /// CSS colour string.
    pub color: String,
    /// Stroke thickness in pixels.
    pub thickness: f64,
    /// Opacity on a 0–100 scale.
    pub opacity: u8,
}

impl Default for CircleStyle {
    fn default() -> Self {
        Self { color: DEFAULT_USER_COLOUR.to_owned(), thickness: DEFAULT_CIRCLE_THICKNESS, opacity: OPAQUE }
    }
}

impl CircleStyle {
    #[must_use]
    pub fn alpha(&self) -> f64 {
        opacity_to_alpha(self.opacity)
    }

    #[must_use]
    pub fn with_color(&self, color: &str) -> Self {
        Self { color: color.to_owned(), ..self.clone() }
    }

    pub fn apply(&mut self, patch: &CircleStylePatch) {
        if let Some(ref color) = patch.color {
            self.color.clone_from(color);
        }
        if let Some(thickness) = patch.thickness {
            self.thickness = thickness;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity.min(OPAQUE);
        }
    }
}

/// Sparse update for an [`ArrowStyle`]. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrowStylePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_size: Option<f64>,
    /// Values above 100 are clamped to 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<u8>,
}

/// Sparse update for a [`CircleStyle`]. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircleStylePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<u8>,
}

fn opacity_to_alpha(opacity: u8) -> f64 {
    f64::from(opacity.min(OPAQUE)) / f64::from(OPAQUE)
}
