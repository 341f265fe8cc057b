//! Annotation store: the elements drawn on the overlay, grouped in layers.
//!
//! The overlay keeps two layers, one for user gestures and one for
//! programmatic (API) draws. Each is an ordered list of [`Element`]s that can
//! be replayed onto a surface. Insertion order matters for replay only;
//! lookups scan the whole layer.

#[cfg(test)]
#[path = "layer_test.rs"]
mod layer_test;

use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;
use crate::geometry::{BoardGeometry, Point};
use crate::render;
use crate::square::Square;
use crate::style::{ArrowStyle, CircleStyle};
use crate::surface::Surface;

/// Which layer an element belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Drawn with the pointer.
    User,
    /// Drawn by the host through the overlay API.
    Api,
}

/// One annotation, carrying the style that was current when it was drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    /// Arrow between two square centers.
    Arrow { from: Square, to: Square, style: ArrowStyle },
    /// Circle on one square.
    Circle { square: Square, center: Point, radius: f64, style: CircleStyle },
}

impl Element {
    /// Whether this is a circle on `square`.
    #[must_use]
    pub fn is_circle_on(&self, square: Square) -> bool {
        matches!(self, Self::Circle { square: s, .. } if *s == square)
    }

    /// Whether this is an arrow from `from` to `to`.
    #[must_use]
    pub fn is_arrow(&self, from: Square, to: Square) -> bool {
        matches!(self, Self::Arrow { from: f, to: t, .. } if *f == from && *t == to)
    }

    /// Paint this element with its own captured style.
    ///
    /// # Errors
    ///
    /// Propagates a surface failure while painting a circle.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, geometry: &BoardGeometry) -> Result<(), SurfaceError> {
        match self {
            Self::Arrow { from, to, style } => {
                render::draw_arrow(surface, geometry.square_to_point(*from), geometry.square_to_point(*to), style);
                Ok(())
            }
            Self::Circle { center, radius, style, .. } => render::draw_circle(surface, *center, *radius, style),
        }
    }
}

/// Ordered collection of elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    elements: Vec<Element>,
}

impl Layer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Remove every element matching `pred`. Returns whether anything was removed.
    pub fn remove_where<F>(&mut self, pred: F) -> bool
    where
        F: Fn(&Element) -> bool,
    {
        let before = self.elements.len();
        self.elements.retain(|e| !pred(e));
        self.elements.len() != before
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Replay every element in insertion order.
    ///
    /// # Errors
    ///
    /// Stops at the first element the surface refuses.
    pub fn redraw<S: Surface + ?Sized>(&self, surface: &mut S, geometry: &BoardGeometry) -> Result<(), SurfaceError> {
        for element in &self.elements {
            element.draw(surface, geometry)?;
        }
        Ok(())
    }

    /// Recompute stored circle centers and radii after the geometry changed.
    pub fn reanchor(&mut self, geometry: &BoardGeometry) {
        for element in &mut self.elements {
            if let Element::Circle { square, center, radius, .. } = element {
                *center = geometry.square_to_point(*square);
                *radius = geometry.circle_radius();
            }
        }
    }

    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of arrow elements.
    #[must_use]
    pub fn arrow_count(&self) -> usize {
        self.elements.iter().filter(|e| matches!(e, Element::Arrow { .. })).count()
    }

    /// Number of circle elements.
    #[must_use]
    pub fn circle_count(&self) -> usize {
        self.elements.iter().filter(|e| matches!(e, Element::Circle { .. })).count()
    }
}

/// The user and API layers of one overlay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layers {
    user: Layer,
    api: Layer,
}

impl Layers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, kind: LayerKind) -> &Layer {
        match kind {
            LayerKind::User => &self.user,
            LayerKind::Api => &self.api,
        }
    }

    pub fn get_mut(&mut self, kind: LayerKind) -> &mut Layer {
        match kind {
            LayerKind::User => &mut self.user,
            LayerKind::Api => &mut self.api,
        }
    }

    pub fn clear_all(&mut self) {
        self.user.clear();
        self.api.clear();
    }

    /// Replay the API layer, then the user layer on top of it.
    ///
    /// # Errors
    ///
    /// Stops at the first element the surface refuses.
    pub fn redraw<S: Surface + ?Sized>(&self, surface: &mut S, geometry: &BoardGeometry) -> Result<(), SurfaceError> {
        self.api.redraw(surface, geometry)?;
        self.user.redraw(surface, geometry)
    }

    pub fn reanchor(&mut self, geometry: &BoardGeometry) {
        self.user.reanchor(geometry);
        self.api.reanchor(geometry);
    }
}
