//! Overlay controller: turns pointer gestures into circles and arrows.
//!
//! The controller owns two surfaces. The transient surface shows drag
//! feedback and is wiped on every pointer-up; the persistent surface holds
//! committed elements. Handlers return [`Action`]s for the host to process,
//! the same way the input handlers of a canvas engine report mutations
//! instead of performing side effects themselves.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use tracing::debug;

use crate::config::OverlayConfig;
use crate::consts::DEFAULT_API_COLOUR;
use crate::error::OverlayError;
use crate::geometry::{BoardGeometry, Orientation, Point};
use crate::input::{Button, InputState};
use crate::layer::{Element, Layer, LayerKind, Layers};
use crate::render;
use crate::square::Square;
use crate::style::{ArrowStyle, ArrowStylePatch, CircleStyle, CircleStylePatch};
use crate::surface::Surface;

/// Decides whether a dragged arrow may be committed.
///
/// Returning `false` is a normal, silent rejection: the drag leaves nothing
/// behind.
pub trait MoveValidator {
    fn is_legal(&self, from: Square, to: Square) -> bool;
}

impl<F> MoveValidator for F
where
    F: Fn(Square, Square) -> bool,
{
    fn is_legal(&self, from: Square, to: Square) -> bool {
        self(from, to)
    }
}

/// Outcomes reported to the host from input handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A user arrow passed validation and was added to the user layer.
    ArrowCommitted { from: Square, to: Square, style: ArrowStyle },
    /// A user arrow failed validation and was discarded.
    ArrowRejected { from: Square, to: Square },
    /// A click added a circle to the user layer.
    CircleAdded(Square),
    /// A click removed the existing user circle on this square.
    CircleRemoved(Square),
    /// Surfaces changed and should be presented.
    RenderNeeded,
}

/// Annotation overlay for one board.
pub struct Overlay<S: Surface> {
    geometry: BoardGeometry,
    transient: S,
    persistent: S,
    layers: Layers,
    input: InputState,
    arrow_style: ArrowStyle,
    circle_style: CircleStyle,
    api_colour: String,
}

impl<S: Surface> Overlay<S> {
    /// Create an overlay with default styles over the given surfaces.
    #[must_use]
    pub fn new(geometry: BoardGeometry, transient: S, persistent: S) -> Self {
        Self {
            geometry,
            transient,
            persistent,
            layers: Layers::new(),
            input: InputState::Idle,
            arrow_style: ArrowStyle::default(),
            circle_style: CircleStyle::default(),
            api_colour: DEFAULT_API_COLOUR.to_owned(),
        }
    }

    /// Create an overlay from a validated config.
    ///
    /// # Errors
    ///
    /// Returns `Geometry` if the configured board size is unusable.
    pub fn from_config(config: &OverlayConfig, transient: S, persistent: S) -> Result<Self, OverlayError> {
        let geometry =
            BoardGeometry::new(config.board_px_width, config.res_factor)?.with_orientation(config.orientation);
        let mut overlay = Self::new(geometry, transient, persistent);
        overlay.arrow_style = config.arrow.clone();
        overlay.circle_style = config.circle.clone();
        overlay.api_colour.clone_from(&config.api_colour);
        Ok(overlay)
    }

    // --- Input events ---

    /// Start a gesture: snap to the square center and show a provisional circle.
    ///
    /// # Errors
    ///
    /// Returns `Surface` if the provisional circle cannot be painted; the
    /// gesture does not start in that case.
    pub fn on_pointer_down(&mut self, pt: Point, button: Button) -> Result<Vec<Action>, OverlayError> {
        if button != Button::Primary {
            return Ok(Vec::new());
        }
        let initial = self.geometry.quantize_point(pt);
        self.show_provisional_circle(initial)?;
        self.input = InputState::Pressing { initial, last: pt };
        Ok(vec![Action::RenderNeeded])
    }

    /// Track the drag. Off the starting square the transient surface shows an
    /// arrow to the raw pointer; back on it, the provisional circle.
    ///
    /// # Errors
    ///
    /// Returns `Surface` if the provisional circle cannot be repainted.
    pub fn on_pointer_move(&mut self, pt: Point) -> Result<Vec<Action>, OverlayError> {
        let InputState::Pressing { initial, .. } = self.input else {
            return Ok(Vec::new());
        };
        self.input = InputState::Pressing { initial, last: pt };

        if self.geometry.point_to_square(pt) == self.geometry.point_to_square(initial) {
            self.show_provisional_circle(initial)?;
        } else {
            self.transient.clear();
            render::draw_arrow(&mut self.transient, initial, pt, &self.arrow_style);
        }
        Ok(vec![Action::RenderNeeded])
    }

    /// Finish the gesture.
    ///
    /// Released on the starting square, the click toggles a user circle there.
    /// Released elsewhere, the arrow is offered to `validator` and committed
    /// only if it is accepted. The transient surface is cleared either way.
    ///
    /// # Errors
    ///
    /// Returns `Surface` if the committed element cannot be painted; nothing
    /// is added to the user layer in that case.
    pub fn on_pointer_up<V>(&mut self, pt: Point, button: Button, validator: &V) -> Result<Vec<Action>, OverlayError>
    where
        V: MoveValidator + ?Sized,
    {
        if button != Button::Primary {
            return Ok(Vec::new());
        }
        let InputState::Pressing { initial, .. } = self.input else {
            return Ok(Vec::new());
        };
        self.input = InputState::Idle;

        let from = self.geometry.point_to_square(initial);
        let to = self.geometry.point_to_square(pt);
        let result = if from == to { self.toggle_circle(from, initial) } else { self.commit_arrow(from, to, validator) };

        self.transient.clear();
        result
    }

    /// Context-menu events are swallowed. Always `true`: the host should
    /// prevent the platform menu.
    #[must_use]
    pub fn on_context_menu(&self) -> bool {
        true
    }

    fn show_provisional_circle(&mut self, center: Point) -> Result<(), OverlayError> {
        self.transient.clear();
        render::draw_circle(&mut self.transient, center, self.geometry.circle_radius(), &self.circle_style)?;
        Ok(())
    }

    fn toggle_circle(&mut self, square: Square, center: Point) -> Result<Vec<Action>, OverlayError> {
        if self.layers.get_mut(LayerKind::User).remove_where(|e| e.is_circle_on(square)) {
            debug!(%square, "circle toggled off");
            self.redraw()?;
            return Ok(vec![Action::CircleRemoved(square), Action::RenderNeeded]);
        }

        let element =
            Element::Circle { square, center, radius: self.geometry.circle_radius(), style: self.circle_style.clone() };
        element.draw(&mut self.persistent, &self.geometry)?;
        self.layers.get_mut(LayerKind::User).append(element);
        debug!(%square, "circle added");
        Ok(vec![Action::CircleAdded(square), Action::RenderNeeded])
    }

    fn commit_arrow<V>(&mut self, from: Square, to: Square, validator: &V) -> Result<Vec<Action>, OverlayError>
    where
        V: MoveValidator + ?Sized,
    {
        if !validator.is_legal(from, to) {
            debug!(%from, %to, "arrow rejected by validator");
            return Ok(vec![Action::ArrowRejected { from, to }, Action::RenderNeeded]);
        }

        let style = self.arrow_style.clone();
        let element = Element::Arrow { from, to, style: style.clone() };
        element.draw(&mut self.persistent, &self.geometry)?;
        self.layers.get_mut(LayerKind::User).append(element);
        debug!(%from, %to, "arrow committed");
        Ok(vec![Action::ArrowCommitted { from, to, style }, Action::RenderNeeded])
    }

    // --- Programmatic drawing (API layer) ---

    /// Draw an arrow on the API layer in `color`, or the API colour.
    ///
    /// # Errors
    ///
    /// Returns `OffBoard` for squares outside the board and `DegenerateArrow`
    /// when `from == to`.
    pub fn draw_arrow_from_to(&mut self, from: Square, to: Square, color: Option<&str>) -> Result<(), OverlayError> {
        let style = self.arrow_style.with_color(color.unwrap_or(&self.api_colour));
        self.draw_arrow_styled(from, to, style)
    }

    /// Draw an arrow on the API layer with a complete style of its own.
    ///
    /// # Errors
    ///
    /// Same as [`Overlay::draw_arrow_from_to`].
    pub fn draw_arrow_styled(&mut self, from: Square, to: Square, style: ArrowStyle) -> Result<(), OverlayError> {
        on_board(from)?;
        on_board(to)?;
        if from == to {
            return Err(OverlayError::DegenerateArrow(from));
        }
        let element = Element::Arrow { from, to, style };
        element.draw(&mut self.persistent, &self.geometry)?;
        self.layers.get_mut(LayerKind::Api).append(element);
        Ok(())
    }

    /// Draw a circle on the API layer in `color`, or the API colour.
    ///
    /// # Errors
    ///
    /// Returns `OffBoard` for a square outside the board, or `Surface` if the
    /// circle cannot be painted.
    pub fn draw_circle_on(&mut self, square: Square, color: Option<&str>) -> Result<(), OverlayError> {
        on_board(square)?;
        let element = Element::Circle {
            square,
            center: self.geometry.square_to_point(square),
            radius: self.geometry.circle_radius(),
            style: self.circle_style.with_color(color.unwrap_or(&self.api_colour)),
        };
        element.draw(&mut self.persistent, &self.geometry)?;
        self.layers.get_mut(LayerKind::Api).append(element);
        Ok(())
    }

    /// Illustrate a piece route: circles on the first and last squares and
    /// arrows between consecutive squares.
    ///
    /// Nothing is stored in either layer, so the path disappears on the next
    /// redraw or clear.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPath` for an empty slice and `OffBoard` if any square is
    /// outside the board; nothing is painted in either case.
    pub fn draw_piece_path(&mut self, squares: &[Square], color: &str) -> Result<(), OverlayError> {
        let (Some(first), Some(last)) = (squares.first(), squares.last()) else {
            return Err(OverlayError::EmptyPath);
        };
        for square in squares {
            on_board(*square)?;
        }

        let circle = self.circle_style.with_color(color);
        let arrow = self.arrow_style.with_color(color);
        let radius = self.geometry.circle_radius();
        render::draw_circle(&mut self.persistent, self.geometry.square_to_point(*first), radius, &circle)?;
        render::draw_circle(&mut self.persistent, self.geometry.square_to_point(*last), radius, &circle)?;
        for pair in squares.windows(2) {
            let from = self.geometry.square_to_point(pair[0]);
            let to = self.geometry.square_to_point(pair[1]);
            render::draw_arrow(&mut self.persistent, from, to, &arrow);
        }
        Ok(())
    }

    // --- Clearing and redraw ---

    /// Wipe both surfaces and replay both layers.
    ///
    /// # Errors
    ///
    /// Returns `Surface` if an element cannot be repainted. The surfaces are
    /// always fully cleared before replay starts.
    pub fn redraw(&mut self) -> Result<(), OverlayError> {
        self.transient.clear();
        self.persistent.clear();
        self.layers.redraw(&mut self.persistent, &self.geometry)?;
        Ok(())
    }

    /// Remove every element from both layers and wipe both surfaces.
    pub fn clear_all(&mut self) {
        self.layers.clear_all();
        self.transient.clear();
        self.persistent.clear();
    }

    /// Remove user elements; API elements are repainted.
    ///
    /// # Errors
    ///
    /// Returns `Surface` if a surviving element cannot be repainted.
    pub fn clear_user_drawn(&mut self) -> Result<(), OverlayError> {
        self.clear_layer(LayerKind::User)
    }

    /// Remove API elements; user elements are repainted.
    ///
    /// # Errors
    ///
    /// Returns `Surface` if a surviving element cannot be repainted.
    pub fn clear_api_drawn(&mut self) -> Result<(), OverlayError> {
        self.clear_layer(LayerKind::Api)
    }

    fn clear_layer(&mut self, kind: LayerKind) -> Result<(), OverlayError> {
        self.layers.get_mut(kind).clear();
        self.redraw()
    }

    // --- Styles ---

    /// Merge `patch` into the current arrow style and redraw.
    ///
    /// Only future arrows use the new style; existing elements keep the style
    /// they were drawn with.
    ///
    /// # Errors
    ///
    /// Returns `Surface` if the redraw fails.
    pub fn update_arrow_settings(&mut self, patch: &ArrowStylePatch) -> Result<(), OverlayError> {
        self.arrow_style.apply(patch);
        self.redraw()
    }

    /// Merge `patch` into the current circle style and redraw.
    ///
    /// # Errors
    ///
    /// Returns `Surface` if the redraw fails.
    pub fn update_circle_settings(&mut self, patch: &CircleStylePatch) -> Result<(), OverlayError> {
        self.circle_style.apply(patch);
        self.redraw()
    }

    /// A copy of the current arrow style.
    #[must_use]
    pub fn arrow_settings(&self) -> ArrowStyle {
        self.arrow_style.clone()
    }

    /// A copy of the current circle style.
    #[must_use]
    pub fn circle_settings(&self) -> CircleStyle {
        self.circle_style.clone()
    }

    pub fn set_api_colour(&mut self, colour: &str) {
        colour.clone_into(&mut self.api_colour);
    }

    // --- Orientation ---

    /// Flip the square mapping, move stored circles to their new centers, and
    /// redraw.
    ///
    /// # Errors
    ///
    /// Returns `Surface` if the redraw fails.
    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), OverlayError> {
        if self.geometry.orientation() == orientation {
            return Ok(());
        }
        self.geometry.set_orientation(orientation);
        self.layers.reanchor(&self.geometry);
        self.redraw()
    }

    // --- Teardown ---

    /// Clear both surfaces and hand them back. The overlay is consumed, so no
    /// further operation can follow.
    #[must_use]
    pub fn destroy(mut self) -> (S, S) {
        self.transient.clear();
        self.persistent.clear();
        debug!(
            user = self.layers.get(LayerKind::User).len(),
            api = self.layers.get(LayerKind::Api).len(),
            "overlay destroyed"
        );
        (self.transient, self.persistent)
    }

    // --- Queries ---

    #[must_use]
    pub fn layer(&self, kind: LayerKind) -> &Layer {
        self.layers.get(kind)
    }

    #[must_use]
    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    #[must_use]
    pub fn input_state(&self) -> InputState {
        self.input
    }

    #[must_use]
    pub fn transient(&self) -> &S {
        &self.transient
    }

    #[must_use]
    pub fn persistent(&self) -> &S {
        &self.persistent
    }

    #[must_use]
    pub fn api_colour(&self) -> &str {
        &self.api_colour
    }
}

fn on_board(square: Square) -> Result<(), OverlayError> {
    if square.is_on_board() { Ok(()) } else { Err(OverlayError::OffBoard(square)) }
}
