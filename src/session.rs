//! Session: the context object tying the overlay to a rules engine, a board
//! widget, the annotation line and the arrow archive.
//!
//! The engine and the board always sit at the position shown at the line's
//! cursor. Committed arrows are applied as moves; navigating the line reloads
//! that position and replays the played prefix onto the overlay's API layer.
//!
//! A promotion with several possible pieces suspends the move in a
//! [`PendingPromotion`] until the host calls [`Session::resolve_promotion`] or
//! [`Session::cancel_promotion`]. While suspended, every other mutating
//! operation except [`Session::load_position`] fails with
//! [`SessionError::PromotionPending`] and changes nothing.
//!
//! A finished line can be saved aside with [`Session::save_line`]. Saved lines
//! keep their own cursor and never touch the engine or the board.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::geometry::Point;
use crate::input::Button;
use crate::line::{AnnotationLine, ArchivedArrow, ArrowArchive, LineEntry, Navigation};
use crate::overlay::{Action, Overlay};
use crate::rules::{BoardView, MoveRequest, PromotionPiece, RulesEngine, Side};
use crate::square::Square;
use crate::style::ArrowStyle;
use crate::surface::Surface;

/// A move suspended until a promotion piece is chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPromotion {
    pub from: Square,
    pub to: Square,
    pub style: ArrowStyle,
    /// Position the move is played from.
    pub base_position: String,
    /// Side whose pawn promotes.
    pub side: Side,
}

/// Result of offering a move to the annotation line.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    Applied(LineEntry),
    /// The host must choose a piece; see [`Session::resolve_promotion`].
    PromotionRequired { side: Side },
    Rejected,
}

/// Result of a pointer-up: the overlay's actions, plus what the line did with
/// a committed arrow, if there was one.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerOutcome {
    pub actions: Vec<Action>,
    pub line: Option<MoveOutcome>,
}

pub struct Session<E, B, S>
where
    E: RulesEngine,
    B: BoardView,
    S: Surface,
{
    engine: E,
    board: B,
    overlay: Overlay<S>,
    line: AnnotationLine,
    archive: ArrowArchive,
    ply: u32,
    pending: Option<PendingPromotion>,
    saved: Vec<AnnotationLine>,
}

impl<E, B, S> Session<E, B, S>
where
    E: RulesEngine,
    B: BoardView,
    S: Surface,
{
    /// Start a session at the engine's current position, which becomes the
    /// base position at ply 0. The overlay adopts the board's orientation.
    ///
    /// # Errors
    ///
    /// Returns `Overlay` if the overlay cannot be redrawn in the board's
    /// orientation.
    pub fn new(engine: E, mut board: B, mut overlay: Overlay<S>) -> Result<Self, SessionError> {
        let base = engine.position_snapshot();
        board.set_position(&base);
        overlay.set_orientation(board.orientation())?;
        info!(base = %base, "session started");
        Ok(Self {
            engine,
            board,
            overlay,
            line: AnnotationLine::new(base),
            archive: ArrowArchive::new(),
            ply: 0,
            pending: None,
            saved: Vec::new(),
        })
    }

    // --- Pointer input ---

    /// # Errors
    ///
    /// Returns `PromotionPending` while a promotion is suspended, or `Overlay`
    /// if the provisional circle cannot be painted.
    pub fn on_pointer_down(&mut self, pt: Point, button: Button) -> Result<Vec<Action>, SessionError> {
        self.ensure_idle("pointer_down")?;
        Ok(self.overlay.on_pointer_down(pt, button)?)
    }

    /// # Errors
    ///
    /// Returns `PromotionPending` while a promotion is suspended, or `Overlay`
    /// if drag feedback cannot be painted.
    pub fn on_pointer_move(&mut self, pt: Point) -> Result<Vec<Action>, SessionError> {
        self.ensure_idle("pointer_move")?;
        Ok(self.overlay.on_pointer_move(pt)?)
    }

    /// Finish a gesture. Arrows are validated against the engine's legal
    /// moves; a committed arrow is then applied to the annotation line.
    ///
    /// # Errors
    ///
    /// Returns `PromotionPending` while a promotion is suspended, or `Overlay`
    /// if painting fails.
    pub fn on_pointer_up(&mut self, pt: Point, button: Button) -> Result<PointerOutcome, SessionError> {
        self.ensure_idle("pointer_up")?;
        let engine = &self.engine;
        let actions = self.overlay.on_pointer_up(pt, button, &|from: Square, to: Square| has_legal_move(engine, from, to))?;

        let committed = actions.iter().find_map(|action| match action {
            Action::ArrowCommitted { from, to, style } => Some((*from, *to, style.clone())),
            _ => None,
        });
        let line = match committed {
            Some((from, to, style)) => Some(self.apply_move(from, to, &style)?),
            None => None,
        };
        Ok(PointerOutcome { actions, line })
    }

    // --- Annotation line ---

    /// Offer `from -> to` to the engine at the displayed position.
    ///
    /// Legal moves are appended to the line (truncating entries beyond the
    /// cursor), drawn on the API layer and archived under the current ply.
    /// A pawn move with several promotion choices is suspended instead.
    ///
    /// # Errors
    ///
    /// Returns `PromotionPending` while a promotion is suspended, or `Overlay`
    /// if the arrow cannot be painted; the engine is restored in that case.
    pub fn apply_move(&mut self, from: Square, to: Square, style: &ArrowStyle) -> Result<MoveOutcome, SessionError> {
        self.ensure_idle("apply_move")?;

        let variants: Vec<Option<PromotionPiece>> =
            self.engine.moves_from(from).into_iter().filter(|m| m.to == to).map(|m| m.promotion).collect();

        let promotion = match variants.as_slice() {
            [] => {
                debug!(%from, %to, "move rejected by engine");
                return Ok(MoveOutcome::Rejected);
            }
            [only] => *only,
            _ => {
                let side = self.engine.side_to_move();
                info!(%from, %to, ?side, "promotion choice required");
                self.pending = Some(PendingPromotion {
                    from,
                    to,
                    style: style.clone(),
                    base_position: self.line.current_position().to_owned(),
                    side,
                });
                return Ok(MoveOutcome::PromotionRequired { side });
            }
        };

        Ok(match self.commit(from, to, promotion, style)? {
            Some(entry) => MoveOutcome::Applied(entry),
            None => MoveOutcome::Rejected,
        })
    }

    /// Complete the suspended move with `piece`.
    ///
    /// # Errors
    ///
    /// Returns `NoPendingPromotion` if nothing is suspended, and
    /// `InvalidPromotion` if the engine refuses the piece. The suspended move
    /// is discarded in both failure cases; nothing is recorded.
    pub fn resolve_promotion(&mut self, piece: PromotionPiece) -> Result<LineEntry, SessionError> {
        let pending = self.pending.take().ok_or(SessionError::NoPendingPromotion)?;
        match self.commit(pending.from, pending.to, Some(piece), &pending.style)? {
            Some(entry) => Ok(entry),
            None => {
                warn!(from = %pending.from, to = %pending.to, piece = %piece.code(), "promotion refused");
                Err(SessionError::InvalidPromotion { from: pending.from, to: pending.to })
            }
        }
    }

    /// Discard the suspended move, as if it had been illegal.
    ///
    /// # Errors
    ///
    /// Returns `NoPendingPromotion` if nothing is suspended.
    pub fn cancel_promotion(&mut self) -> Result<(), SessionError> {
        let pending = self.pending.take().ok_or(SessionError::NoPendingPromotion)?;
        debug!(from = %pending.from, to = %pending.to, "promotion cancelled");
        Ok(())
    }

    /// Move the line cursor. When it actually moves, the engine and board are
    /// set to the new displayed position and the overlay is wiped and replays
    /// the played entries. Returns whether the cursor moved.
    ///
    /// # Errors
    ///
    /// Returns `PromotionPending` while a promotion is suspended,
    /// `InvalidPosition` if the engine refuses a stored snapshot (the cursor
    /// stays put), or `Overlay` if the replay fails.
    pub fn navigate(&mut self, target: Navigation) -> Result<bool, SessionError> {
        self.ensure_idle("navigate")?;
        let mut next = self.line.clone();
        if !next.navigate(target) {
            return Ok(false);
        }
        self.load_engine(next.current_position())?;
        self.line = next;
        debug!(cursor = self.line.cursor(), ?target, "line navigated");
        self.show_displayed_position()?;
        Ok(true)
    }

    /// Empty the line, forget the arrows archived for the current ply, and
    /// return the engine, board and overlay to the base position.
    ///
    /// # Errors
    ///
    /// Returns `PromotionPending` while a promotion is suspended, or
    /// `InvalidPosition` if the engine refuses the base position.
    pub fn reset_to_base(&mut self) -> Result<(), SessionError> {
        self.ensure_idle("reset_to_base")?;
        let base = self.line.base_position().to_owned();
        self.load_engine(&base)?;
        self.line.reset();
        self.archive.clear_ply(self.ply);
        self.overlay.clear_all();
        self.board.set_position(&base);
        info!(ply = self.ply, "annotations reset to base position");
        Ok(())
    }

    /// Start over from a new position: line and whole archive are reset, the
    /// ply counter returns to 0, and any suspended promotion is dropped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPosition` if the engine refuses `position`; nothing
    /// changes in that case.
    pub fn load_position(&mut self, position: &str) -> Result<(), SessionError> {
        self.load_engine(position)?;
        if let Some(pending) = self.pending.take() {
            debug!(from = %pending.from, to = %pending.to, "pending promotion dropped by position load");
        }
        self.archive.clear();
        self.line.rebase(position);
        self.ply = 0;
        self.overlay.clear_all();
        self.board.set_position(position);
        info!(position, "position loaded");
        Ok(())
    }

    /// Jump to another ply of the live game whose position is `position`.
    ///
    /// The overlay and line are cleared and rebased on `position`, then the
    /// arrows archived for `ply` are replayed in order: each one the engine
    /// still accepts is re-added to the line and drawn on the API layer, the
    /// rest are skipped. The archive itself is left as is.
    ///
    /// # Errors
    ///
    /// Returns `PromotionPending` while a promotion is suspended,
    /// `InvalidPosition` if the engine refuses `position` (nothing changes),
    /// or `Overlay` if an arrow cannot be painted.
    pub fn goto_ply(&mut self, ply: u32, position: &str) -> Result<(), SessionError> {
        self.ensure_idle("goto_ply")?;
        self.load_engine(position)?;
        self.ply = ply;
        self.line.rebase(position);
        self.overlay.clear_all();

        let archived = self.archive.arrows(ply).to_vec();
        let current = self.overlay.arrow_settings();
        let mut skipped = 0_usize;
        for arrow in &archived {
            let mv = MoveRequest { from: arrow.from, to: arrow.to, promotion: arrow.promotion };
            if !self.engine.apply_move(&mv) {
                skipped += 1;
                continue;
            }
            self.overlay.draw_arrow_styled(arrow.from, arrow.to, arrow.arrow_style(&current))?;
            self.line.push(LineEntry {
                from: arrow.from,
                to: arrow.to,
                color: arrow.color.clone(),
                width: arrow.width,
                opacity: arrow.opacity,
                position: self.engine.position_snapshot(),
                promotion: arrow.promotion,
            });
        }

        self.board.set_position(self.line.current_position());
        info!(ply, restored = self.line.len(), skipped, "moved to ply");
        Ok(())
    }

    // --- Saved lines ---

    /// Set the current line aside and reset to the base position, like
    /// [`Session::reset_to_base`]. The saved copy shows its last move.
    /// Returns its index in [`Session::saved_lines`].
    ///
    /// # Errors
    ///
    /// Returns `PromotionPending` while a promotion is suspended, `EmptyLine`
    /// if the line has no moves, or `InvalidPosition` if the engine refuses
    /// the base position. Nothing is saved on error.
    pub fn save_line(&mut self) -> Result<usize, SessionError> {
        self.ensure_idle("save_line")?;
        if self.line.is_empty() {
            return Err(SessionError::EmptyLine);
        }
        let mut saved = self.line.clone();
        saved.navigate(Navigation::End);
        self.reset_to_base()?;

        let index = self.saved.len();
        info!(index, moves = saved.len(), base = %saved.base_position(), "annotation line saved");
        self.saved.push(saved);
        Ok(index)
    }

    #[must_use]
    pub fn saved_lines(&self) -> &[AnnotationLine] {
        &self.saved
    }

    #[must_use]
    pub fn saved_line(&self, index: usize) -> Option<&AnnotationLine> {
        self.saved.get(index)
    }

    /// Step through a saved line on its own. Returns whether its cursor
    /// moved; the position to show is its `current_position()`.
    ///
    /// # Errors
    ///
    /// Returns `NoSavedLine` for an unknown index.
    pub fn navigate_saved(&mut self, index: usize, target: Navigation) -> Result<bool, SessionError> {
        let line = self.saved.get_mut(index).ok_or(SessionError::NoSavedLine(index))?;
        Ok(line.navigate(target))
    }

    /// Delete a saved line; later lines shift down by one.
    ///
    /// # Errors
    ///
    /// Returns `NoSavedLine` for an unknown index.
    pub fn remove_saved_line(&mut self, index: usize) -> Result<AnnotationLine, SessionError> {
        if index >= self.saved.len() {
            return Err(SessionError::NoSavedLine(index));
        }
        debug!(index, "saved line removed");
        Ok(self.saved.remove(index))
    }

    // --- Board ---

    /// Flip the board widget and make the overlay follow its orientation.
    ///
    /// # Errors
    ///
    /// Returns `Overlay` if the overlay cannot be redrawn.
    pub fn flip(&mut self) -> Result<(), SessionError> {
        self.board.flip();
        self.overlay.set_orientation(self.board.orientation())?;
        Ok(())
    }

    #[must_use]
    pub fn side_to_move(&self) -> Side {
        self.engine.side_to_move()
    }

    #[must_use]
    pub fn in_check(&self) -> bool {
        self.engine.is_in_check()
    }

    // --- Queries ---

    #[must_use]
    pub fn line(&self) -> &AnnotationLine {
        &self.line
    }

    #[must_use]
    pub fn archive(&self) -> &ArrowArchive {
        &self.archive
    }

    #[must_use]
    pub fn ply(&self) -> u32 {
        self.ply
    }

    #[must_use]
    pub fn pending_promotion(&self) -> Option<&PendingPromotion> {
        self.pending.as_ref()
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub fn board(&self) -> &B {
        &self.board
    }

    #[must_use]
    pub fn overlay(&self) -> &Overlay<S> {
        &self.overlay
    }

    /// Direct overlay access for styling, API draws and clearing.
    ///
    /// # Errors
    ///
    /// Returns `PromotionPending` while a promotion is suspended.
    pub fn overlay_mut(&mut self) -> Result<&mut Overlay<S>, SessionError> {
        self.ensure_idle("overlay_mut")?;
        Ok(&mut self.overlay)
    }

    /// Tear down the session, handing back its collaborators.
    #[must_use]
    pub fn into_parts(self) -> (E, B, Overlay<S>) {
        (self.engine, self.board, self.overlay)
    }

    // --- Internals ---

    fn ensure_idle(&self, op: &'static str) -> Result<(), SessionError> {
        match &self.pending {
            Some(pending) => {
                warn!(op, from = %pending.from, to = %pending.to, "rejected while promotion is pending");
                Err(SessionError::PromotionPending)
            }
            None => Ok(()),
        }
    }

    fn load_engine(&mut self, position: &str) -> Result<(), SessionError> {
        if self.engine.load_position(position) {
            Ok(())
        } else {
            warn!(position, "engine refused position");
            Err(SessionError::InvalidPosition(position.to_owned()))
        }
    }

    /// Apply a move the engine listed, record it and draw it. `Ok(None)` if
    /// the engine refuses it after all.
    fn commit(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PromotionPiece>,
        style: &ArrowStyle,
    ) -> Result<Option<LineEntry>, SessionError> {
        let before = self.line.current_position().to_owned();
        if !self.engine.apply_move(&MoveRequest { from, to, promotion }) {
            return Ok(None);
        }

        if let Err(err) = self.overlay.draw_arrow_styled(from, to, style.clone()) {
            if !self.engine.load_position(&before) {
                warn!(position = %before, "engine could not be restored after failed draw");
            }
            return Err(err.into());
        }

        let entry = LineEntry {
            from,
            to,
            color: style.color.clone(),
            width: style.width,
            opacity: style.opacity,
            position: self.engine.position_snapshot(),
            promotion,
        };
        self.board.set_position(&entry.position);
        self.archive.push(self.ply, ArchivedArrow::from(&entry));
        self.line.push(entry.clone());
        info!(%from, %to, ply = self.ply, cursor = self.line.cursor(), "move added to annotation line");
        Ok(Some(entry))
    }

    /// Wipe the overlay and replay the played prefix of the line.
    fn show_displayed_position(&mut self) -> Result<(), SessionError> {
        self.board.set_position(self.line.current_position());
        self.overlay.clear_all();
        let current = self.overlay.arrow_settings();
        for entry in self.line.played() {
            self.overlay.draw_arrow_styled(entry.from, entry.to, entry.arrow_style(&current))?;
        }
        Ok(())
    }
}

fn has_legal_move<E: RulesEngine>(engine: &E, from: Square, to: Square) -> bool {
    from.is_on_board() && to.is_on_board() && engine.moves_from(from).iter().any(|m| m.to == to)
}
