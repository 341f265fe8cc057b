//! Interfaces to the external collaborators: the chess rules engine and the
//! board widget.
//!
//! Legality is delegated entirely to a [`RulesEngine`]; this crate never
//! interprets positions beyond passing opaque snapshot strings around.

#[cfg(test)]
#[path = "rules_test.rs"]
mod rules_test;

use serde::{Deserialize, Serialize};

use crate::geometry::Orientation;
use crate::square::Square;

/// Piece a pawn promotes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionPiece {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl PromotionPiece {
    /// Single-letter code as used in move text (`q`, `r`, `b`, `n`).
    #[must_use]
    pub fn code(self) -> char {
        match self {
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
        }
    }
}

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

/// A legal destination reported by the engine for a given origin square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalMove {
    pub to: Square,
    /// Set on each of the promotion variants of a pawn move to the last rank.
    pub promotion: Option<PromotionPiece>,
    /// Letter of the captured piece, if any.
    pub captured: Option<char>,
}

/// A move to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PromotionPiece>,
}

/// Chess rules engine.
pub trait RulesEngine {
    /// Legal moves from `square` in the current position.
    fn moves_from(&self, square: Square) -> Vec<LegalMove>;

    /// Apply `mv` if legal. Returns `false`, leaving the position unchanged,
    /// if it is not.
    fn apply_move(&mut self, mv: &MoveRequest) -> bool;

    /// Opaque snapshot of the current position.
    fn position_snapshot(&self) -> String;

    /// Replace the current position. Returns `false` if the snapshot is not
    /// understood.
    fn load_position(&mut self, snapshot: &str) -> bool;

    fn side_to_move(&self) -> Side;

    fn is_in_check(&self) -> bool;
}

/// The board widget that paints pieces.
pub trait BoardView {
    fn set_position(&mut self, snapshot: &str);

    fn position(&self) -> String;

    fn orientation(&self) -> Orientation;

    fn flip(&mut self);
}
