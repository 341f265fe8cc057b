#![allow(clippy::float_cmp)]

use std::collections::BTreeMap;

use super::*;
use crate::error::ErrorCode;
use crate::geometry::{BoardGeometry, Orientation};
use crate::layer::{Element, LayerKind};
use crate::rules::LegalMove;
use crate::surface::RecordingSurface;

// =============================================================
// Fakes
// =============================================================

const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w";
const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b";
const AFTER_E4_E5: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w";
const PAWN_ON_A7: &str = "8/P7/8/8/8/8/8/8 w";

/// Just enough chess for the session: pawns (with promotion) and knights,
/// positions as FEN placement plus side to move.
#[derive(Debug, Clone, Default)]
struct FakeEngine {
    pieces: BTreeMap<(i32, i32), char>,
    white_to_move: bool,
    refuse: Vec<PromotionPiece>,
    queen_only: bool,
    check: bool,
}

impl FakeEngine {
    fn at(position: &str) -> Self {
        let mut engine = Self::default();
        assert!(engine.load_position(position), "bad test position {position}");
        engine
    }

    fn parse(position: &str) -> Option<(BTreeMap<(i32, i32), char>, bool)> {
        let mut parts = position.split_whitespace();
        let placement = parts.next()?;
        let white = match parts.next()? {
            "w" => true,
            "b" => false,
            _ => return None,
        };
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            return None;
        }
        let mut pieces = BTreeMap::new();
        for (rank, row) in (1..=8).rev().zip(rows) {
            let mut file = 0;
            for c in row.chars() {
                match c.to_digit(10) {
                    Some(n) => file += i32::try_from(n).unwrap(),
                    None => {
                        pieces.insert((file, rank), c);
                        file += 1;
                    }
                }
            }
            if file != 8 {
                return None;
            }
        }
        Some((pieces, white))
    }

    fn is_own(&self, piece: char) -> bool {
        piece.is_ascii_uppercase() == self.white_to_move
    }

    fn empty(&self, file: i32, rank: i32) -> bool {
        Square::new(file, rank).is_on_board() && !self.pieces.contains_key(&(file, rank))
    }

    fn enemy(&self, file: i32, rank: i32) -> bool {
        self.pieces.get(&(file, rank)).is_some_and(|&c| !self.is_own(c))
    }
}

impl RulesEngine for FakeEngine {
    fn moves_from(&self, square: Square) -> Vec<LegalMove> {
        let (f, r) = (square.file(), square.rank());
        let Some(&piece) = self.pieces.get(&(f, r)) else {
            return Vec::new();
        };
        if !self.is_own(piece) {
            return Vec::new();
        }

        let mut targets = Vec::new();
        match piece.to_ascii_lowercase() {
            'p' => {
                let dir = if piece.is_ascii_uppercase() { 1 } else { -1 };
                let start = if dir == 1 { 2 } else { 7 };
                if self.empty(f, r + dir) {
                    targets.push((f, r + dir));
                    if r == start && self.empty(f, r + 2 * dir) {
                        targets.push((f, r + 2 * dir));
                    }
                }
                for df in [-1, 1] {
                    if self.enemy(f + df, r + dir) {
                        targets.push((f + df, r + dir));
                    }
                }
            }
            'n' => {
                for (df, dr) in [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)] {
                    let (tf, tr) = (f + df, r + dr);
                    let own = self.pieces.get(&(tf, tr)).is_some_and(|&c| self.is_own(c));
                    if Square::new(tf, tr).is_on_board() && !own {
                        targets.push((tf, tr));
                    }
                }
            }
            _ => {}
        }

        let last_rank = match piece {
            'P' => 8,
            'p' => 1,
            _ => 0,
        };
        let choices: &[PromotionPiece] = if self.queen_only {
            &[PromotionPiece::Queen]
        } else {
            &[PromotionPiece::Queen, PromotionPiece::Rook, PromotionPiece::Bishop, PromotionPiece::Knight]
        };

        let mut moves = Vec::new();
        for (tf, tr) in targets {
            let to = Square::new(tf, tr);
            let captured = self.pieces.get(&(tf, tr)).copied();
            if tr == last_rank {
                moves.extend(choices.iter().map(|p| LegalMove { to, promotion: Some(*p), captured }));
            } else {
                moves.push(LegalMove { to, promotion: None, captured });
            }
        }
        moves
    }

    fn apply_move(&mut self, mv: &MoveRequest) -> bool {
        let legal = self.moves_from(mv.from).iter().any(|m| m.to == mv.to && m.promotion == mv.promotion);
        if !legal || mv.promotion.is_some_and(|p| self.refuse.contains(&p)) {
            return false;
        }
        let Some(piece) = self.pieces.remove(&(mv.from.file(), mv.from.rank())) else {
            return false;
        };
        let placed = match mv.promotion {
            Some(p) if piece.is_ascii_uppercase() => p.code().to_ascii_uppercase(),
            Some(p) => p.code(),
            None => piece,
        };
        self.pieces.insert((mv.to.file(), mv.to.rank()), placed);
        self.white_to_move = !self.white_to_move;
        true
    }

    fn position_snapshot(&self) -> String {
        let mut rows = Vec::new();
        for rank in (1..=8).rev() {
            let mut row = String::new();
            let mut gap = 0;
            for file in 0..8 {
                match self.pieces.get(&(file, rank)) {
                    Some(c) => {
                        if gap > 0 {
                            row.push_str(&gap.to_string());
                            gap = 0;
                        }
                        row.push(*c);
                    }
                    None => gap += 1,
                }
            }
            if gap > 0 {
                row.push_str(&gap.to_string());
            }
            rows.push(row);
        }
        format!("{} {}", rows.join("/"), if self.white_to_move { "w" } else { "b" })
    }

    fn load_position(&mut self, snapshot: &str) -> bool {
        match Self::parse(snapshot) {
            Some((pieces, white)) => {
                self.pieces = pieces;
                self.white_to_move = white;
                true
            }
            None => false,
        }
    }

    fn side_to_move(&self) -> Side {
        if self.white_to_move { Side::White } else { Side::Black }
    }

    fn is_in_check(&self) -> bool {
        self.check
    }
}

#[derive(Debug, Clone, Default)]
struct FakeBoard {
    position: String,
    orientation: Orientation,
    updates: usize,
}

impl BoardView for FakeBoard {
    fn set_position(&mut self, snapshot: &str) {
        snapshot.clone_into(&mut self.position);
        self.updates += 1;
    }

    fn position(&self) -> String {
        self.position.clone()
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn flip(&mut self) {
        self.orientation = self.orientation.flipped();
    }
}

// =============================================================
// Helpers
// =============================================================

type TestSession = Session<FakeEngine, FakeBoard, RecordingSurface>;

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

fn overlay() -> Overlay<RecordingSurface> {
    Overlay::new(BoardGeometry::new(480.0, 3.0).unwrap(), RecordingSurface::new(), RecordingSurface::new())
}

fn session_with(engine: FakeEngine) -> TestSession {
    Session::new(engine, FakeBoard::default(), overlay()).unwrap()
}

fn session_at(position: &str) -> TestSession {
    session_with(FakeEngine::at(position))
}

fn center(s: &TestSession, square: &str) -> Point {
    s.overlay().geometry().square_to_point(sq(square))
}

fn drag(s: &mut TestSession, from: &str, to: &str) -> PointerOutcome {
    let (a, b) = (center(s, from), center(s, to));
    s.on_pointer_down(a, Button::Primary).unwrap();
    s.on_pointer_move(b).unwrap();
    s.on_pointer_up(b, Button::Primary).unwrap()
}

fn play(s: &mut TestSession, from: &str, to: &str) -> MoveOutcome {
    s.apply_move(sq(from), sq(to), &ArrowStyle::default()).unwrap()
}

fn line_moves(s: &TestSession) -> Vec<String> {
    s.line().entries().iter().map(|e| format!("{}{}", e.from, e.to)).collect()
}

fn api_arrows(s: &TestSession) -> usize {
    s.overlay().layer(LayerKind::Api).arrow_count()
}

fn first_api_arrow_style(s: &TestSession) -> ArrowStyle {
    match s.overlay().layer(LayerKind::Api).elements().first() {
        Some(Element::Arrow { style, .. }) => style.clone(),
        other => panic!("expected an API arrow, got {other:?}"),
    }
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_session_starts_at_engine_position() {
    let s = session_at(START);
    assert_eq!(s.line().base_position(), START);
    assert_eq!(s.board().position(), START);
    assert_eq!(s.board().updates, 1);
    assert_eq!(s.ply(), 0);
    assert!(s.line().is_empty());
    assert!(s.pending_promotion().is_none());
}

#[test]
fn new_session_adopts_board_orientation() {
    let board = FakeBoard { orientation: Orientation::Black, ..FakeBoard::default() };
    let s = Session::new(FakeEngine::at(START), board, overlay()).unwrap();
    assert_eq!(s.overlay().geometry().orientation(), Orientation::Black);
}

// =============================================================
// Gestures
// =============================================================

#[test]
fn drag_e2_e4_commits_arrow_and_plays_move() {
    let mut s = session_at(START);
    let outcome = drag(&mut s, "e2", "e4");

    assert!(outcome.actions.iter().any(|a| matches!(a, Action::ArrowCommitted { .. })));
    assert!(matches!(outcome.line, Some(MoveOutcome::Applied(_))));

    let user = s.overlay().layer(LayerKind::User);
    assert_eq!(user.len(), 1);
    assert!(user.elements()[0].is_arrow(sq("e2"), sq("e4")));

    assert_eq!(s.line().len(), 1);
    assert_eq!(s.line().cursor(), 1);
    assert_eq!(s.engine().position_snapshot(), AFTER_E4);
    assert_eq!(s.board().position(), AFTER_E4);
    assert_eq!(api_arrows(&s), 1);
    assert_eq!(s.archive().arrows(0).len(), 1);
}

#[test]
fn illegal_drag_leaves_no_trace() {
    let mut s = session_at(START);
    let outcome = drag(&mut s, "e2", "e5");

    assert!(outcome.actions.contains(&Action::ArrowRejected { from: sq("e2"), to: sq("e5") }));
    assert!(outcome.line.is_none());
    assert!(s.overlay().layer(LayerKind::User).is_empty());
    assert!(s.line().is_empty());
    assert_eq!(s.engine().position_snapshot(), START);
}

#[test]
fn drag_off_board_is_rejected() {
    let mut s = session_at(START);
    let a = center(&s, "g1");
    s.on_pointer_down(a, Button::Primary).unwrap();
    let outcome = s.on_pointer_up(Point::new(a.x + 200.0, a.y), Button::Primary).unwrap();
    assert!(outcome.actions.iter().any(|a| matches!(a, Action::ArrowRejected { .. })));
    assert!(s.line().is_empty());
}

#[test]
fn click_toggles_circle_without_touching_line() {
    let mut s = session_at(START);
    let c = center(&s, "d4");
    s.on_pointer_down(c, Button::Primary).unwrap();
    let outcome = s.on_pointer_up(c, Button::Primary).unwrap();
    assert!(outcome.actions.contains(&Action::CircleAdded(sq("d4"))));
    assert!(outcome.line.is_none());
    assert!(s.line().is_empty());
}

#[test]
fn secondary_button_is_ignored() {
    let mut s = session_at(START);
    let (a, b) = (center(&s, "e2"), center(&s, "e4"));
    assert!(s.on_pointer_down(a, Button::Secondary).unwrap().is_empty());
    let outcome = s.on_pointer_up(b, Button::Secondary).unwrap();
    assert!(outcome.actions.is_empty());
    assert!(s.line().is_empty());
}

// =============================================================
// Annotation line
// =============================================================

#[test]
fn applying_after_navigating_back_truncates_line() {
    let mut s = session_at(START);
    play(&mut s, "e2", "e4");
    play(&mut s, "e7", "e5");
    play(&mut s, "g1", "f3");

    s.navigate(Navigation::Start).unwrap();
    s.navigate(Navigation::Next).unwrap();
    assert_eq!(s.line().cursor(), 1);

    assert!(matches!(play(&mut s, "b8", "c6"), MoveOutcome::Applied(_)));
    assert_eq!(line_moves(&s), vec!["e2e4", "b8c6"]);
    assert_eq!(s.line().cursor(), 2);
    assert_eq!(api_arrows(&s), 2);
}

#[test]
fn illegal_apply_is_rejected_without_change() {
    let mut s = session_at(START);
    assert_eq!(play(&mut s, "e2", "e5"), MoveOutcome::Rejected);
    assert_eq!(play(&mut s, "e7", "e5"), MoveOutcome::Rejected);
    assert!(s.line().is_empty());
    assert!(s.archive().is_empty());
    assert_eq!(api_arrows(&s), 0);
}

#[test]
fn applied_entry_captures_style_and_position() {
    let mut s = session_at(START);
    let style = ArrowStyle { color: "#00ff00".into(), width: 5.0, head_size: 10.0, opacity: 40 };
    let MoveOutcome::Applied(entry) = s.apply_move(sq("g1"), sq("f3"), &style).unwrap() else {
        panic!("expected move to apply");
    };
    assert_eq!(entry.color, "#00ff00");
    assert_eq!(entry.width, 5.0);
    assert_eq!(entry.opacity, 40);
    assert_eq!(entry.position, s.engine().position_snapshot());
    assert_eq!(s.archive().arrows(0)[0].color, "#00ff00");
}

#[test]
fn navigate_replays_played_prefix() {
    let mut s = session_at(START);
    play(&mut s, "e2", "e4");
    play(&mut s, "e7", "e5");
    play(&mut s, "g1", "f3");

    assert!(s.navigate(Navigation::Prev).unwrap());
    assert_eq!(api_arrows(&s), 2);
    assert_eq!(s.engine().position_snapshot(), AFTER_E4_E5);
    assert_eq!(s.board().position(), AFTER_E4_E5);

    assert!(s.navigate(Navigation::Start).unwrap());
    assert_eq!(api_arrows(&s), 0);
    assert_eq!(s.engine().position_snapshot(), START);

    assert!(s.navigate(Navigation::End).unwrap());
    assert_eq!(api_arrows(&s), 3);
    let played: Vec<bool> = s.line().moves().map(|m| m.played).collect();
    assert_eq!(played, vec![true, true, true]);
}

#[test]
fn navigate_wipes_user_drawings() {
    let mut s = session_at(START);
    play(&mut s, "e2", "e4");
    let c = center(&s, "a5");
    s.on_pointer_down(c, Button::Primary).unwrap();
    s.on_pointer_up(c, Button::Primary).unwrap();
    assert_eq!(s.overlay().layer(LayerKind::User).circle_count(), 1);

    s.navigate(Navigation::Prev).unwrap();
    assert!(s.overlay().layer(LayerKind::User).is_empty());
}

#[test]
fn navigate_at_bound_is_a_no_op() {
    let mut s = session_at(START);
    play(&mut s, "e2", "e4");
    let clears = s.overlay().persistent().clear_count();
    assert!(!s.navigate(Navigation::Next).unwrap());
    assert!(!s.navigate(Navigation::End).unwrap());
    assert_eq!(s.overlay().persistent().clear_count(), clears);
    assert_eq!(api_arrows(&s), 1);
}

#[test]
fn navigation_replays_each_entry_with_its_own_style() {
    let mut s = session_at(START);
    let thin = ArrowStyle { color: "#00ff00".into(), width: 2.0, head_size: 15.0, opacity: 30 };
    s.apply_move(sq("e2"), sq("e4"), &thin).unwrap();
    play(&mut s, "e7", "e5");

    s.navigate(Navigation::Prev).unwrap();
    let style = first_api_arrow_style(&s);
    assert_eq!(style.color, "#00ff00");
    assert_eq!(style.width, 2.0);
    assert_eq!(style.opacity, 30);

    s.goto_ply(0, START).unwrap();
    let style = first_api_arrow_style(&s);
    assert_eq!(style.width, 2.0);
    assert_eq!(style.opacity, 30);
}

#[test]
fn side_to_move_follows_displayed_position() {
    let mut s = session_at(START);
    assert_eq!(s.side_to_move(), Side::White);
    play(&mut s, "e2", "e4");
    assert_eq!(s.side_to_move(), Side::Black);
    s.navigate(Navigation::Start).unwrap();
    assert_eq!(s.side_to_move(), Side::White);
}

#[test]
fn in_check_is_reported_by_engine() {
    let engine = FakeEngine { check: true, ..FakeEngine::at(START) };
    let s = session_with(engine);
    assert!(s.in_check());
    assert!(!session_at(START).in_check());
}

// =============================================================
// Reset, load, ply navigation
// =============================================================

#[test]
fn reset_to_base_clears_line_and_current_ply_only() {
    let mut s = session_at(START);
    play(&mut s, "e2", "e4");
    s.goto_ply(1, AFTER_E4).unwrap();
    play(&mut s, "e7", "e5");
    assert_eq!(s.archive().arrows(1).len(), 1);

    s.reset_to_base().unwrap();
    assert!(s.line().is_empty());
    assert!(s.archive().arrows(1).is_empty());
    assert_eq!(s.archive().arrows(0).len(), 1);
    assert_eq!(s.engine().position_snapshot(), AFTER_E4);
    assert_eq!(s.board().position(), AFTER_E4);
    assert_eq!(api_arrows(&s), 0);
}

#[test]
fn load_position_resets_everything() {
    let mut s = session_at(START);
    play(&mut s, "e2", "e4");
    s.goto_ply(4, AFTER_E4).unwrap();

    s.load_position(PAWN_ON_A7).unwrap();
    assert_eq!(s.ply(), 0);
    assert!(s.archive().is_empty());
    assert!(s.line().is_empty());
    assert_eq!(s.line().base_position(), PAWN_ON_A7);
    assert_eq!(s.board().position(), PAWN_ON_A7);
    assert_eq!(s.engine().position_snapshot(), PAWN_ON_A7);
}

#[test]
fn load_invalid_position_changes_nothing() {
    let mut s = session_at(START);
    play(&mut s, "e2", "e4");
    let err = s.load_position("not a position").unwrap_err();
    assert!(matches!(err, SessionError::InvalidPosition(_)));
    assert_eq!(s.line().len(), 1);
    assert_eq!(s.engine().position_snapshot(), AFTER_E4);
}

#[test]
fn goto_ply_rebuilds_line_from_archive() {
    let mut s = session_at(START);
    play(&mut s, "e2", "e4");
    play(&mut s, "e7", "e5");

    s.goto_ply(3, START).unwrap();
    assert_eq!(s.ply(), 3);
    assert!(s.line().is_empty());
    assert_eq!(api_arrows(&s), 0);

    s.goto_ply(0, START).unwrap();
    assert_eq!(line_moves(&s), vec!["e2e4", "e7e5"]);
    assert_eq!(s.line().cursor(), 2);
    assert_eq!(api_arrows(&s), 2);
    assert_eq!(s.engine().position_snapshot(), AFTER_E4_E5);
    assert_eq!(s.board().position(), AFTER_E4_E5);
    assert_eq!(s.archive().arrows(0).len(), 2);
}

#[test]
fn goto_ply_skips_arrows_that_no_longer_replay() {
    let mut s = session_at(START);
    play(&mut s, "e2", "e4");
    s.navigate(Navigation::Start).unwrap();
    play(&mut s, "d2", "d4");
    assert_eq!(s.archive().arrows(0).len(), 2);

    s.goto_ply(0, START).unwrap();
    assert_eq!(line_moves(&s), vec!["e2e4"]);
    assert_eq!(api_arrows(&s), 1);
}

#[test]
fn goto_ply_with_invalid_position_changes_nothing() {
    let mut s = session_at(START);
    play(&mut s, "e2", "e4");
    assert!(s.goto_ply(2, "8/8 w").is_err());
    assert_eq!(s.ply(), 0);
    assert_eq!(s.line().len(), 1);
}

// =============================================================
// Promotion
// =============================================================

#[test]
fn promotion_with_choices_is_suspended() {
    let mut s = session_at(PAWN_ON_A7);
    assert_eq!(play(&mut s, "a7", "a8"), MoveOutcome::PromotionRequired { side: Side::White });

    let pending = s.pending_promotion().unwrap();
    assert_eq!((pending.from, pending.to), (sq("a7"), sq("a8")));
    assert_eq!(pending.base_position, PAWN_ON_A7);
    assert!(s.line().is_empty());
    assert_eq!(s.engine().position_snapshot(), PAWN_ON_A7);
}

#[test]
fn resolve_promotion_appends_entry_with_piece() {
    let mut s = session_at(PAWN_ON_A7);
    play(&mut s, "a7", "a8");
    let entry = s.resolve_promotion(PromotionPiece::Knight).unwrap();

    assert_eq!(entry.promotion, Some(PromotionPiece::Knight));
    assert_eq!(s.engine().position_snapshot(), "N7/8/8/8/8/8/8/8 b");
    assert_eq!(s.line().len(), 1);
    assert_eq!(s.archive().arrows(0)[0].promotion, Some(PromotionPiece::Knight));
    assert!(s.pending_promotion().is_none());
}

#[test]
fn refused_promotion_records_nothing() {
    let engine = FakeEngine { refuse: vec![PromotionPiece::Rook], ..FakeEngine::at(PAWN_ON_A7) };
    let mut s = session_with(engine);
    play(&mut s, "a7", "a8");

    let err = s.resolve_promotion(PromotionPiece::Rook).unwrap_err();
    assert_eq!(err, SessionError::InvalidPromotion { from: sq("a7"), to: sq("a8") });
    assert_eq!(err.error_code(), "E_INVALID_PROMOTION");
    assert!(s.pending_promotion().is_none());
    assert!(s.line().is_empty());
    assert!(s.archive().is_empty());
    assert_eq!(s.engine().position_snapshot(), PAWN_ON_A7);
}

#[test]
fn cancel_promotion_discards_move() {
    let mut s = session_at(PAWN_ON_A7);
    play(&mut s, "a7", "a8");
    s.cancel_promotion().unwrap();
    assert!(s.pending_promotion().is_none());
    assert!(s.line().is_empty());
    assert_eq!(s.cancel_promotion().unwrap_err(), SessionError::NoPendingPromotion);
}

#[test]
fn resolve_without_pending_fails() {
    let mut s = session_at(START);
    assert_eq!(s.resolve_promotion(PromotionPiece::Queen).unwrap_err(), SessionError::NoPendingPromotion);
}

#[test]
fn single_promotion_choice_applies_directly() {
    let engine = FakeEngine { queen_only: true, ..FakeEngine::at(PAWN_ON_A7) };
    let mut s = session_with(engine);
    let MoveOutcome::Applied(entry) = play(&mut s, "a7", "a8") else {
        panic!("expected move to apply");
    };
    assert_eq!(entry.promotion, Some(PromotionPiece::Queen));
    assert!(s.pending_promotion().is_none());
}

#[test]
fn pending_promotion_blocks_other_operations() {
    let mut s = session_at(PAWN_ON_A7);
    play(&mut s, "a7", "a8");
    let c = center(&s, "d4");

    let blocked = SessionError::PromotionPending;
    assert_eq!(s.apply_move(sq("a7"), sq("a8"), &ArrowStyle::default()).unwrap_err(), blocked);
    assert_eq!(s.navigate(Navigation::Start).unwrap_err(), blocked);
    assert_eq!(s.reset_to_base().unwrap_err(), blocked);
    assert_eq!(s.goto_ply(1, PAWN_ON_A7).unwrap_err(), blocked);
    assert_eq!(s.on_pointer_down(c, Button::Primary).unwrap_err(), blocked);
    assert_eq!(s.save_line().unwrap_err(), blocked);
    assert!(s.overlay_mut().is_err());

    assert!(s.pending_promotion().is_some());
    assert_eq!(s.ply(), 0);
    assert!(!s.overlay().input_state().is_pressing());
}

#[test]
fn promotion_drag_keeps_user_arrow_and_waits() {
    let mut s = session_at(PAWN_ON_A7);
    let outcome = drag(&mut s, "a7", "a8");
    assert_eq!(outcome.line, Some(MoveOutcome::PromotionRequired { side: Side::White }));
    assert_eq!(s.overlay().layer(LayerKind::User).arrow_count(), 1);
    assert_eq!(api_arrows(&s), 0);

    s.resolve_promotion(PromotionPiece::Queen).unwrap();
    assert_eq!(api_arrows(&s), 1);
}

#[test]
fn load_position_drops_pending_promotion() {
    let mut s = session_at(PAWN_ON_A7);
    play(&mut s, "a7", "a8");
    s.load_position(START).unwrap();
    assert!(s.pending_promotion().is_none());
    assert!(matches!(play(&mut s, "e2", "e4"), MoveOutcome::Applied(_)));
}

// =============================================================
// Saved lines
// =============================================================

#[test]
fn save_line_sets_line_aside_and_resets_to_base() {
    let mut s = session_at(START);
    play(&mut s, "e2", "e4");
    play(&mut s, "e7", "e5");
    s.navigate(Navigation::Prev).unwrap();

    assert_eq!(s.save_line().unwrap(), 0);
    assert!(s.line().is_empty());
    assert_eq!(s.engine().position_snapshot(), START);
    assert_eq!(s.board().position(), START);
    assert_eq!(api_arrows(&s), 0);

    let saved = s.saved_line(0).unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved.cursor(), 2);
    assert_eq!(saved.base_position(), START);
    assert_eq!(saved.current_position(), AFTER_E4_E5);
}

#[test]
fn saving_an_empty_line_fails() {
    let mut s = session_at(START);
    let err = s.save_line().unwrap_err();
    assert_eq!(err, SessionError::EmptyLine);
    assert_eq!(err.error_code(), "E_EMPTY_LINE");
    assert!(s.saved_lines().is_empty());
}

#[test]
fn saved_line_navigates_on_its_own() {
    let mut s = session_at(START);
    play(&mut s, "e2", "e4");
    play(&mut s, "e7", "e5");
    s.save_line().unwrap();
    play(&mut s, "d2", "d4");
    let updates = s.board().updates;

    assert!(s.navigate_saved(0, Navigation::Prev).unwrap());
    assert_eq!(s.saved_line(0).unwrap().current_position(), AFTER_E4);
    assert!(s.navigate_saved(0, Navigation::Start).unwrap());
    assert_eq!(s.saved_line(0).unwrap().current_position(), START);
    assert!(!s.navigate_saved(0, Navigation::Prev).unwrap());

    assert_eq!(line_moves(&s), vec!["d2d4"]);
    assert_eq!(s.line().cursor(), 1);
    assert_eq!(s.board().updates, updates);
}

#[test]
fn unknown_saved_line_index_fails() {
    let mut s = session_at(START);
    assert_eq!(s.navigate_saved(3, Navigation::Next).unwrap_err(), SessionError::NoSavedLine(3));
    assert_eq!(s.remove_saved_line(0).unwrap_err(), SessionError::NoSavedLine(0));
    assert!(s.saved_line(0).is_none());
}

#[test]
fn removing_a_saved_line_shifts_later_ones() {
    let mut s = session_at(START);
    play(&mut s, "e2", "e4");
    s.save_line().unwrap();
    play(&mut s, "g1", "f3");
    assert_eq!(s.save_line().unwrap(), 1);

    let removed = s.remove_saved_line(0).unwrap();
    assert_eq!(removed.entries()[0].from, sq("e2"));
    assert_eq!(s.saved_lines().len(), 1);
    assert_eq!(s.saved_lines()[0].entries()[0].from, sq("g1"));
}

#[test]
fn saved_lines_survive_position_load() {
    let mut s = session_at(START);
    play(&mut s, "e2", "e4");
    s.save_line().unwrap();
    s.load_position(PAWN_ON_A7).unwrap();
    assert_eq!(s.saved_lines().len(), 1);
    assert_eq!(s.saved_line(0).unwrap().base_position(), START);
}

// =============================================================
// Board and overlay access
// =============================================================

#[test]
fn flip_turns_board_and_overlay_together() {
    let mut s = session_at(START);
    s.flip().unwrap();
    assert_eq!(s.board().orientation(), Orientation::Black);
    assert_eq!(s.overlay().geometry().orientation(), Orientation::Black);
    s.flip().unwrap();
    assert_eq!(s.overlay().geometry().orientation(), Orientation::White);
}

#[test]
fn flipped_drag_still_maps_to_squares() {
    let mut s = session_at(START);
    s.flip().unwrap();
    let outcome = drag(&mut s, "e2", "e4");
    assert!(matches!(outcome.line, Some(MoveOutcome::Applied(_))));
    assert_eq!(s.engine().position_snapshot(), AFTER_E4);
}

#[test]
fn overlay_mut_allows_api_drawing() {
    let mut s = session_at(START);
    s.overlay_mut().unwrap().draw_circle_on(sq("d4"), None).unwrap();
    assert_eq!(s.overlay().layer(LayerKind::Api).circle_count(), 1);
}

#[test]
fn into_parts_returns_collaborators() {
    let mut s = session_at(START);
    play(&mut s, "e2", "e4");
    let (engine, board, overlay) = s.into_parts();
    assert_eq!(engine.position_snapshot(), AFTER_E4);
    assert_eq!(board.position(), AFTER_E4);
    assert_eq!(overlay.layer(LayerKind::Api).arrow_count(), 1);
}
