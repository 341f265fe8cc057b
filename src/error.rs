//! Error types for every fallible layer of the overlay.
//!
//! Chess-legality failures are not errors: rejected gestures and illegal
//! line moves are reported through [`crate::overlay::Action`] and
//! [`crate::session::MoveOutcome`]. What remains here are malformed inputs,
//! backend failures, and misuse of the promotion gate.

use crate::square::Square;

/// Stable machine-readable code for an error, for hosts that map failures
/// to user-facing messages.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SquareError {
    #[error("square must be two characters, got {0:?}")]
    Length(String),
    #[error("invalid file in square {0:?}")]
    File(String),
    #[error("invalid rank in square {0:?}")]
    Rank(String),
}

impl ErrorCode for SquareError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Length(_) => "E_SQUARE_LENGTH",
            Self::File(_) => "E_SQUARE_FILE",
            Self::Rank(_) => "E_SQUARE_RANK",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("drawing backend error: {0}")]
    Backend(String),
}

impl ErrorCode for SurfaceError {
    fn error_code(&self) -> &'static str {
        "E_SURFACE"
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OverlayError {
    #[error("invalid board geometry: width {width}, resolution factor {res_factor}")]
    Geometry { width: f64, res_factor: f64 },
    #[error("square is off the board: {0}")]
    OffBoard(Square),
    #[error("arrow from {0} to itself has no direction")]
    DegenerateArrow(Square),
    #[error("piece path needs at least one square")]
    EmptyPath,
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

impl ErrorCode for OverlayError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Geometry { .. } => "E_GEOMETRY",
            Self::OffBoard(_) => "E_OFF_BOARD",
            Self::DegenerateArrow(_) => "E_DEGENERATE_ARROW",
            Self::EmptyPath => "E_EMPTY_PATH",
            Self::Surface(e) => e.error_code(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("a promotion choice is pending; resolve or cancel it first")]
    PromotionPending,
    #[error("no promotion is pending")]
    NoPendingPromotion,
    #[error("invalid promotion move {from}-{to}")]
    InvalidPromotion { from: Square, to: Square },
    #[error("rules engine rejected position {0:?}")]
    InvalidPosition(String),
    #[error("the annotation line has no moves to save")]
    EmptyLine,
    #[error("no saved line at index {0}")]
    NoSavedLine(usize),
    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::PromotionPending => "E_PROMOTION_PENDING",
            Self::NoPendingPromotion => "E_NO_PENDING_PROMOTION",
            Self::InvalidPromotion { .. } => "E_INVALID_PROMOTION",
            Self::InvalidPosition(_) => "E_INVALID_POSITION",
            Self::EmptyLine => "E_EMPTY_LINE",
            Self::NoSavedLine(_) => "E_NO_SAVED_LINE",
            Self::Overlay(e) => e.error_code(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Parse { key: &'static str, value: String },
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "E_CONFIG_PARSE",
            Self::Invalid(_) => "E_CONFIG_INVALID",
            Self::Json(_) => "E_CONFIG_JSON",
        }
    }
}
