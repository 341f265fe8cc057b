//! Shared constants for the overlay crate.

// ── Board ───────────────────────────────────────────────────────

/// Squares along one edge of the board.
pub const NUM_SQUARES: i32 = 8;

/// Gap in pixels between a square's edge and the circle drawn on it, so
/// circles on adjacent squares never touch.
pub const CIRCLE_PADDING_PX: f64 = 1.0;

// ── Defaults ────────────────────────────────────────────────────

/// Canvas backing-store multiplier over CSS pixels.
pub const DEFAULT_RES_FACTOR: f64 = 3.0;

/// Backing-store width of the board canvas when the host does not supply
/// one: a 480 CSS pixel board at the default resolution factor.
pub const DEFAULT_BOARD_PX: f64 = 1440.0;

/// Colour for programmatically drawn annotations.
pub const DEFAULT_API_COLOUR: &str = "#007bff";

/// Colour seeded into the user styles when none is configured.
pub const DEFAULT_USER_COLOUR: &str = "#ffeb3b";

pub const DEFAULT_ARROW_WIDTH: f64 = 8.0;
pub const DEFAULT_ARROW_HEAD_SIZE: f64 = 15.0;
pub const DEFAULT_CIRCLE_THICKNESS: f64 = 3.0;

/// Fully opaque, on the 0–100 opacity scale used by styles.
pub const OPAQUE: u8 = 100;
