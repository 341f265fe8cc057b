//! Annotation overlay for a chessboard.
//!
//! The overlay sits on top of a board widget and lets the user sketch arrows
//! (drag) and circles (click) on squares. Arrows that are legal moves are fed
//! to a rules engine and recorded in a linear, navigable annotation line;
//! navigating the line replays its arrows and moves the board along with it.
//! The rules engine and the board widget are external collaborators reached
//! through the traits in [`rules`]. Drawing goes through the [`surface::Surface`]
//! trait, backed by a recording surface for headless use and, with the `web`
//! feature, by a browser canvas.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`square`] | Square identifiers, parsing and display |
//! | [`geometry`] | Pixel/square mapping, quantization and board orientation |
//! | [`style`] | Arrow and circle styles and their partial updates |
//! | [`surface`] | Drawing surface trait and the recording backend |
//! | [`render`] | Arrow and circle painting |
//! | [`layer`] | Annotation elements and the user/API layers |
//! | [`input`] | Mouse buttons and the gesture state |
//! | [`overlay`] | Overlay controller and its host [`overlay::Action`]s |
//! | [`rules`] | Rules engine and board widget interfaces |
//! | [`line`] | Annotation line, cursor, and per-ply arrow archive |
//! | [`session`] | Ties overlay, engine, board and line together; promotion gate |
//! | [`config`] | Overlay configuration from defaults, environment or JSON |
//! | [`error`] | Error types and stable error codes |
//! | [`consts`] | Shared constants (default sizes and colours) |

pub mod config;
pub mod consts;
pub mod error;
pub mod geometry;
pub mod input;
pub mod layer;
pub mod line;
pub mod overlay;
pub mod render;
pub mod rules;
pub mod session;
pub mod square;
pub mod style;
pub mod surface;
#[cfg(feature = "web")]
mod web;
