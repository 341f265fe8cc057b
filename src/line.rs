//! Annotation line and arrow archive.
//!
//! The annotation line is a linear history of moves played out from a base
//! position, with a cursor marking how many of them are currently shown.
//! Adding a move while the cursor is behind the end truncates the moves after
//! it; there is no branching. The archive remembers, per ply of the live
//! game, which arrows were drawn while that ply was current.

#[cfg(test)]
#[path = "line_test.rs"]
mod line_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rules::PromotionPiece;
use crate::square::Square;
use crate::style::ArrowStyle;

/// One move of the annotation line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineEntry {
    pub from: Square,
    pub to: Square,
    pub color: String,
    pub width: f64,
    pub opacity: u8,
    /// Position snapshot after the move.
    pub position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PromotionPiece>,
}

impl LineEntry {
    /// The style this entry was drawn with. Head size is not recorded and
    /// comes from `base`.
    #[must_use]
    pub fn arrow_style(&self, base: &ArrowStyle) -> ArrowStyle {
        ArrowStyle { color: self.color.clone(), width: self.width, opacity: self.opacity, ..base.clone() }
    }
}

/// Cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Navigation {
    Start,
    Prev,
    Next,
    End,
}

/// An entry as shown in a move list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMove<'a> {
    pub index: usize,
    pub entry: &'a LineEntry,
    /// Whether the entry lies before the cursor.
    pub played: bool,
}

/// Linear, truncating move history over a base position.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationLine {
    base_position: String,
    entries: Vec<LineEntry>,
    cursor: usize,
}

impl AnnotationLine {
    #[must_use]
    pub fn new(base_position: impl Into<String>) -> Self {
        Self { base_position: base_position.into(), entries: Vec::new(), cursor: 0 }
    }

    #[must_use]
    pub fn base_position(&self) -> &str {
        &self.base_position
    }

    /// Start over from a different base position.
    pub fn rebase(&mut self, base_position: impl Into<String>) {
        self.base_position = base_position.into();
        self.reset();
    }

    /// Drop every entry and move the cursor to the start.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// Position shown at the cursor: the base position at cursor 0, otherwise
    /// the position after the last played entry.
    #[must_use]
    pub fn current_position(&self) -> &str {
        match self.cursor.checked_sub(1).and_then(|i| self.entries.get(i)) {
            Some(entry) => &entry.position,
            None => &self.base_position,
        }
    }

    /// Append after the cursor, discarding any entries beyond it, and move the
    /// cursor to the new end.
    pub fn push(&mut self, entry: LineEntry) {
        self.entries.truncate(self.cursor);
        self.entries.push(entry);
        self.cursor = self.entries.len();
    }

    /// Move the cursor, clamped to `0..=len`. Returns whether it moved.
    pub fn navigate(&mut self, target: Navigation) -> bool {
        let next = match target {
            Navigation::Start => 0,
            Navigation::Prev => self.cursor.saturating_sub(1),
            Navigation::Next => (self.cursor + 1).min(self.entries.len()),
            Navigation::End => self.entries.len(),
        };
        let moved = next != self.cursor;
        self.cursor = next;
        moved
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn entries(&self) -> &[LineEntry] {
        &self.entries
    }

    /// Entries before the cursor.
    #[must_use]
    pub fn played(&self) -> &[LineEntry] {
        &self.entries[..self.cursor]
    }

    /// Every entry, flagged with whether it is before the cursor.
    pub fn moves(&self) -> impl Iterator<Item = LineMove<'_>> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| LineMove { index, entry, played: index < self.cursor })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An arrow remembered for a ply of the live game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedArrow {
    pub from: Square,
    pub to: Square,
    pub color: String,
    pub width: f64,
    pub opacity: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PromotionPiece>,
}

impl From<&LineEntry> for ArchivedArrow {
    fn from(entry: &LineEntry) -> Self {
        Self {
            from: entry.from,
            to: entry.to,
            color: entry.color.clone(),
            width: entry.width,
            opacity: entry.opacity,
            promotion: entry.promotion,
        }
    }
}

impl ArchivedArrow {
    /// See [`LineEntry::arrow_style`].
    #[must_use]
    pub fn arrow_style(&self, base: &ArrowStyle) -> ArrowStyle {
        ArrowStyle { color: self.color.clone(), width: self.width, opacity: self.opacity, ..base.clone() }
    }
}

/// Arrows drawn per ply. Append-only per ply; removal is by whole ply or
/// everything at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrowArchive {
    by_ply: BTreeMap<u32, Vec<ArchivedArrow>>,
}

impl ArrowArchive {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ply: u32, arrow: ArchivedArrow) {
        self.by_ply.entry(ply).or_default().push(arrow);
    }

    /// Arrows for `ply`, oldest first. Empty if none were drawn.
    #[must_use]
    pub fn arrows(&self, ply: u32) -> &[ArchivedArrow] {
        self.by_ply.get(&ply).map_or(&[], Vec::as_slice)
    }

    pub fn clear_ply(&mut self, ply: u32) {
        self.by_ply.remove(&ply);
    }

    pub fn clear(&mut self) {
        self.by_ply.clear();
    }

    /// Plies that have at least one arrow.
    pub fn plies(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_ply.keys().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_ply.is_empty()
    }
}
