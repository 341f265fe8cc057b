//! Board square identifiers.
//!
//! A [`Square`] is a file/rank pair. Squares parsed from text are always on
//! the board (`[a-h][1-8]`), but squares derived from pixel coordinates are
//! not clamped: a pointer outside the board yields an off-board square that
//! downstream legality checks are expected to reject.

#[cfg(test)]
#[path = "square_test.rs"]
mod square_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::NUM_SQUARES;
use crate::error::SquareError;

/// A board square. `file` 0 is the a-file, `rank` 1 is White's back rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    file: i32,
    rank: i32,
}

impl Square {
    /// Build a square from a zero-based file index and a one-based rank.
    /// No range check is performed.
    #[must_use]
    pub fn new(file: i32, rank: i32) -> Self {
        Self { file, rank }
    }

    /// Zero-based file index (a = 0).
    #[must_use]
    pub fn file(self) -> i32 {
        self.file
    }

    /// One-based rank number.
    #[must_use]
    pub fn rank(self) -> i32 {
        self.rank
    }

    /// Whether the square lies within a1..h8.
    #[must_use]
    pub fn is_on_board(self) -> bool {
        (0..NUM_SQUARES).contains(&self.file) && (1..=NUM_SQUARES).contains(&self.rank)
    }

    /// The file letter, or `'?'` when the file is outside a..z.
    #[must_use]
    pub fn file_char(self) -> char {
        match u8::try_from(self.file) {
            Ok(f) if f < 26 => char::from(b'a' + f),
            _ => '?',
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank)
    }
}

impl FromStr for Square {
    type Err = SquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let [file, rank] = bytes else {
            return Err(SquareError::Length(s.to_owned()));
        };
        if !(b'a'..=b'h').contains(file) {
            return Err(SquareError::File(s.to_owned()));
        }
        if !(b'1'..=b'8').contains(rank) {
            return Err(SquareError::Rank(s.to_owned()));
        }
        Ok(Self { file: i32::from(file - b'a'), rank: i32::from(rank - b'0') })
    }
}

impl TryFrom<String> for Square {
    type Error = SquareError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string()
    }
}
