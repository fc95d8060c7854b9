//! Source positions for identifiers and literals

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A 1-based line/column location in a source file
#[derive(
    Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
#[display("{line}:{column}")]
pub struct Position {
    /// Line number, starting at 1
    pub line: u32,
    /// Column number, starting at 1
    pub column: u32,
}

impl Position {
    /// Create a position, clamping zero components to 1
    #[must_use]
    pub fn new(line: u32, column: u32) -> Self {
        Self {
            line: line.max(1),
            column: column.max(1),
        }
    }

    /// Zero-based line index, as used by line tables
    #[must_use]
    pub fn line_index(&self) -> usize {
        self.line.saturating_sub(1) as usize
    }

    /// Zero-based column offset within the line
    #[must_use]
    pub fn column_offset(&self) -> usize {
        self.column.saturating_sub(1) as usize
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(3, 14).to_string(), "3:14");
    }

    #[test]
    fn test_position_clamps_to_one() {
        let pos = Position::new(0, 0);
        assert_eq!(pos, Position::default());
        assert_eq!(pos.line_index(), 0);
        assert_eq!(pos.column_offset(), 0);
    }

    #[test]
    fn test_zero_literal_indexes_first_cell() {
        let pos = Position { line: 0, column: 0 };
        assert_eq!(pos.line_index(), 0);
        assert_eq!(pos.column_offset(), 0);
    }

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 9) < Position::new(2, 1));
        assert!(Position::new(2, 1) < Position::new(2, 3));
    }
}
