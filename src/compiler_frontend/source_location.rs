use crate::compiler_frontend::compiler_errors::ErrorLocation;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CharPosition {
    pub line_number: i32,
    pub char_column: i32,
}

impl CharPosition {
    pub fn new(line_number: i32, char_column: i32) -> Self {
        Self {
            line_number,
            char_column,
        }
    }
}

/// A span in the source file the IR was lowered from.
/// The file itself is carried once by the module, not by every location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextLocation {
    pub start_pos: CharPosition,
    pub end_pos: CharPosition,
}

impl TextLocation {
    pub fn new(start: CharPosition, end: CharPosition) -> Self {
        Self {
            start_pos: start,
            end_pos: end,
        }
    }

    pub fn new_just_line(start: i32) -> Self {
        Self {
            start_pos: CharPosition {
                line_number: start,
                char_column: 0,
            },
            end_pos: CharPosition {
                line_number: start,
                char_column: 120, // Arbitrary number
            },
        }
    }

    /// Collapses the span onto its closing position.
    /// Scope-exit history points here rather than at the opening of the scope.
    pub fn end_location(&self) -> Self {
        Self {
            start_pos: self.end_pos,
            end_pos: self.end_pos,
        }
    }

    pub fn to_error_location(&self, source_path: &Path) -> ErrorLocation {
        ErrorLocation {
            scope: source_path.to_path_buf(),
            start_pos: self.start_pos,
            end_pos: self.end_pos,
        }
    }
}
