use std::fmt;

/// Represents a line/column position in a script
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Position {
    /// The position's line, counting from 0
    pub line: u32,
    /// The position's column, counting from 0
    pub column: u32,
}

impl Position {
    /// Returns the position advanced by a single column
    pub fn next_column(self) -> Self {
        Self {
            line: self.line,
            column: self.column + 1,
        }
    }

    /// Returns the position at the start of the following line
    pub fn next_line(self) -> Self {
        Self {
            line: self.line + 1,
            column: 0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span is a range in the source code, represented by a start and end position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    /// The span's start position
    pub start: Position,
    /// The span's end position
    pub end: Position,
}

impl Span {
    /// Returns a span covering the range from the start of `self` to the end of `other`
    pub fn extended_to(self, other: Span) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
