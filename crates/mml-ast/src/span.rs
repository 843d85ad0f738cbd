//! Source positions and half-open spans.
//!
//! Points are 1-based line/column pairs, matching what editors display.
//! A span whose coordinates are all zero marks a synthesized node that has
//! no home in the source text.

use serde::Serialize;

/// 1-based position in a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SrcPoint {
    pub line: u32,
    pub col: u32,
}

impl SrcPoint {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    pub fn is_valid(&self) -> bool {
        self.line >= 1 && self.col >= 1
    }
}

impl std::fmt::Display for SrcPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Half-open source range: `end` is the first column *not* covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SrcSpan {
    pub start: SrcPoint,
    pub end: SrcPoint,
}

impl SrcSpan {
    pub fn new(start: SrcPoint, end: SrcPoint) -> Self {
        Self { start, end }
    }

    /// Span for a node that was synthesized rather than parsed.
    pub fn synthetic() -> Self {
        Self {
            start: SrcPoint::new(0, 0),
            end: SrcPoint::new(0, 0),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.start.is_valid() && self.end.is_valid()
    }

    /// Smallest span covering both operands. Synthetic spans are absorbing
    /// on the side they appear: merging with one returns the other.
    pub fn merge(self, other: SrcSpan) -> SrcSpan {
        if !self.is_valid() {
            return other;
        }
        if !other.is_valid() {
            return self;
        }
        SrcSpan {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl std::fmt::Display for SrcSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Whether a node was parsed from source or synthesized by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceOrigin {
    #[default]
    Source,
    Synth,
}
