//! Point-anchored style overrides.
//!
//! A [`StylePatch`] overrides rendering styles for a run of characters starting at its
//! anchor point. Patches are the third payload kind of the
//! [`AnchorRegistry`](crate::AnchorRegistry); the shift algebra is identical to the
//! one used for diagnostics and decorations.

use crate::anchors::Anchored;
use crate::indexer::Position;

/// Style ID type. The mapping to concrete colors/attributes is host-defined.
pub type StyleId = u32;

/// A style override covering `length` characters from its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylePatch {
    /// The anchor point (start of the styled run).
    pub position: Position,
    /// Run length in characters, on the anchor's line.
    pub length: usize,
    /// The style to apply.
    pub style_id: StyleId,
}

impl StylePatch {
    /// Create a style patch.
    pub fn new(position: Position, length: usize, style_id: StyleId) -> Self {
        Self {
            position,
            length,
            style_id,
        }
    }
}

impl Anchored for StylePatch {
    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}
