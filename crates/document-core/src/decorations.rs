//! Point-anchored decorations (virtual text).
//!
//! Decorations represent UI-facing annotations anchored to document points, without
//! modifying the document text. Common examples:
//!
//! - LSP inlay hints (inline type hints)
//! - code lens (line-level virtual text)
//! - document links
//!
//! Like diagnostics, decorations live in an [`AnchorRegistry`](crate::AnchorRegistry)
//! and shift with the document under edits.

use crate::anchors::Anchored;
use crate::indexer::Position;

/// Where to render a decoration relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationPlacement {
    /// Render before the anchor (in logical order).
    Before,
    /// Render after the anchor (in logical order).
    After,
    /// Render above the anchor line (e.g. code lens).
    AboveLine,
}

/// A coarse decoration kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DecorationKind {
    /// Inline inlay hint (usually from LSP).
    InlayHint,
    /// Code lens (usually above a line).
    CodeLens,
    /// Document link (clickable).
    DocumentLink,
    /// Highlight decoration (e.g. match/bracket highlights).
    Highlight,
    /// A custom, integration-defined kind.
    Custom(u32),
}

/// A single decoration item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    /// The anchor point.
    pub position: Position,
    /// Relative placement (before/after/above).
    pub placement: DecorationPlacement,
    /// A coarse decoration kind.
    pub kind: DecorationKind,
    /// Optional virtual text to render.
    pub text: Option<String>,
    /// Optional tooltip payload (plain text; markup is host-defined).
    pub tooltip: Option<String>,
}

impl Decoration {
    /// Create an inlay hint rendered after its anchor.
    pub fn inlay_hint(position: Position, text: impl Into<String>) -> Self {
        Self {
            position,
            placement: DecorationPlacement::After,
            kind: DecorationKind::InlayHint,
            text: Some(text.into()),
            tooltip: None,
        }
    }
}

impl Anchored for Decoration {
    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}
