//! Point-anchored diagnostics.
//!
//! Diagnostics (errors/warnings/hints) are client payloads for the
//! [`AnchorRegistry`](crate::AnchorRegistry): each one is bound to the (line, column)
//! point it annotates and shifts with the document under edits. Renderers can use this
//! for problems panels, gutter markers and hover tooltips.

use crate::anchors::Anchored;
use crate::indexer::Position;

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// Error diagnostics.
    Error,
    /// Warning diagnostics.
    Warning,
    /// Informational diagnostics.
    Information,
    /// Hint diagnostics.
    Hint,
}

/// A single diagnostic item anchored to a document point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The anchor point.
    pub position: Position,
    /// Optional diagnostic severity.
    pub severity: Option<DiagnosticSeverity>,
    /// Optional diagnostic code (stringified).
    pub code: Option<String>,
    /// Optional diagnostic source (e.g. `"rust-analyzer"`).
    pub source: Option<String>,
    /// Diagnostic message.
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic with just a position and a message.
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            severity: None,
            code: None,
            source: None,
            message: message.into(),
        }
    }

    /// Set the severity.
    pub fn with_severity(mut self, severity: DiagnosticSeverity) -> Self {
        self.severity = Some(severity);
        self
    }
}

impl Anchored for Diagnostic {
    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}
