#![warn(missing_docs)]
//! Document Core - Storage and Position-Indexing Engine for Embeddable Editors
//!
//! # Overview
//!
//! `document-core` is the document layer of a headless code editor: the data structure
//! holding the edited text as an ordered sequence of lines, the bidirectional
//! translation between absolute character offsets and (line, column) coordinates, and
//! the copy-on-write snapshotting that lets a background consumer (a
//! tokenizer/analyzer) read a consistent view while the foreground keeps editing.
//! Rendering, input handling, syntax grammars and protocol plumbing are external
//! collaborators consuming this engine through its read/subscribe operations.
//!
//! # Core Features
//!
//! - **Segmented Line Storage**: edits shift only one segment, not the whole list
//! - **Cached Position Indexing**: near O(1) amortized offset ↔ (line, column) for
//!   cursor-local editing
//! - **Separator Fidelity**: LF/CR/CRLF kept per line, `to_string()` reproduces input
//! - **Copy-on-Write Forks**: line-granular sharing, concurrent-safe by construction
//! - **Anchored Overlays**: diagnostics, inlay hints and style patches that shift
//!   consistently under edits
//! - **Change Notifications**: structured before/after spans, no text diffing needed
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Document (edit API, forks, notifications)  │  ← Public API
//! ├──────────────────────┬──────────────────────┤
//! │  CachedIndexer       │  AnchorRegistry      │  ← Position Translation / Overlays
//! ├──────────────────────┴──────────────────────┤
//! │  SegmentedLineList (copy-on-write lines)    │  ← Line Access
//! ├─────────────────────────────────────────────┤
//! │  LineBuffer + LineSeparator                 │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use document_core::Document;
//!
//! let mut doc = Document::from_text("Hello");
//! doc.insert(0, 5, ", world").unwrap();
//! assert_eq!(doc.to_string(), "Hello, world");
//!
//! // Fork a snapshot for a background analyzer; edits do not leak across.
//! let snapshot = doc.copy_text_shallow().unwrap();
//! doc.insert(0, 0, ">> ").unwrap();
//! assert_eq!(snapshot.to_string(), "Hello, world");
//! assert_eq!(doc.to_string(), ">> Hello, world");
//! ```
//!
//! ## Position translation
//!
//! ```rust
//! use document_core::Document;
//!
//! let mut doc = Document::from_text("Test\r\ntext");
//! assert_eq!(doc.line_count(), 2);
//! assert_eq!(doc.char_index(1, 0).unwrap(), 6);
//! let pos = doc.char_position(6).unwrap();
//! assert_eq!((pos.line, pos.column), (1, 0));
//! ```
//!
//! # Module Description
//!
//! - [`document`] - the editable document facade
//! - [`line_list`] - segmented, copy-on-write line storage
//! - [`indexer`] - cached offset ↔ (line, column) translation
//! - [`line`] / [`separator`] - single-line storage and separator kinds
//! - [`anchors`] - generic registry of position-anchored objects
//! - [`diagnostics`] / [`decorations`] / [`styles`] - the anchored payload kinds
//! - [`change`] - structured edit notifications
//!
//! # Coordinate Conventions
//!
//! Offsets and columns count Unicode scalar values (`char`), never bytes. Separators
//! count toward offsets and the total length; a line's column range ends at its text
//! length, with the position between `'\r'` and `'\n'` of a CRLF line addressable by
//! offset so every offset round-trips.

pub mod anchors;
pub mod change;
pub mod decorations;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod indexer;
pub mod line;
pub mod line_list;
pub mod separator;
pub mod styles;

pub use anchors::{AnchorRegistry, Anchored};
pub use change::{ChangeKind, TextChange};
pub use decorations::{Decoration, DecorationKind, DecorationPlacement};
pub use diagnostics::{Diagnostic, DiagnosticSeverity};
pub use document::{Document, SubscriptionId};
pub use error::DocumentError;
pub use indexer::{CachedIndexer, CharPosition, Position, ScanDirection};
pub use line::LineBuffer;
pub use line_list::SegmentedLineList;
pub use separator::LineSeparator;
pub use styles::{StyleId, StylePatch};
