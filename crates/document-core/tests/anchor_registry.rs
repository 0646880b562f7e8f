use std::sync::{Arc, Mutex};

use document_core::{
    AnchorRegistry, Anchored, ChangeKind, Decoration, DecorationKind, Diagnostic,
    DiagnosticSeverity, Document, Position, StylePatch, TextChange,
};

/// Wire a registry to a document: every reported change span is replayed into the
/// registry in the same transaction.
fn drive<T: Anchored + Send + 'static>(
    doc: &mut Document,
    registry: Arc<Mutex<AnchorRegistry<T>>>,
) {
    doc.subscribe(move |change: &TextChange| {
        let mut registry = registry.lock().unwrap();
        match change.kind {
            ChangeKind::Insert => registry.update_on_insertion(change.start, change.after_end),
            ChangeKind::Delete => registry.update_on_deletion(change.start, change.before_end),
        }
    });
}

fn positions<T: Anchored>(registry: &AnchorRegistry<T>) -> Vec<Position> {
    registry.iter().map(|entry| entry.position()).collect()
}

#[test]
fn test_diagnostics_shift_under_insertion() {
    let mut doc = Document::from_text("fn main() {\n    let x = 1;\n}");
    let diagnostics = Arc::new(Mutex::new(AnchorRegistry::new()));
    diagnostics
        .lock()
        .unwrap()
        .add(Diagnostic::new(Position::new(1, 8), "unused variable `x`"));
    drive(&mut doc, diagnostics.clone());

    // Typing a full line above shifts the diagnostic down one line.
    doc.insert(0, 11, "\n    // intro").unwrap();
    assert_eq!(
        positions(&diagnostics.lock().unwrap()),
        vec![Position::new(2, 8)]
    );

    // Typing earlier on the diagnostic's own line shifts its column.
    doc.insert(2, 4, "pub ").unwrap();
    assert_eq!(
        positions(&diagnostics.lock().unwrap()),
        vec![Position::new(2, 12)]
    );
}

#[test]
fn test_diagnostics_inside_deleted_span_disappear() {
    let mut doc = Document::from_text("aaa\nbbb\nccc\nddd");
    let diagnostics = Arc::new(Mutex::new(AnchorRegistry::new()));
    {
        let mut reg = diagnostics.lock().unwrap();
        reg.add(Diagnostic::new(Position::new(0, 1), "keep-before"));
        reg.add(Diagnostic::new(Position::new(1, 2), "doomed"));
        reg.add(Diagnostic::new(Position::new(3, 1), "keep-after"));
    }
    drive(&mut doc, diagnostics.clone());

    doc.delete(1, 0, 2, 3).unwrap();

    let reg = diagnostics.lock().unwrap();
    assert_eq!(reg.len(), 2);
    let messages: Vec<&str> = reg.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["keep-before", "keep-after"]);
    // The trailing diagnostic moved up by the removed line span.
    assert_eq!(reg.get_for_line(2)[0].position, Position::new(2, 1));
}

#[test]
fn test_diagnostic_at_deletion_end_collapses_to_start() {
    let mut doc = Document::from_text("head\nmiddle\ntail");
    let diagnostics = Arc::new(Mutex::new(AnchorRegistry::new()));
    diagnostics.lock().unwrap().add(
        Diagnostic::new(Position::new(2, 2), "survivor").with_severity(DiagnosticSeverity::Hint),
    );
    drive(&mut doc, diagnostics.clone());

    doc.delete(0, 4, 2, 2).unwrap();
    assert_eq!(doc.to_string(), "headil");

    let reg = diagnostics.lock().unwrap();
    assert_eq!(positions(&reg), vec![Position::new(0, 4)]);
    assert_eq!(
        reg.iter().next().unwrap().severity,
        Some(DiagnosticSeverity::Hint)
    );
}

#[test]
fn test_inlay_hints_follow_replaced_text() {
    let mut doc = Document::from_text("let count = compute();");
    let hints = Arc::new(Mutex::new(AnchorRegistry::new()));
    hints
        .lock()
        .unwrap()
        .add(Decoration::inlay_hint(Position::new(0, 9), ": usize"));
    drive(&mut doc, hints.clone());

    // Rename `let` to `const`: replace emits Delete then Insert, and the hint rides
    // both shifts.
    doc.replace(0, 0, 0, 3, "const").unwrap();
    assert_eq!(doc.to_string(), "const count = compute();");

    let reg = hints.lock().unwrap();
    assert_eq!(positions(&reg), vec![Position::new(0, 11)]);
    assert_eq!(reg.iter().next().unwrap().kind, DecorationKind::InlayHint);
}

#[test]
fn test_style_patches_shift_and_stay_sorted() {
    let mut doc = Document::from_text("fn main() {}\nfn other() {}");
    let styles = Arc::new(Mutex::new(AnchorRegistry::new()));
    {
        let mut reg = styles.lock().unwrap();
        reg.add(StylePatch::new(Position::new(0, 0), 2, 1)); // `fn`
        reg.add(StylePatch::new(Position::new(0, 3), 4, 2)); // `main`
        reg.add(StylePatch::new(Position::new(1, 3), 5, 2)); // `other`
    }
    drive(&mut doc, styles.clone());

    doc.insert(0, 0, "// header\n").unwrap();
    doc.insert(1, 3, "the_").unwrap();

    let reg = styles.lock().unwrap();
    assert_eq!(
        positions(&reg),
        vec![
            Position::new(1, 0),
            Position::new(1, 7),
            Position::new(2, 3)
        ]
    );
    let sorted_check: Vec<Position> = {
        let mut v = positions(&reg);
        v.sort();
        v
    };
    assert_eq!(positions(&reg), sorted_check);
}

#[test]
fn test_anchor_positions_stay_addressable() {
    let mut doc = Document::from_text("alpha\nbeta\ngamma\ndelta");
    let diagnostics = Arc::new(Mutex::new(AnchorRegistry::new()));
    {
        let mut reg = diagnostics.lock().unwrap();
        reg.add(Diagnostic::new(Position::new(0, 2), "a"));
        reg.add(Diagnostic::new(Position::new(1, 4), "b"));
        reg.add(Diagnostic::new(Position::new(3, 0), "c"));
    }
    drive(&mut doc, diagnostics.clone());

    doc.insert(0, 0, "intro\n").unwrap();
    doc.delete(2, 1, 3, 2).unwrap();
    doc.insert(1, 3, "X\nY").unwrap();
    doc.delete(0, 0, 1, 0).unwrap();

    // Whatever survived must still point at a real coordinate.
    let reg = diagnostics.lock().unwrap();
    for diagnostic in reg.iter() {
        let p = diagnostic.position;
        assert!(p.line < doc.line_count(), "dangling line {p:?}");
        assert!(
            p.column <= doc.line_length(p.line).unwrap(),
            "dangling column {p:?}"
        );
    }
}
