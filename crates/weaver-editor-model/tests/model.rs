//! Integration tests for the weaver document model.

use weaver_editor_model::basic::{blockquote, doc, hard_break, heading, p, paragraph, text};
use weaver_editor_model::{
    Assoc, Fragment, Mark, MarkSet, ModelError, Node, Selection, Slice, Transaction,
};

fn strong() -> MarkSet {
    MarkSet::from_marks([Mark::new("strong")])
}

// === Diff + replace agreement ===

/// Replacing the old diff window with the new one reproduces the new content.
fn assert_diff_reconstructs(old: &Node, new: &Node) {
    let a = old.content();
    let b = new.content();
    let Some(start) = a.find_diff_start(b, 0) else {
        assert_eq!(old, new);
        return;
    };
    let (mut end_a, mut end_b) = a
        .find_diff_end(b, a.size(), b.size())
        .expect("diff end exists when diff start does");
    let overlap = start.saturating_sub(end_a.min(end_b));
    end_a += overlap;
    end_b += overlap;
    let slice = new.slice(start, end_b).unwrap();
    let rebuilt = old.replace(start, end_a, &slice).unwrap();
    assert_eq!(&rebuilt, new);
}

#[test]
fn test_diff_replace_text_edit() {
    assert_diff_reconstructs(&doc([p("hello")]), &doc([p("help me")]));
}

#[test]
fn test_diff_replace_paragraph_split() {
    assert_diff_reconstructs(&doc([p("ab")]), &doc([p("a"), p("b")]));
}

#[test]
fn test_diff_replace_paragraph_join() {
    assert_diff_reconstructs(&doc([p("ab"), p("cd")]), &doc([p("abcd")]));
}

#[test]
fn test_diff_replace_mark_change() {
    let new = doc([paragraph([text("a"), Node::text("b", strong()), text("c")])]);
    assert_diff_reconstructs(&doc([p("abc")]), &new);
}

#[test]
fn test_diff_replace_nested() {
    assert_diff_reconstructs(
        &doc([blockquote([p("one")]), p("two")]),
        &doc([blockquote([p("one"), p("x")]), p("two")]),
    );
}

#[test]
fn test_diff_equal_is_none() {
    let d = doc([heading("t"), p("body")]);
    assert_eq!(d.content().find_diff_start(d.content(), 0), None);
    assert_eq!(
        d.content()
            .find_diff_end(d.content(), d.content().size(), d.content().size()),
        None
    );
}

// === Transactions ===

#[test]
fn test_transaction_mapping_tracks_steps() {
    let mut tr = Transaction::new(doc([p("hello"), p("world")]));
    tr.insert_text("XX", 1, 1, &MarkSet::none()).unwrap();
    tr.delete(10, 11).unwrap();
    assert_eq!(tr.doc(), &doc([p("XXhello"), p("orld")]));
    assert_eq!(tr.steps().len(), 2);
    // "w" was at 8 before the edits.
    let mapped = tr.mapping().map_result(9, Assoc::After);
    assert_eq!(mapped.pos, 10);
}

#[test]
fn test_transaction_structural_replace() {
    let mut tr = Transaction::new(doc([p("ab")]));
    let slice = Slice::new(Fragment::from_nodes([hard_break()]), 0, 0);
    tr.replace(2, 2, slice).unwrap();
    assert_eq!(tr.doc(), &doc([paragraph([text("a"), hard_break(), text("b")])]));
}

#[test]
fn test_out_of_range_step_errors() {
    let mut tr = Transaction::new(doc([p("ab")]));
    let err = tr.delete(1, 99).unwrap_err();
    assert!(matches!(err, ModelError::PositionOutOfRange { pos: 99, .. }));
}

// === Selection ===

#[test]
fn test_selection_between_nested() {
    // 0 <bq> 1 <p> 2 a 3 </p> 4 </bq> 5
    let d = doc([blockquote([p("a")])]);
    assert_eq!(Selection::between(&d, 0, 5), Selection::new(2, 3));
}
