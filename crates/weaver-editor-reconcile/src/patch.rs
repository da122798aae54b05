//! Turning a parsed surface change into a transaction.
//!
//! Everything is computed against the session's start snapshot (the
//! document the surface represents) and then remapped through whatever
//! the host applied since, so the transaction targets the current document.

use weaver_editor_model::{
    Assoc, EditorState, MarkSet, Mapping, Node, SearchDir, Selection, Transaction,
    find_text_position,
};

use crate::config::ReconcileConfig;
use crate::diff::{Change, find_diff};
use crate::dirty::mark_changed_span;
use crate::error::ReconcileError;
use crate::host::{KeyEvent, ReconcileHost};
use crate::range::{DocRange, ParsedRegion, changed_range, parse_region, resolve_region};
use crate::surface::Surface;

/// What a reconciliation pass did.
#[derive(Clone, Debug)]
pub enum ReconcileOutcome {
    /// The surface already matched the document.
    NoChange,
    /// A key or text-input hook consumed the change.
    HandledByHost,
    /// A transaction was emitted to the host.
    Transaction(Transaction),
}

impl ReconcileOutcome {
    pub fn transaction(&self) -> Option<&Transaction> {
        match self {
            ReconcileOutcome::Transaction(tr) => Some(tr),
            _ => None,
        }
    }
}

/// Read the surface back over `range` (or around the snapshot selection)
/// and emit the change to the host.
pub fn reconcile<S, H>(
    surface: &mut S,
    host: &mut H,
    config: &ReconcileConfig,
    snapshot: &EditorState,
    range: Option<DocRange>,
    mapping: &Mapping,
) -> Result<ReconcileOutcome, ReconcileError>
where
    S: Surface + ?Sized,
    H: ReconcileHost<S> + ?Sized,
{
    let doc = &snapshot.doc;
    let range = changed_range(doc, range, snapshot.selection)?;
    let region = resolve_region(&*surface, doc, range)?;
    let parsed = parse_region(&*surface, host.parser(), doc, &region)?;

    let compare = doc.slice(parsed.range.from, parsed.range.to)?;
    let Some(change) = find_diff(
        &compare.content,
        parsed.doc.content(),
        parsed.range.from,
        snapshot.selection.head,
    ) else {
        tracing::trace!(range = ?parsed.range, "reconcile: no change");
        return Ok(ReconcileOutcome::NoChange);
    };

    mark_changed_span(surface, doc, &change)?;
    apply_change::<S, H>(host, config, &change, &parsed, mapping)
}

/// Build and emit the transaction for a diffed change.
pub fn apply_change<S, H>(
    host: &mut H,
    config: &ReconcileConfig,
    change: &Change,
    parsed: &ParsedRegion,
    mapping: &Mapping,
) -> Result<ReconcileOutcome, ReconcileError>
where
    S: Surface + ?Sized,
    H: ReconcileHost<S> + ?Sized,
{
    let base = parsed.range.from;
    let rfrom = parsed.doc.resolve(change.start - base)?;
    let rto = parsed.doc.resolve(change.end_b - base)?;

    if config.enter_heuristic
        && !rfrom.same_parent(&rto)
        && rfrom.pos() < parsed.doc.content().size()
        && find_text_position(&parsed.doc, rfrom.pos() + 1, SearchDir::Forward)
            == Some(rto.pos())
    {
        tracing::trace!(?change, "apply_change: looks like a block split, offering Enter");
        if host.handle_key(&KeyEvent::enter()) {
            return Ok(ReconcileOutcome::HandledByHost);
        }
    }

    let from = mapping.map(change.start, Assoc::After);
    let to = mapping.map(change.end_a, Assoc::After);
    let selection = parsed.selection.map(|sel| {
        Selection::new(
            mapping.map(sel.anchor, Assoc::After),
            mapping.map(sel.head, Assoc::After),
        )
    });

    let state = host.state();
    let mut tr = Transaction::new(state.doc);
    let uniform = if rfrom.same_parent(&rto) && rfrom.parent().is_textblock() {
        uniform_text_between(&parsed.doc, rfrom.pos(), rto.pos())
    } else {
        None
    };
    match uniform {
        Some((text, marks)) => {
            tracing::trace!(from, to, text = %text, "apply_change: text input");
            if host.handle_text_input(from, to, &text) {
                return Ok(ReconcileOutcome::HandledByHost);
            }
            tr.insert_text(text, from, to, &marks)?;
        }
        None => {
            let slice = parsed.doc.slice(change.start - base, change.end_b - base)?;
            tracing::trace!(from, to, size = slice.size(), "apply_change: structural replace");
            tr.replace(from, to, slice)?;
        }
    }

    if let Some(sel) = selection {
        tr.set_selection(Selection::between(tr.doc(), sel.anchor, sel.head));
    }
    if config.scroll_into_view {
        tr.scroll_into_view();
    }
    host.on_transaction(&tr, config.scroll_into_view);
    Ok(ReconcileOutcome::Transaction(tr))
}

/// The text between `from` and `to` in `node`, if that span holds only
/// text under a single mark set.
pub fn uniform_text_between(node: &Node, from: usize, to: usize) -> Option<(String, MarkSet)> {
    let mut result = String::new();
    let mut valid = true;
    let mut marks: Option<MarkSet> = None;
    node.nodes_between(from, to, &mut |child, pos| {
        if !child.is_inline() && pos < from {
            return true;
        }
        let Some(text) = child.text_str() else {
            valid = false;
            return false;
        };
        if marks.get_or_insert_with(|| child.marks().clone()) != child.marks() {
            valid = false;
        }
        let skip = from.saturating_sub(pos);
        let take = (to - pos).saturating_sub(skip);
        result.extend(text.chars().skip(skip).take(take));
        false
    });
    valid.then(|| (result, marks.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use weaver_editor_model::basic::{doc, hard_break, p, paragraph, text};
    use weaver_editor_model::{Mark, Node};

    #[test]
    fn test_uniform_text_plain() {
        // 0 <p> 1 hello 6 </p> 7
        let d = doc([p("hello")]);
        assert_eq!(
            uniform_text_between(&d, 2, 5),
            Some(("ell".to_string(), MarkSet::none()))
        );
        assert_eq!(
            uniform_text_between(&d, 3, 3),
            Some((String::new(), MarkSet::none()))
        );
    }

    #[test]
    fn test_uniform_text_rejects_mixed_marks() {
        let strong = MarkSet::from_marks([Mark::new("strong")]);
        let d = doc([paragraph([text("ab"), Node::text("cd", strong.clone())])]);
        assert_eq!(uniform_text_between(&d, 2, 5), None);
        assert_eq!(
            uniform_text_between(&d, 3, 5),
            Some(("cd".to_string(), strong))
        );
    }

    #[test]
    fn test_uniform_text_rejects_atoms() {
        let d = doc([paragraph([text("a"), hard_break(), text("b")])]);
        assert_eq!(uniform_text_between(&d, 1, 4), None);
    }
}
