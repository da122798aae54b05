//! Transactions: ordered replace steps applied atomically to a snapshot.

use smol_str::SmolStr;

use crate::error::ModelError;
use crate::fragment::Fragment;
use crate::mapping::{Mapping, StepMap};
use crate::mark::MarkSet;
use crate::node::Node;
use crate::selection::Selection;
use crate::slice::Slice;

/// Replace the range `from..to` with a slice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplaceStep {
    pub from: usize,
    pub to: usize,
    pub slice: Slice,
}

impl ReplaceStep {
    pub fn new(from: usize, to: usize, slice: Slice) -> Self {
        Self { from, to, slice }
    }

    /// Apply this step to a document, producing the new document.
    pub fn apply(&self, doc: &Node) -> Result<Node, ModelError> {
        doc.replace(self.from, self.to, &self.slice)
    }

    /// How this step moves positions.
    pub fn step_map(&self) -> StepMap {
        StepMap::replace(self.from, self.to - self.from, self.slice.size())
    }
}

/// A group of steps built against one document snapshot.
///
/// Each step is applied as soon as it is added, so `doc()` always reflects
/// every step so far. Nothing is committed until the host applies the
/// transaction.
#[derive(Clone, Debug)]
pub struct Transaction {
    before: Node,
    doc: Node,
    steps: Vec<ReplaceStep>,
    mapping: Mapping,
    selection: Option<Selection>,
    scroll_into_view: bool,
}

impl Transaction {
    /// Start a transaction against `doc`.
    pub fn new(doc: Node) -> Self {
        Self {
            before: doc.clone(),
            doc,
            steps: Vec::new(),
            mapping: Mapping::new(),
            selection: None,
            scroll_into_view: false,
        }
    }

    /// The document the transaction started from.
    pub fn doc_before(&self) -> &Node {
        &self.before
    }

    /// The document with all steps applied.
    pub fn doc(&self) -> &Node {
        &self.doc
    }

    pub fn steps(&self) -> &[ReplaceStep] {
        &self.steps
    }

    /// Mapping from `doc_before()` positions to `doc()` positions.
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn scrolled_into_view(&self) -> bool {
        self.scroll_into_view
    }

    /// Apply a step and record it.
    pub fn step(&mut self, step: ReplaceStep) -> Result<&mut Self, ModelError> {
        let doc = step.apply(&self.doc)?;
        tracing::trace!(from = step.from, to = step.to, "transaction: applied replace step");
        self.mapping.append_map(step.step_map());
        self.steps.push(step);
        self.doc = doc;
        Ok(self)
    }

    /// Replace `from..to` with a slice. Replacing nothing with nothing is a
    /// no-op.
    pub fn replace(&mut self, from: usize, to: usize, slice: Slice) -> Result<&mut Self, ModelError> {
        if from == to && slice.size() == 0 {
            return Ok(self);
        }
        self.step(ReplaceStep::new(from, to, slice))
    }

    pub fn delete(&mut self, from: usize, to: usize) -> Result<&mut Self, ModelError> {
        self.replace(from, to, Slice::empty())
    }

    /// Replace `from..to` with plain text carrying `marks`. Empty text
    /// deletes the range.
    pub fn insert_text(
        &mut self,
        text: impl Into<SmolStr>,
        from: usize,
        to: usize,
        marks: &MarkSet,
    ) -> Result<&mut Self, ModelError> {
        let text = text.into();
        if text.is_empty() {
            return self.delete(from, to);
        }
        let node = Node::text(text, marks.clone());
        self.replace(from, to, Slice::new(Fragment::from_node(node), 0, 0))
    }

    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = Some(selection);
        self
    }

    pub fn scroll_into_view(&mut self) -> &mut Self {
        self.scroll_into_view = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::{doc, p};
    use crate::mapping::Assoc;
    use crate::mark::Mark;

    #[test]
    fn test_insert_text_and_mapping() {
        let mut tr = Transaction::new(doc([p("hello")]));
        tr.insert_text("XX", 1, 1, &MarkSet::none()).unwrap();
        assert_eq!(tr.doc(), &doc([p("XXhello")]));
        assert_eq!(tr.mapping().map(6, Assoc::After), 8);
        assert!(tr.doc_changed());
        assert_eq!(tr.doc_before(), &doc([p("hello")]));
    }

    #[test]
    fn test_insert_marked_text() {
        let strong = MarkSet::from_marks([Mark::new("strong")]);
        let mut tr = Transaction::new(doc([p("ab")]));
        tr.insert_text("X", 2, 2, &strong).unwrap();
        let para = tr.doc().child(0);
        assert_eq!(para.child_count(), 3);
        assert_eq!(para.child(1).marks(), &strong);
    }

    #[test]
    fn test_empty_text_deletes() {
        let mut tr = Transaction::new(doc([p("abc")]));
        tr.insert_text("", 2, 3, &MarkSet::none()).unwrap();
        assert_eq!(tr.doc(), &doc([p("ac")]));
    }

    #[test]
    fn test_noop_replace_has_no_steps() {
        let mut tr = Transaction::new(doc([p("abc")]));
        tr.replace(2, 2, Slice::empty()).unwrap();
        assert!(!tr.doc_changed());
    }

    #[test]
    fn test_failed_step_leaves_doc() {
        let mut tr = Transaction::new(doc([p("abc")]));
        assert!(tr.delete(2, 40).is_err());
        assert!(!tr.doc_changed());
        assert_eq!(tr.doc(), &doc([p("abc")]));
    }

    #[test]
    fn test_selection_and_scroll() {
        let mut tr = Transaction::new(doc([p("abc")]));
        tr.set_selection(Selection::collapsed(2)).scroll_into_view();
        assert_eq!(tr.selection(), Some(Selection::collapsed(2)));
        assert!(tr.scrolled_into_view());
    }
}
