//! Selections and editor state.

use serde::{Deserialize, Serialize};

use crate::node::Node;

/// Text selection with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where cursor is now
    pub head: usize,
}

impl Selection {
    /// Create a new selection.
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor position).
    pub fn collapsed(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// A selection valid in `doc`: both ends are clamped to the document
    /// and moved to the nearest position inside a textblock.
    ///
    /// Documents without any textblock keep the clamped positions.
    pub fn between(doc: &Node, anchor: usize, head: usize) -> Self {
        let size = doc.content().size();
        let snap = |pos: usize| {
            let pos = pos.min(size);
            find_text_position(doc, pos, SearchDir::Forward)
                .filter(|&found| found == pos)
                .or_else(|| find_text_position(doc, pos, SearchDir::Backward))
                .or_else(|| find_text_position(doc, pos, SearchDir::Forward))
                .unwrap_or(pos)
        };
        Self::new(snap(anchor), snap(head))
    }

    /// Lower bound of the selection.
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Upper bound of the selection.
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

}

/// Direction for [`find_text_position`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchDir {
    Forward,
    Backward,
}

/// The nearest position at or beyond `pos` (in `dir`) whose parent is a
/// textblock.
pub fn find_text_position(doc: &Node, pos: usize, dir: SearchDir) -> Option<usize> {
    let mut ranges = Vec::new();
    doc.nodes_between(0, doc.content().size(), &mut |node, start| {
        if node.is_textblock() {
            let from = start + 1;
            ranges.push(from..from + node.content().size());
            return false;
        }
        !node.is_leaf()
    });
    match dir {
        SearchDir::Forward => ranges
            .iter()
            .find(|range| range.end >= pos)
            .map(|range| pos.max(range.start)),
        SearchDir::Backward => ranges
            .iter()
            .rev()
            .find(|range| range.start <= pos)
            .map(|range| pos.min(range.end)),
    }
}

/// A document together with its selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorState {
    pub doc: Node,
    pub selection: Selection,
}

impl EditorState {
    pub fn new(doc: Node, selection: Selection) -> Self {
        Self { doc, selection }
    }

    /// State with the cursor at the first text position.
    pub fn at_start(doc: Node) -> Self {
        let pos = find_text_position(&doc, 0, SearchDir::Forward).unwrap_or(0);
        Self {
            doc,
            selection: Selection::collapsed(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::{blockquote, doc, horizontal_rule, p};

    #[test]
    fn test_selection_bounds() {
        let sel = Selection::new(7, 3);
        assert_eq!(sel.start(), 3);
        assert_eq!(sel.end(), 7);
        assert!(Selection::collapsed(2).is_collapsed());
    }

    #[test]
    fn test_find_text_position() {
        // 0 <hr> 1 <p> 2 a 3 </p> 4 <bq> 5 <p> 6 b 7 </p> 8 </bq> 9
        let d = doc([horizontal_rule(), p("a"), blockquote([p("b")])]);
        assert_eq!(find_text_position(&d, 0, SearchDir::Forward), Some(2));
        assert_eq!(find_text_position(&d, 3, SearchDir::Forward), Some(3));
        assert_eq!(find_text_position(&d, 4, SearchDir::Forward), Some(6));
        assert_eq!(find_text_position(&d, 9, SearchDir::Forward), None);
        assert_eq!(find_text_position(&d, 9, SearchDir::Backward), Some(7));
        assert_eq!(find_text_position(&d, 1, SearchDir::Backward), None);
    }

    #[test]
    fn test_between_snaps_and_clamps() {
        let d = doc([p("ab"), p("cd")]);
        assert_eq!(Selection::between(&d, 2, 2), Selection::collapsed(2));
        // Between the paragraphs snaps back into the first one.
        assert_eq!(Selection::between(&d, 4, 4), Selection::collapsed(3));
        assert_eq!(Selection::between(&d, 0, 100), Selection::new(1, 7));
    }

    #[test]
    fn test_state_at_start() {
        let state = EditorState::at_start(doc([horizontal_rule(), p("x")]));
        assert_eq!(state.selection, Selection::collapsed(2));
    }

    #[test]
    fn test_selection_serde_shape() {
        insta::assert_yaml_snapshot!(Selection::new(1, 4), @r"
        anchor: 1
        head: 4
        ");
    }
}
