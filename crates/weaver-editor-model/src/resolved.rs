//! Resolved positions.
//!
//! A `ResolvedPos` is an absolute position together with the chain of
//! ancestors it lies in. It is only meaningful for the document snapshot it
//! was resolved against.

use crate::error::ModelError;
use crate::node::Node;

#[derive(Clone, Debug)]
struct PathStep {
    node: Node,
    /// Index of the child the position is in front of (or inside).
    index: usize,
    /// Absolute start position of that child.
    offset: usize,
}

/// A position resolved against a specific document.
#[derive(Clone, Debug)]
pub struct ResolvedPos {
    pos: usize,
    path: Vec<PathStep>,
    parent_offset: usize,
}

impl ResolvedPos {
    /// Resolve `pos` inside the content of `doc`.
    pub fn resolve(doc: &Node, pos: usize) -> Result<Self, ModelError> {
        let size = doc.content().size();
        if pos > size {
            return Err(ModelError::PositionOutOfRange { pos, size });
        }
        let mut path = Vec::new();
        let mut start = 0;
        let mut parent_offset = pos;
        let mut node = doc.clone();
        loop {
            let (index, offset) = node.content().find_index(parent_offset);
            let rem = parent_offset - offset;
            path.push(PathStep {
                node: node.clone(),
                index,
                offset: start + offset,
            });
            if rem == 0 {
                break;
            }
            let child = node.child(index).clone();
            if child.is_text() {
                break;
            }
            parent_offset = rem - 1;
            start += offset + 1;
            node = child;
        }
        Ok(Self {
            pos,
            path,
            parent_offset,
        })
    }

    /// The absolute position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Number of ancestors above the parent; 0 when directly in the root.
    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    /// Offset of the position inside its parent's content.
    pub fn parent_offset(&self) -> usize {
        self.parent_offset
    }

    /// The ancestor at `depth`. Depth 0 is the document root.
    pub fn node(&self, depth: usize) -> &Node {
        &self.path[depth].node
    }

    /// The innermost node containing the position.
    pub fn parent(&self) -> &Node {
        self.node(self.depth())
    }

    pub fn doc(&self) -> &Node {
        self.node(0)
    }

    /// Child index inside the ancestor at `depth`.
    pub fn index(&self, depth: usize) -> usize {
        self.path[depth].index
    }

    /// Child index after the position inside the ancestor at `depth`.
    pub fn index_after(&self, depth: usize) -> usize {
        let index = self.index(depth);
        if depth == self.depth() && self.text_offset() == 0 {
            index
        } else {
            index + 1
        }
    }

    /// Absolute start of the content of the ancestor at `depth`.
    pub fn start(&self, depth: usize) -> usize {
        if depth == 0 {
            0
        } else {
            self.path[depth - 1].offset + 1
        }
    }

    /// Absolute end of the content of the ancestor at `depth`.
    pub fn end(&self, depth: usize) -> usize {
        self.start(depth) + self.node(depth).content().size()
    }

    /// Position directly before the ancestor at `depth`.
    ///
    /// `depth == self.depth() + 1` yields the position itself. The root has
    /// nothing before it, so depth 0 yields the start of the document.
    pub fn before(&self, depth: usize) -> usize {
        if depth == 0 {
            0
        } else if depth == self.depth() + 1 {
            self.pos
        } else {
            self.path[depth - 1].offset
        }
    }

    /// Position directly after the ancestor at `depth`.
    ///
    /// `depth == self.depth() + 1` yields the position itself. Depth 0
    /// yields the end of the document.
    pub fn after(&self, depth: usize) -> usize {
        if depth == 0 {
            self.doc().content().size()
        } else if depth == self.depth() + 1 {
            self.pos
        } else {
            self.path[depth - 1].offset + self.node(depth).node_size()
        }
    }

    /// Offset into the text node the position points into, or 0 when the
    /// position sits between nodes.
    pub fn text_offset(&self) -> usize {
        self.pos - self.path[self.depth()].offset
    }

    /// The node directly after the position, cut if it is partially covered.
    pub fn node_after(&self) -> Option<Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        let child = parent.maybe_child(index)?;
        let d_off = self.text_offset();
        if d_off > 0 {
            Some(child.cut(d_off, child.node_size()))
        } else {
            Some(child.clone())
        }
    }

    /// The node directly before the position, cut if it is partially covered.
    pub fn node_before(&self) -> Option<Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        let d_off = self.text_offset();
        if d_off > 0 {
            return parent.maybe_child(index).map(|child| child.cut(0, d_off));
        }
        index
            .checked_sub(1)
            .and_then(|i| parent.maybe_child(i))
            .cloned()
    }

    /// Deepest depth whose ancestor contains both this position and `pos`.
    pub fn shared_depth(&self, pos: usize) -> usize {
        (1..=self.depth())
            .rev()
            .find(|&depth| self.start(depth) <= pos && self.end(depth) >= pos)
            .unwrap_or(0)
    }

    /// Whether both positions lie directly in the same parent node.
    pub fn same_parent(&self, other: &ResolvedPos) -> bool {
        self.pos - self.parent_offset == other.pos - other.parent_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::{blockquote, doc, p};

    fn sample() -> Node {
        // 0 <bq> 1 <p> 2 a 3 b 4 </p> 5 </bq> 6 <p> 7 c 8 </p> 9
        doc([blockquote([p("ab")]), p("c")])
    }

    #[test]
    fn test_resolve_depths() {
        let d = sample();
        assert_eq!(d.resolve(0).unwrap().depth(), 0);
        assert_eq!(d.resolve(1).unwrap().depth(), 1);
        let r = d.resolve(3).unwrap();
        assert_eq!(r.depth(), 2);
        assert_eq!(r.parent().name(), "paragraph");
        assert_eq!(r.parent_offset(), 1);
        assert_eq!(r.text_offset(), 1);
    }

    #[test]
    fn test_before_after_start_end() {
        let d = sample();
        let r = d.resolve(3).unwrap();
        assert_eq!(r.start(2), 2);
        assert_eq!(r.end(2), 4);
        assert_eq!(r.before(2), 1);
        assert_eq!(r.after(2), 5);
        assert_eq!(r.before(1), 0);
        assert_eq!(r.after(1), 6);
        assert_eq!(r.before(3), 3);
        assert_eq!(r.after(0), 9);
    }

    #[test]
    fn test_out_of_range() {
        let d = sample();
        assert!(matches!(
            d.resolve(10),
            Err(ModelError::PositionOutOfRange { pos: 10, size: 9 })
        ));
    }

    #[test]
    fn test_shared_depth_and_same_parent() {
        let d = sample();
        let r = d.resolve(2).unwrap();
        assert_eq!(r.shared_depth(4), 2);
        assert_eq!(r.shared_depth(5), 1);
        assert_eq!(r.shared_depth(7), 0);
        assert!(r.same_parent(&d.resolve(4).unwrap()));
        assert!(!r.same_parent(&d.resolve(7).unwrap()));
    }

    #[test]
    fn test_node_before_after() {
        let d = sample();
        let r = d.resolve(3).unwrap();
        assert_eq!(r.node_before().unwrap().text_str(), Some("a"));
        assert_eq!(r.node_after().unwrap().text_str(), Some("b"));
        let r = d.resolve(6).unwrap();
        assert_eq!(r.node_before().unwrap().name(), "blockquote");
        assert_eq!(r.node_after().unwrap().name(), "paragraph");
        assert_eq!(r.index_after(0), 1);
    }
}
