//! Ordered child sequences and content comparison.

use std::fmt;

use crate::node::Node;

/// An ordered sequence of sibling nodes with a cached total size.
///
/// Adjacent text nodes with the same marks are always joined and empty text
/// nodes are dropped, so equal content has exactly one representation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    nodes: Vec<Node>,
    size: usize,
}

impl Fragment {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a fragment, normalizing adjacent text.
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut joined: Vec<Node> = Vec::new();
        for node in nodes {
            push_joined(&mut joined, node);
        }
        let size = joined.iter().map(Node::node_size).sum();
        Self {
            nodes: joined,
            size,
        }
    }

    pub fn from_node(node: Node) -> Self {
        Self::from_nodes([node])
    }

    /// Total size of the content in position units.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn child_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn child(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Find the child index at `pos` and the offset where that child starts.
    ///
    /// A position exactly between two children resolves to the later one.
    /// Positions at or past the end resolve to `(child_count, size)`.
    pub fn find_index(&self, pos: usize) -> (usize, usize) {
        if pos == 0 {
            return (0, 0);
        }
        if pos >= self.size {
            return (self.nodes.len(), self.size);
        }
        let mut cur = 0;
        for (i, child) in self.nodes.iter().enumerate() {
            let end = cur + child.node_size();
            if end >= pos {
                if end == pos {
                    return (i + 1, end);
                }
                return (i, cur);
            }
            cur = end;
        }
        (self.nodes.len(), self.size)
    }

    /// The child starting at or containing `pos`, with its index and start.
    pub fn child_after(&self, pos: usize) -> (Option<&Node>, usize, usize) {
        let (index, offset) = self.find_index(pos);
        (self.maybe_child(index), index, offset)
    }

    /// The child ending at or containing `pos`, with its index and start.
    pub fn child_before(&self, pos: usize) -> (Option<&Node>, usize, usize) {
        if pos == 0 {
            return (None, 0, 0);
        }
        let (index, offset) = self.find_index(pos);
        if offset < pos {
            return (self.maybe_child(index), index, offset);
        }
        match index.checked_sub(1).and_then(|i| self.maybe_child(i)) {
            Some(node) => (Some(node), index - 1, offset - node.node_size()),
            None => (None, 0, 0),
        }
    }

    /// The content between two offsets, cutting partially covered children.
    pub fn cut(&self, from: usize, to: usize) -> Fragment {
        if from == 0 && to >= self.size {
            return self.clone();
        }
        let mut result = Vec::new();
        if to > from {
            let mut pos = 0;
            for child in &self.nodes {
                if pos >= to {
                    break;
                }
                let end = pos + child.node_size();
                if end > from {
                    let piece = if pos < from || end > to {
                        if child.is_text() {
                            child.cut(from.saturating_sub(pos), (to - pos).min(child.node_size()))
                        } else {
                            child.cut(
                                from.saturating_sub(pos + 1),
                                (to - pos - 1).min(child.content().size()),
                            )
                        }
                    } else {
                        child.clone()
                    };
                    result.push(piece);
                }
                pos = end;
            }
        }
        Fragment::from_nodes(result)
    }

    /// Concatenate two fragments, joining text at the seam.
    pub fn append(&self, other: &Fragment) -> Fragment {
        if other.nodes.is_empty() {
            return self.clone();
        }
        if self.nodes.is_empty() {
            return other.clone();
        }
        Fragment::from_nodes(self.nodes.iter().chain(other.nodes.iter()).cloned())
    }

    /// Copy with the child at `index` replaced.
    pub fn replace_child(&self, index: usize, node: Node) -> Fragment {
        let mut nodes = self.nodes.clone();
        nodes[index] = node;
        Fragment::from_nodes(nodes)
    }

    /// Visit nodes overlapping `[from, to)`. `node_start` is the absolute
    /// position of this fragment's start.
    pub fn nodes_between<F>(&self, from: usize, to: usize, f: &mut F, node_start: usize)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        let mut pos = 0;
        for child in &self.nodes {
            if pos >= to {
                break;
            }
            let end = pos + child.node_size();
            if end > from && f(child, node_start + pos) && child.content().size() > 0 {
                let start = pos + 1;
                child.content().nodes_between(
                    from.saturating_sub(start),
                    (to - start).min(child.content().size()),
                    f,
                    node_start + start,
                );
            }
            pos = end;
        }
    }

    /// First position, scanning from the left, where this fragment and
    /// `other` differ. `None` when they are equal.
    pub fn find_diff_start(&self, other: &Fragment, mut pos: usize) -> Option<usize> {
        for i in 0.. {
            if i == self.child_count() || i == other.child_count() {
                return if self.child_count() == other.child_count() {
                    None
                } else {
                    Some(pos)
                };
            }
            let (a, b) = (self.child(i), other.child(i));
            if a == b {
                pos += a.node_size();
                continue;
            }
            if !a.same_markup(b) {
                return Some(pos);
            }
            if let (Some(ta), Some(tb)) = (a.text_str(), b.text_str()) {
                if ta != tb {
                    let same = ta
                        .chars()
                        .zip(tb.chars())
                        .take_while(|(x, y)| x == y)
                        .count();
                    return Some(pos + same);
                }
            }
            if a.content().size() > 0 || b.content().size() > 0 {
                if let Some(inner) = a.content().find_diff_start(b.content(), pos + 1) {
                    return Some(inner);
                }
            }
            pos += a.node_size();
        }
        None
    }

    /// First positions, scanning from the right, where this fragment and
    /// `other` differ. `pos_a` and `pos_b` are the end positions of each
    /// fragment. `None` when they are equal.
    pub fn find_diff_end(
        &self,
        other: &Fragment,
        mut pos_a: usize,
        mut pos_b: usize,
    ) -> Option<(usize, usize)> {
        let mut ia = self.child_count();
        let mut ib = other.child_count();
        loop {
            if ia == 0 || ib == 0 {
                return if ia == ib { None } else { Some((pos_a, pos_b)) };
            }
            ia -= 1;
            ib -= 1;
            let (a, b) = (self.child(ia), other.child(ib));
            let size = a.node_size();
            if a == b {
                pos_a -= size;
                pos_b -= size;
                continue;
            }
            if !a.same_markup(b) {
                return Some((pos_a, pos_b));
            }
            if let (Some(ta), Some(tb)) = (a.text_str(), b.text_str()) {
                if ta != tb {
                    let same = ta
                        .chars()
                        .rev()
                        .zip(tb.chars().rev())
                        .take_while(|(x, y)| x == y)
                        .count();
                    return Some((pos_a - same, pos_b - same));
                }
            }
            if a.content().size() > 0 || b.content().size() > 0 {
                if let Some(inner) =
                    a.content()
                        .find_diff_end(b.content(), pos_a - 1, pos_b - 1)
                {
                    return Some(inner);
                }
            }
            pos_a -= size;
            pos_b -= b.node_size();
        }
    }
}

fn push_joined(target: &mut Vec<Node>, node: Node) {
    if node.is_text() && node.node_size() == 0 {
        return;
    }
    if let Some(last) = target.last_mut() {
        if node.is_text() && last.is_text() && last.same_markup(&node) {
            let mut text = String::from(last.text_str().unwrap_or_default());
            text.push_str(node.text_str().unwrap_or_default());
            *last = last.with_text(text);
            return;
        }
    }
    target.push(node);
}

impl From<Node> for Fragment {
    fn from(node: Node) -> Self {
        Fragment::from_node(node)
    }
}

impl From<Vec<Node>> for Fragment {
    fn from(nodes: Vec<Node>) -> Self {
        Fragment::from_nodes(nodes)
    }
}

impl<const N: usize> From<[Node; N]> for Fragment {
    fn from(nodes: [Node; N]) -> Self {
        Fragment::from_nodes(nodes)
    }
}

impl FromIterator<Node> for Fragment {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Fragment::from_nodes(iter)
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.nodes.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::{blockquote, doc, p, text};
    use crate::mark::{Mark, MarkSet};

    #[test]
    fn test_adjacent_text_joined() {
        let frag = Fragment::from_nodes([text("ab"), text("cd"), text("")]);
        assert_eq!(frag.child_count(), 1);
        assert_eq!(frag.child(0).text_str(), Some("abcd"));

        let strong = MarkSet::from_marks([Mark::new("strong")]);
        let frag = Fragment::from_nodes([text("ab"), Node::text("cd", strong)]);
        assert_eq!(frag.child_count(), 2);
    }

    #[test]
    fn test_find_index() {
        let frag = Fragment::from_nodes([p("ab"), p("cd")]);
        assert_eq!(frag.find_index(0), (0, 0));
        assert_eq!(frag.find_index(2), (0, 0));
        assert_eq!(frag.find_index(4), (1, 4));
        assert_eq!(frag.find_index(8), (2, 8));
    }

    #[test]
    fn test_child_before_after() {
        let para = p("ab");
        let content = para.content();
        let (node, index, offset) = content.child_after(1);
        assert_eq!(node.and_then(|n| n.text_str()), Some("ab"));
        assert_eq!((index, offset), (0, 0));
        let (node, index, offset) = content.child_before(2);
        assert!(node.is_some());
        assert_eq!((index, offset), (0, 0));
        assert!(content.child_before(0).0.is_none());
    }

    #[test]
    fn test_cut_nested() {
        let frag = doc([blockquote([p("abc")])]).content().clone();
        // Position 3 is after "a", 5 after "c".
        let cut = frag.cut(3, 5);
        assert_eq!(format!("{cut:?}"), "[blockquote(paragraph(\"bc\"))]");
    }

    #[test]
    fn test_diff_start_text() {
        let a = Fragment::from_nodes([p("hello")]);
        let b = Fragment::from_nodes([p("help")]);
        assert_eq!(a.find_diff_start(&b, 0), Some(4));
        assert_eq!(a.find_diff_start(&a.clone(), 0), None);
    }

    #[test]
    fn test_diff_start_extra_child() {
        let a = Fragment::from_nodes([p("a")]);
        let b = Fragment::from_nodes([p("a"), p("b")]);
        assert_eq!(a.find_diff_start(&b, 10), Some(13));
    }

    #[test]
    fn test_diff_end_text() {
        let a = Fragment::from_nodes([p("hello")]);
        let b = Fragment::from_nodes([p("jello")]);
        assert_eq!(a.find_diff_end(&b, a.size(), b.size()), Some((2, 2)));
    }

    #[test]
    fn test_diff_end_join() {
        let a = Fragment::from_nodes([p("ab"), p("cd")]);
        let b = Fragment::from_nodes([p("abcd")]);
        assert_eq!(a.find_diff_end(&b, a.size(), b.size()), Some((5, 3)));
    }

    #[test]
    fn test_diff_markup_change() {
        let strong = MarkSet::from_marks([Mark::new("strong")]);
        let a = Fragment::from_nodes([text("ab")]);
        let b = Fragment::from_nodes([Node::text("ab", strong)]);
        assert_eq!(a.find_diff_start(&b, 0), Some(0));
        assert_eq!(a.find_diff_end(&b, 2, 2), Some((2, 2)));
    }
}
