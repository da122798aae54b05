//! Document nodes.
//!
//! A `Node` is an immutable, cheaply clonable tree node. Positions inside a
//! node count one unit per character of text, one per atom, and one for
//! entering or leaving a non-leaf node.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::error::ModelError;
use crate::fragment::Fragment;
use crate::mark::MarkSet;
use crate::resolved::ResolvedPos;
use crate::slice::Slice;

/// Node and mark attributes.
pub type Attrs = BTreeMap<SmolStr, SmolStr>;

/// Structural role of a node type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Holds block children (document root, blockquote, list, ...).
    Block,
    /// Holds inline content (paragraph, heading, ...).
    Textblock,
    /// Literal text.
    Text,
    /// Inline leaf of size 1 (hard break, inline image, ...).
    InlineAtom,
    /// Block leaf of size 1 (horizontal rule, embed, ...).
    BlockAtom,
}

/// A node type: a name plus its structural role.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeType {
    pub name: SmolStr,
    pub kind: NodeKind,
}

impl NodeType {
    pub fn new(name: impl Into<SmolStr>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn block(name: impl Into<SmolStr>) -> Self {
        Self::new(name, NodeKind::Block)
    }

    pub fn textblock(name: impl Into<SmolStr>) -> Self {
        Self::new(name, NodeKind::Textblock)
    }

    pub fn text() -> Self {
        Self::new("text", NodeKind::Text)
    }

    pub fn inline_atom(name: impl Into<SmolStr>) -> Self {
        Self::new(name, NodeKind::InlineAtom)
    }

    pub fn block_atom(name: impl Into<SmolStr>) -> Self {
        Self::new(name, NodeKind::BlockAtom)
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    pub fn is_textblock(&self) -> bool {
        self.kind == NodeKind::Textblock
    }

    pub fn is_inline(&self) -> bool {
        matches!(self.kind, NodeKind::Text | NodeKind::InlineAtom)
    }

    pub fn is_block(&self) -> bool {
        !self.is_inline()
    }

    /// Leaves have no content: text and atoms.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Text | NodeKind::InlineAtom | NodeKind::BlockAtom
        )
    }

    pub fn is_atom(&self) -> bool {
        matches!(self.kind, NodeKind::InlineAtom | NodeKind::BlockAtom)
    }

    /// Whether content of `other` may be joined onto a node of this type.
    ///
    /// Without a schema, same-role containers are treated as compatible so a
    /// heading can absorb a following paragraph's text and vice versa.
    pub fn compatible_content(&self, other: &NodeType) -> bool {
        self == other
            || (self.kind == other.kind
                && matches!(self.kind, NodeKind::Block | NodeKind::Textblock))
    }
}

#[derive(PartialEq, Eq)]
struct NodeData {
    node_type: NodeType,
    attrs: Attrs,
    marks: MarkSet,
    content: Fragment,
    text: Option<SmolStr>,
    size: usize,
}

/// An immutable document node.
#[derive(Clone)]
pub struct Node(Arc<NodeData>);

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for Node {}

impl Node {
    /// Create a non-text node.
    pub fn new(node_type: NodeType, attrs: Attrs, content: Fragment, marks: MarkSet) -> Self {
        let size = match node_type.kind {
            NodeKind::InlineAtom | NodeKind::BlockAtom => 1,
            NodeKind::Text => 0,
            NodeKind::Block | NodeKind::Textblock => content.size() + 2,
        };
        Self(Arc::new(NodeData {
            node_type,
            attrs,
            marks,
            content,
            text: None,
            size,
        }))
    }

    /// Create a container node with default attributes and no marks.
    pub fn element(node_type: NodeType, content: impl Into<Fragment>) -> Self {
        Self::new(node_type, Attrs::new(), content.into(), MarkSet::none())
    }

    /// Create a leaf atom.
    pub fn atom(node_type: NodeType) -> Self {
        Self::new(node_type, Attrs::new(), Fragment::empty(), MarkSet::none())
    }

    /// Create a text node. Empty text nodes are dropped when placed in a
    /// fragment.
    pub fn text(text: impl Into<SmolStr>, marks: MarkSet) -> Self {
        let text = text.into();
        let size = text.chars().count();
        Self(Arc::new(NodeData {
            node_type: NodeType::text(),
            attrs: Attrs::new(),
            marks,
            content: Fragment::empty(),
            text: Some(text),
            size,
        }))
    }

    pub fn node_type(&self) -> &NodeType {
        &self.0.node_type
    }

    pub fn name(&self) -> &str {
        &self.0.node_type.name
    }

    pub fn attrs(&self) -> &Attrs {
        &self.0.attrs
    }

    pub fn marks(&self) -> &MarkSet {
        &self.0.marks
    }

    pub fn content(&self) -> &Fragment {
        &self.0.content
    }

    /// Literal text, for text nodes.
    pub fn text_str(&self) -> Option<&str> {
        self.0.text.as_deref()
    }

    /// Size of this node in position units.
    pub fn node_size(&self) -> usize {
        self.0.size
    }

    pub fn child_count(&self) -> usize {
        self.0.content.child_count()
    }

    pub fn child(&self, index: usize) -> &Node {
        self.0.content.child(index)
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.0.content.maybe_child(index)
    }

    pub fn is_text(&self) -> bool {
        self.0.node_type.is_text()
    }

    pub fn is_textblock(&self) -> bool {
        self.0.node_type.is_textblock()
    }

    pub fn is_inline(&self) -> bool {
        self.0.node_type.is_inline()
    }

    pub fn is_block(&self) -> bool {
        self.0.node_type.is_block()
    }

    pub fn is_leaf(&self) -> bool {
        self.0.node_type.is_leaf()
    }

    /// Same type, attributes and marks. Content is not compared.
    pub fn same_markup(&self, other: &Node) -> bool {
        self.0.node_type == other.0.node_type
            && self.0.attrs == other.0.attrs
            && self.0.marks == other.0.marks
    }

    /// Copy this node's markup around new content.
    pub fn copy(&self, content: Fragment) -> Node {
        if self.is_text() {
            return self.clone();
        }
        Node::new(
            self.0.node_type.clone(),
            self.0.attrs.clone(),
            content,
            self.0.marks.clone(),
        )
    }

    /// Copy a text node with different text.
    pub fn with_text(&self, text: impl Into<SmolStr>) -> Node {
        Node::text(text, self.0.marks.clone())
    }

    /// Cut this node down to the content between `from` and `to`, relative
    /// to its content (or its text, for text nodes).
    pub fn cut(&self, from: usize, to: usize) -> Node {
        match &self.0.text {
            Some(text) => {
                if from == 0 && to >= self.0.size {
                    return self.clone();
                }
                self.with_text(char_slice(text, from, to))
            }
            None => {
                if from == 0 && to >= self.0.content.size() {
                    return self.clone();
                }
                self.copy(self.0.content.cut(from, to))
            }
        }
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        match &self.0.text {
            Some(text) => text.to_string(),
            None => self.0.content.iter().map(|c| c.text_content()).collect(),
        }
    }

    /// Resolve a position inside this node's content.
    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos, ModelError> {
        ResolvedPos::resolve(self, pos)
    }

    /// The slice of content between two positions.
    pub fn slice(&self, from: usize, to: usize) -> Result<Slice, ModelError> {
        if from >= to {
            return Ok(Slice::empty());
        }
        let rfrom = self.resolve(from)?;
        let rto = self.resolve(to)?;
        let depth = rfrom.shared_depth(to);
        let start = rfrom.start(depth);
        let content = rfrom
            .node(depth)
            .content()
            .cut(rfrom.pos() - start, rto.pos() - start);
        Ok(Slice::new(
            content,
            rfrom.depth() - depth,
            rto.depth() - depth,
        ))
    }

    /// Visit every descendant overlapping `[from, to)`, with its absolute
    /// position. Returning `false` skips the node's children.
    pub fn nodes_between<F>(&self, from: usize, to: usize, f: &mut F)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        self.0.content.nodes_between(from, to, f, 0);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut open = 0;
        for mark in self.0.marks.iter() {
            write!(f, "{}(", mark.name)?;
            open += 1;
        }
        match &self.0.text {
            Some(text) => write!(f, "{:?}", text.as_str())?,
            None if self.0.node_type.is_atom() => write!(f, "{}", self.0.node_type.name)?,
            None => {
                write!(f, "{}(", self.0.node_type.name)?;
                for (i, child) in self.0.content.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{child:?}")?;
                }
                write!(f, ")")?;
            }
        }
        for _ in 0..open {
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Slice a string by char offsets, clamping to its length.
pub(crate) fn char_slice(text: &str, from: usize, to: usize) -> SmolStr {
    if to <= from {
        return SmolStr::default();
    }
    text.chars().skip(from).take(to - from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::{blockquote, doc, hard_break, p, text};
    use crate::mark::Mark;

    #[test]
    fn test_node_sizes() {
        let para = p("abc");
        assert_eq!(para.node_size(), 5);
        assert_eq!(text("héllo").node_size(), 5);
        assert_eq!(hard_break().node_size(), 1);
        let d = doc([blockquote([p("ab")]), p("")]);
        assert_eq!(d.content().size(), 6 + 2);
    }

    #[test]
    fn test_same_markup_ignores_content() {
        assert!(p("a").same_markup(&p("b")));
        let strong = MarkSet::from_marks([Mark::new("strong")]);
        assert!(!text("a").same_markup(&Node::text("a", strong)));
    }

    #[test]
    fn test_cut_text_by_chars() {
        let t = text("añbc");
        assert_eq!(t.cut(1, 3).text_str(), Some("ñb"));
        assert_eq!(t.cut(2, 10).text_str(), Some("bc"));
    }

    #[test]
    fn test_slice_open_depths() {
        let d = doc([p("ab"), p("cd")]);
        // From inside the first paragraph to inside the second.
        let slice = d.slice(2, 6).unwrap();
        assert_eq!(slice.open_start, 1);
        assert_eq!(slice.open_end, 1);
        assert_eq!(format!("{:?}", slice.content), "[paragraph(\"b\"), paragraph(\"c\")]");
        // Block boundaries give a closed slice.
        let slice = d.slice(0, 4).unwrap();
        assert_eq!((slice.open_start, slice.open_end), (0, 0));
        assert_eq!(slice.size(), 4);
    }

    #[test]
    fn test_debug_format() {
        let strong = MarkSet::from_marks([Mark::new("strong")]);
        let d = doc([p_marked("x", strong)]);
        assert_eq!(format!("{d:?}"), "doc(paragraph(strong(\"x\")))");
    }

    fn p_marked(s: &str, marks: MarkSet) -> Node {
        crate::basic::paragraph([Node::text(s, marks)])
    }

    #[test]
    fn test_nodes_between_positions() {
        let d = doc([p("ab"), p("cd")]);
        let mut seen = Vec::new();
        d.nodes_between(0, d.content().size(), &mut |node, pos| {
            seen.push((format!("{node:?}"), pos));
            true
        });
        assert_eq!(
            seen,
            vec![
                ("paragraph(\"ab\")".to_string(), 0),
                ("\"ab\"".to_string(), 1),
                ("paragraph(\"cd\")".to_string(), 4),
                ("\"cd\"".to_string(), 5),
            ]
        );
    }
}
