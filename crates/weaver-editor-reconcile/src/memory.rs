//! Headless in-memory surface and parser.
//!
//! `MemorySurface` renders a document into an arena of surface nodes that
//! tests (or a server replaying recorded edits) can then mutate the way a
//! browser would: editing text in place, inserting nodes the renderer
//! doesn't know about, moving the selection.

use weaver_editor_model::{Attrs, Fragment, MarkSet, Node, NodeType};

use crate::range::DocRange;
use crate::surface::{
    Bias, ParseOutput, ParseRequest, ParseRule, Surface, SurfaceParser, SurfacePoint,
    SurfaceSelection,
};

/// Handle to a node in a [`MemorySurface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryNodeId(usize);

/// What a surface node holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemoryContent {
    Element {
        node_type: NodeType,
        attrs: Attrs,
        marks: MarkSet,
    },
    Text {
        text: String,
        marks: MarkSet,
    },
}

#[derive(Clone, Debug)]
struct MemoryNode {
    content: MemoryContent,
    parent: Option<MemoryNodeId>,
    children: Vec<MemoryNodeId>,
    /// Children as rendered, indexed like the model node's content. Entries
    /// stay put when the platform detaches them.
    rendered: Vec<MemoryNodeId>,
    /// Created by rendering, as opposed to by the platform.
    owned: bool,
    /// Render-only marker the parser drops.
    ignorable: bool,
}

/// Arena-backed surface tree.
#[derive(Clone, Debug)]
pub struct MemorySurface {
    nodes: Vec<MemoryNode>,
    root: MemoryNodeId,
    rendered: Node,
    selection: Option<SurfaceSelection<MemoryNodeId>>,
    dirty: Vec<DocRange>,
}

impl MemorySurface {
    /// Render `doc` into a fresh surface. Every node is owned.
    pub fn render(doc: &Node) -> Self {
        let mut surface = Self {
            nodes: Vec::new(),
            root: MemoryNodeId(0),
            rendered: doc.clone(),
            selection: None,
            dirty: Vec::new(),
        };
        surface.root = surface.build(None, doc, true);
        surface
    }

    fn build(&mut self, parent: Option<MemoryNodeId>, node: &Node, owned: bool) -> MemoryNodeId {
        let content = match node.text_str() {
            Some(text) => MemoryContent::Text {
                text: text.to_string(),
                marks: node.marks().clone(),
            },
            None => MemoryContent::Element {
                node_type: node.node_type().clone(),
                attrs: node.attrs().clone(),
                marks: node.marks().clone(),
            },
        };
        let id = MemoryNodeId(self.nodes.len());
        self.nodes.push(MemoryNode {
            content,
            parent,
            children: Vec::new(),
            rendered: Vec::new(),
            owned,
            ignorable: false,
        });
        for child in node.content().iter() {
            let child_id = self.build(Some(id), child, owned);
            self.nodes[id.0].children.push(child_id);
            if owned {
                self.nodes[id.0].rendered.push(child_id);
            }
        }
        id
    }

    /// The document this surface was rendered from.
    pub fn rendered(&self) -> &Node {
        &self.rendered
    }

    pub fn content(&self, id: MemoryNodeId) -> &MemoryContent {
        &self.nodes[id.0].content
    }

    pub fn children(&self, id: MemoryNodeId) -> &[MemoryNodeId] {
        &self.nodes[id.0].children
    }

    pub fn child(&self, id: MemoryNodeId, index: usize) -> Option<MemoryNodeId> {
        self.nodes[id.0].children.get(index).copied()
    }

    /// First attached text node (in document order) whose text is `needle`.
    pub fn find_text(&self, needle: &str) -> Option<MemoryNodeId> {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if let MemoryContent::Text { text, .. } = &self.nodes[id.0].content {
                if text == needle {
                    return Some(id);
                }
            }
            stack.extend(self.nodes[id.0].children.iter().rev());
        }
        None
    }

    // === Platform-style mutations ===

    /// Replace the text of a text node in place. Ownership is kept.
    pub fn set_text(&mut self, id: MemoryNodeId, new_text: impl Into<String>) {
        if let MemoryContent::Text { text, .. } = &mut self.nodes[id.0].content {
            *text = new_text.into();
        }
    }

    /// Insert an unowned copy of `node` after `sibling`. Returns `None` when
    /// `sibling` has no parent.
    pub fn insert_after(&mut self, sibling: MemoryNodeId, node: &Node) -> Option<MemoryNodeId> {
        let parent = self.nodes[sibling.0].parent?;
        let id = self.build(Some(parent), node, false);
        let children = &mut self.nodes[parent.0].children;
        let index = children.iter().position(|c| *c == sibling)?;
        children.insert(index + 1, id);
        Some(id)
    }

    /// Append an unowned copy of `node` as the last child of `parent`.
    pub fn append_child(&mut self, parent: MemoryNodeId, node: &Node) -> MemoryNodeId {
        let id = self.build(Some(parent), node, false);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append a render-only trailing marker to `parent`.
    pub fn append_marker(&mut self, parent: MemoryNodeId) -> MemoryNodeId {
        let id = self.marker(parent);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Insert a render-only marker after `sibling`.
    pub fn insert_marker_after(&mut self, sibling: MemoryNodeId) -> Option<MemoryNodeId> {
        let parent = self.nodes[sibling.0].parent?;
        let id = self.marker(parent);
        let children = &mut self.nodes[parent.0].children;
        let index = children.iter().position(|c| *c == sibling)?;
        children.insert(index + 1, id);
        Some(id)
    }

    fn marker(&mut self, parent: MemoryNodeId) -> MemoryNodeId {
        let id = MemoryNodeId(self.nodes.len());
        self.nodes.push(MemoryNode {
            content: MemoryContent::Element {
                node_type: NodeType::inline_atom("trailing_break"),
                attrs: Attrs::new(),
                marks: MarkSet::none(),
            },
            parent: Some(parent),
            children: Vec::new(),
            rendered: Vec::new(),
            owned: false,
            ignorable: true,
        });
        id
    }

    /// Detach a node (and its subtree) from the tree.
    pub fn remove(&mut self, id: MemoryNodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    pub fn set_selection(
        &mut self,
        anchor: SurfacePoint<MemoryNodeId>,
        focus: SurfacePoint<MemoryNodeId>,
    ) {
        let collapsed = anchor == focus;
        self.selection = Some(SurfaceSelection {
            anchor,
            focus,
            collapsed,
        });
    }

    /// Collapsed selection at `offset` inside `container`.
    pub fn set_cursor(&mut self, container: MemoryNodeId, offset: usize) {
        let point = SurfacePoint::new(container, offset);
        self.set_selection(point.clone(), point);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Spans marked for redraw, oldest first.
    pub fn dirty(&self) -> &[DocRange] {
        &self.dirty
    }
}

impl Surface for MemorySurface {
    type Node = MemoryNodeId;

    fn locate(&self, pos: usize, bias: Bias) -> Option<SurfacePoint<MemoryNodeId>> {
        let rpos = self.rendered.resolve(pos).ok()?;
        let mut container = self.root;
        for depth in 0..rpos.depth() {
            let child = *self.nodes[container.0].rendered.get(rpos.index(depth))?;
            // Positions inside a detached subtree have no surface point.
            if self.nodes[child.0].parent != Some(container) {
                return None;
            }
            container = child;
        }
        let node = &self.nodes[container.0];
        let dom_index = |id: &MemoryNodeId| node.children.iter().position(|c| c == id);
        let index = rpos.index(rpos.depth());
        let offset = match node.rendered.get(index).and_then(dom_index) {
            Some(dom_index) if rpos.text_offset() > 0 => match bias {
                Bias::Before => dom_index,
                Bias::After => dom_index + 1,
            },
            Some(dom_index) => dom_index,
            None => node.rendered[index.min(node.rendered.len())..]
                .iter()
                .find_map(dom_index)
                .unwrap_or(node.children.len()),
        };
        Some(SurfacePoint::new(container, offset))
    }

    fn mark_dirty(&mut self, from: usize, to: usize) {
        self.dirty.push(DocRange::new(from, to));
    }

    fn selection(&self) -> Option<SurfaceSelection<MemoryNodeId>> {
        self.selection.clone()
    }

    fn ownership(&self, node: &MemoryNodeId) -> Option<ParseRule> {
        let data = &self.nodes[node.0];
        if data.ignorable {
            return Some(ParseRule::Ignore);
        }
        if !data.owned {
            return None;
        }
        Some(match &data.content {
            MemoryContent::Element {
                node_type, attrs, ..
            } => ParseRule::Node {
                node_type: node_type.clone(),
                attrs: attrs.clone(),
            },
            MemoryContent::Text { .. } => ParseRule::Text,
        })
    }

    fn root(&self) -> MemoryNodeId {
        self.root
    }

    fn parent(&self, node: &MemoryNodeId) -> Option<MemoryNodeId> {
        self.nodes[node.0].parent
    }

    fn next_sibling(&self, node: &MemoryNodeId) -> Option<MemoryNodeId> {
        let parent = self.nodes[node.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let index = siblings.iter().position(|c| c == node)?;
        siblings.get(index + 1).copied()
    }

    fn child_count(&self, node: &MemoryNodeId) -> usize {
        self.nodes[node.0].children.len()
    }

    fn contains(&self, ancestor: &MemoryNodeId, node: &MemoryNodeId) -> bool {
        let mut cur = Some(*node);
        while let Some(id) = cur {
            if id == *ancestor {
                return true;
            }
            cur = self.nodes[id.0].parent;
        }
        false
    }
}

// === Parser ===

/// Parser for [`MemorySurface`] content.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryParser;

impl SurfaceParser<MemorySurface> for MemoryParser {
    fn parse(&self, surface: &MemorySurface, request: ParseRequest<'_, MemoryNodeId>) -> ParseOutput {
        let mut state = ParseState {
            surface,
            rules: request.rules,
            find: request.find_positions,
            found: vec![None; request.find_positions.len()],
            pos: 0,
        };
        let count = surface.child_count(request.container);
        let content = state.parse_children(
            *request.container,
            request.from.min(count),
            request.to.min(count),
            &MarkSet::none(),
        );
        tracing::trace!(
            from = request.from,
            to = request.to,
            top_start = request.top_start,
            size = state.pos,
            "MemoryParser: parsed region"
        );
        ParseOutput {
            doc: request.top_node.copy(Fragment::from_nodes(content)),
            found: state.found,
        }
    }
}

struct ParseState<'a> {
    surface: &'a MemorySurface,
    rules: &'a dyn Fn(&MemoryNodeId) -> Option<ParseRule>,
    find: &'a [SurfacePoint<MemoryNodeId>],
    found: Vec<Option<usize>>,
    /// Model offset of the next parsed node.
    pos: usize,
}

impl ParseState<'_> {
    fn note(&mut self, container: MemoryNodeId, offset: usize, pos: usize) {
        for (point, found) in self.find.iter().zip(self.found.iter_mut()) {
            if found.is_none() && point.container == container && point.offset == offset {
                *found = Some(pos);
            }
        }
    }

    fn parse_children(
        &mut self,
        parent: MemoryNodeId,
        from: usize,
        to: usize,
        marks: &MarkSet,
    ) -> Vec<Node> {
        let mut out = Vec::new();
        for index in from..to {
            self.note(parent, index, self.pos);
            let child = self.surface.children(parent)[index];
            out.extend(self.parse_node(child, marks));
        }
        self.note(parent, to, self.pos);
        out
    }

    fn parse_node(&mut self, id: MemoryNodeId, marks: &MarkSet) -> Vec<Node> {
        let surface = self.surface;
        let child_count = surface.children(id).len();
        let rule = (self.rules)(&id);
        match &rule {
            Some(ParseRule::Ignore) => return Vec::new(),
            Some(ParseRule::Skip) => return self.parse_children(id, 0, child_count, marks),
            Some(ParseRule::Mark(mark)) => {
                return self.parse_children(id, 0, child_count, &marks.with(mark.clone()));
            }
            _ => {}
        }
        match surface.content(id) {
            MemoryContent::Text { text, marks: own } => {
                let len = text.chars().count();
                for offset in 0..=len {
                    self.note(id, offset, self.pos + offset);
                }
                self.pos += len;
                vec![Node::text(text.as_str(), union(own, marks))]
            }
            MemoryContent::Element {
                node_type,
                attrs,
                marks: own,
            } => {
                let (node_type, attrs) = match rule {
                    Some(ParseRule::Node { node_type, attrs }) => (node_type, attrs),
                    _ => (node_type.clone(), attrs.clone()),
                };
                if node_type.is_leaf() {
                    self.note(id, 0, self.pos);
                    self.pos += 1;
                    let marks = if node_type.is_inline() {
                        union(own, marks)
                    } else {
                        own.clone()
                    };
                    return vec![Node::new(node_type, attrs, Fragment::empty(), marks)];
                }
                self.pos += 1;
                let children = self.parse_children(id, 0, child_count, marks);
                self.pos += 1;
                vec![Node::new(
                    node_type,
                    attrs,
                    Fragment::from_nodes(children),
                    own.clone(),
                )]
            }
        }
    }
}

fn union(own: &MarkSet, inherited: &MarkSet) -> MarkSet {
    if inherited.is_empty() {
        return own.clone();
    }
    own.iter().chain(inherited.iter()).cloned().collect()
}
