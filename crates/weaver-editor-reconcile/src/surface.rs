//! Capability traits for the rendering surface and its parser.
//!
//! The surface is the mutable tree the user and the platform edit directly
//! (a browser DOM, a native text view, or [`MemorySurface`] in tests). The
//! reconciler never inspects it beyond these queries.
//!
//! [`MemorySurface`]: crate::memory::MemorySurface

use std::fmt;

use weaver_editor_model::{Attrs, Mark, Node, NodeType};

/// Which side of a position to prefer when it sits on a boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bias {
    Before,
    After,
}

/// A point in the surface tree: a container and a child (or character)
/// offset inside it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfacePoint<N> {
    pub container: N,
    pub offset: usize,
}

impl<N> SurfacePoint<N> {
    pub fn new(container: N, offset: usize) -> Self {
        Self { container, offset }
    }
}

/// The surface's own selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfaceSelection<N> {
    pub anchor: SurfacePoint<N>,
    pub focus: SurfacePoint<N>,
    pub collapsed: bool,
}

/// How a surface node should be read back into the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseRule {
    /// Produce a node of this type.
    Node { node_type: NodeType, attrs: Attrs },
    /// Literal text leaf.
    Text,
    /// Transparent wrapper that adds a mark to everything inside it.
    Mark(Mark),
    /// Transparent wrapper: parse the children in place.
    Skip,
    /// Render-only node, dropped entirely.
    Ignore,
}

/// The rendering surface as seen by the reconciler.
///
/// Positions passed to `locate` refer to the document the surface last
/// rendered, not to whatever the host holds now.
pub trait Surface {
    /// Handle to a node in the surface tree.
    type Node: Clone + PartialEq + fmt::Debug;

    /// Map a document position to a surface point.
    ///
    /// Returns `None` when the position is not rendered.
    fn locate(&self, pos: usize, bias: Bias) -> Option<SurfacePoint<Self::Node>>;

    /// Force the span `from..to` to be redrawn on the next render.
    fn mark_dirty(&mut self, from: usize, to: usize);

    /// Current surface selection, if there is one.
    fn selection(&self) -> Option<SurfaceSelection<Self::Node>>;

    /// How the renderer would parse a node it owns.
    ///
    /// `None` means the node was created outside the renderer (by the
    /// platform or the user). Render-only markers answer
    /// `Some(ParseRule::Ignore)`.
    fn ownership(&self, node: &Self::Node) -> Option<ParseRule>;

    fn root(&self) -> Self::Node;
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
    fn child_count(&self, node: &Self::Node) -> usize;

    /// Whether `node` is `ancestor` or lies inside it.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;
}

/// Flags the reconciler always parses with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    pub preserve_whitespace: bool,
    pub editable_content: bool,
    pub top_open: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            preserve_whitespace: true,
            editable_content: true,
            top_open: true,
        }
    }
}

/// A request to parse children `from..to` of a surface container.
pub struct ParseRequest<'a, N> {
    pub container: &'a N,
    /// Empty copy of the model node the container renders.
    pub top_node: Node,
    /// Index of the first parsed child inside `top_node` in the source document.
    pub top_start: usize,
    pub from: usize,
    pub to: usize,
    /// Surface points whose model offsets should be reported.
    pub find_positions: &'a [SurfacePoint<N>],
    pub options: ParseOptions,
    /// Ownership lookup, consulted for every node before its own data.
    pub rules: &'a dyn Fn(&N) -> Option<ParseRule>,
}

/// Result of a parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOutput {
    /// `top_node` filled with the parsed content.
    pub doc: Node,
    /// Offsets into `doc`'s content for each requested point, in request
    /// order. `None` when a point was outside the parsed children.
    pub found: Vec<Option<usize>>,
}

/// Turns a surface subtree back into model content.
pub trait SurfaceParser<S: Surface + ?Sized> {
    fn parse(&self, surface: &S, request: ParseRequest<'_, S::Node>) -> ParseOutput;
}
