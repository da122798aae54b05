//! Finding the smallest region of the surface that can be safely re-parsed.
//!
//! All positions here refer to the session's start snapshot, since that is
//! the document the surface still represents.

use serde::Serialize;
use weaver_editor_model::{ModelError, Node, ResolvedPos, Selection};

use crate::error::ReconcileError;
use crate::surface::{Bias, ParseOptions, ParseRequest, Surface, SurfaceParser, SurfacePoint};

/// A `from..to` span of document positions, `from <= to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DocRange {
    pub from: usize,
    pub to: usize,
}

impl DocRange {
    pub fn new(from: usize, to: usize) -> Self {
        Self {
            from: from.min(to),
            to: from.max(to),
        }
    }

    /// Smallest range covering both.
    pub fn union(self, other: DocRange) -> DocRange {
        DocRange {
            from: self.from.min(other.from),
            to: self.to.max(other.to),
        }
    }
}

// === Range selection ===

/// The range to re-read for a session.
///
/// An explicit span is widened to whole children of the deepest node both
/// ends share. Without one, the range is derived from the selection.
pub fn changed_range(
    doc: &Node,
    explicit: Option<DocRange>,
    selection: Selection,
) -> Result<DocRange, ModelError> {
    let Some(range) = explicit else {
        return range_around_selection(doc, selection);
    };
    let size = doc.content().size();
    let rfrom = doc.resolve(range.from.min(size))?;
    let rto = doc.resolve(range.to.min(size))?;
    let shared = rfrom.shared_depth(rto.pos());
    Ok(DocRange::new(rfrom.before(shared + 1), rto.after(shared + 1)))
}

fn is_at_end(pos: &ResolvedPos, depth: usize) -> bool {
    for i in depth..pos.depth() {
        if pos.index(i) + 1 < pos.node(i).child_count() {
            return false;
        }
    }
    pos.parent_offset() == pos.parent().content().size()
}

fn is_at_start(pos: &ResolvedPos, depth: usize) -> bool {
    for i in depth..pos.depth() {
        if pos.index(i) > 0 {
            return false;
        }
    }
    pos.parent_offset() == 0
}

/// Heuristic range around the selection, used when the surface reported
/// no explicit span.
pub fn range_around_selection(doc: &Node, selection: Selection) -> Result<DocRange, ModelError> {
    let size = doc.content().size();
    let rfrom = doc.resolve(selection.start().min(size))?;
    let rto = doc.resolve(selection.end().min(size))?;

    let parent = rfrom.parent();
    let parent_size = parent.content().size();
    if rfrom.same_parent(&rto)
        && parent.is_textblock()
        && rfrom.parent_offset() > 0
        && rto.parent_offset() < parent_size
    {
        // The inline run around the selection.
        let content = parent.content();
        let mut start_off = rfrom.parent_offset();
        let mut end_off = rto.parent_offset().min(parent_size);
        if start_off > 0 {
            start_off = content.child_before(start_off).2;
        }
        if end_off < parent_size {
            if let (Some(after), _, offset) = content.child_after(end_off) {
                end_off = offset + after.node_size();
            }
        }
        let node_start = rfrom.start(rfrom.depth());
        return Ok(DocRange::new(node_start + start_off, node_start + end_off));
    }

    let max_depth = rfrom.depth().min(rto.depth());
    let mut depth = 0;
    loop {
        let from_start = is_at_start(&rfrom, depth + 1);
        let to_end = is_at_end(&rto, depth + 1);
        if depth >= max_depth
            || from_start
            || to_end
            || rfrom.index(depth) != rto.index(depth)
            || rto.node(depth).is_textblock()
        {
            let mut from = rfrom.before(depth + 1);
            let mut to = rto.after(depth + 1);
            // Pull in a neighbour the selection was flush against, so edits
            // that merge into it stay visible to the diff.
            if from_start && rfrom.index(depth) > 0 {
                from -= rfrom.node(depth).child(rfrom.index(depth) - 1).node_size();
            }
            if to_end && rto.index(depth) + 1 < rto.node(depth).child_count() {
                to += rto.node(depth).child(rto.index(depth) + 1).node_size();
            }
            return Ok(DocRange::new(from, to));
        }
        depth += 1;
    }
}

/// Snap endpoints that fall inside a text node out to its edges.
pub fn align_to_children(doc: &Node, range: DocRange) -> Result<DocRange, ModelError> {
    let rfrom = doc.resolve(range.from)?;
    let rto = doc.resolve(range.to)?;
    let from = rfrom.pos() - rfrom.text_offset();
    let to = match rto.text_offset() {
        0 => rto.pos(),
        off => {
            let node = rto.parent().child(rto.index(rto.depth()));
            rto.pos() + node.node_size() - off
        }
    };
    Ok(DocRange::new(from, to))
}

/// Move both ends out by one ancestor level, or to the document edges.
pub fn widen(doc: &Node, range: DocRange) -> Result<DocRange, ModelError> {
    let rfrom = doc.resolve(range.from)?;
    let rto = doc.resolve(range.to)?;
    let from = match rfrom.depth() {
        0 => 0,
        d => rfrom.before(d),
    };
    let to = match rto.depth() {
        0 => doc.content().size(),
        d => rto.after(d),
    };
    Ok(DocRange::new(from, to))
}

// === Region resolution ===

/// A range the surface can be read back over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region<N> {
    pub range: DocRange,
    /// Surface node holding the rendered range.
    pub container: N,
    /// Child offsets of the range inside `container`.
    pub start: usize,
    pub end: usize,
    /// Surface selection points inside `container`: the anchor, then the
    /// focus when the selection is not collapsed.
    pub find: Vec<SurfacePoint<N>>,
    /// How many ranges were tried, the successful one included.
    pub attempts: usize,
}

/// Locate `range` on the surface. `None` when the answer is inconclusive:
/// the ends live in different containers, or unowned content directly
/// follows the range.
fn try_locate<S: Surface + ?Sized>(
    surface: &S,
    range: DocRange,
) -> Option<(S::Node, usize, usize)> {
    let start = surface.locate(range.from, Bias::Before)?;
    let end = surface.locate(range.to, Bias::After)?;
    if start.container != end.container {
        tracing::trace!(?range, "try_locate: ends in different containers");
        return None;
    }
    if end.offset == surface.child_count(&end.container) {
        let root = surface.root();
        let mut scan = end.container.clone();
        while scan != root {
            if let Some(next) = surface.next_sibling(&scan) {
                if surface.ownership(&next).is_none() {
                    tracing::trace!(?range, ?next, "try_locate: unowned content after range");
                    return None;
                }
                break;
            }
            match surface.parent(&scan) {
                Some(parent) => scan = parent,
                None => break,
            }
        }
    }
    Some((start.container, start.offset, end.offset))
}

/// Resolve `range` on the surface, widening until it resolves.
///
/// Widening moves at least one end up an ancestor level per attempt, so the
/// loop reaches the document root within `depth + 2` attempts. A failure
/// there drops the change.
pub fn resolve_region<S: Surface + ?Sized>(
    surface: &S,
    doc: &Node,
    range: DocRange,
) -> Result<Region<S::Node>, ReconcileError> {
    let size = doc.content().size();
    let mut range = align_to_children(doc, DocRange::new(range.from.min(size), range.to.min(size)))?;
    let max_attempts = doc
        .resolve(range.from)?
        .depth()
        .max(doc.resolve(range.to)?.depth())
        + 2;
    let root = DocRange::new(0, size);

    for attempt in 1..=max_attempts {
        if let Some((container, start, end)) = try_locate(surface, range) {
            tracing::trace!(?range, attempt, start, end, "resolve_region: resolved");
            let find = selection_points(surface, &container);
            return Ok(Region {
                range,
                container,
                start,
                end,
                find,
                attempts: attempt,
            });
        }
        if range == root {
            break;
        }
        range = widen(doc, range)?;
        tracing::trace!(?range, attempt, "resolve_region: widening");
    }
    Err(ReconcileError::UnresolvableRegion {
        from: range.from,
        to: range.to,
    })
}

fn selection_points<S: Surface + ?Sized>(surface: &S, container: &S::Node) -> Vec<SurfacePoint<S::Node>> {
    let Some(selection) = surface.selection() else {
        return Vec::new();
    };
    if !surface.contains(container, &selection.anchor.container) {
        return Vec::new();
    }
    let mut points = vec![selection.anchor];
    if !selection.collapsed {
        points.push(selection.focus);
    }
    points
}

/// Freshly parsed content for a region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedRegion {
    pub range: DocRange,
    /// Copy of the region's parent holding the parsed children. Offsets in
    /// it are relative to `range.from`.
    pub doc: Node,
    /// Surface selection mapped into document positions.
    pub selection: Option<Selection>,
}

/// Parse a resolved region with the host's parser.
pub fn parse_region<S: Surface + ?Sized>(
    surface: &S,
    parser: &dyn SurfaceParser<S>,
    doc: &Node,
    region: &Region<S::Node>,
) -> Result<ParsedRegion, ModelError> {
    let rfrom = doc.resolve(region.range.from)?;
    let rules = |node: &S::Node| surface.ownership(node);
    let output = parser.parse(
        surface,
        ParseRequest {
            container: &region.container,
            top_node: rfrom.parent().copy(Default::default()),
            top_start: rfrom.index(rfrom.depth()),
            from: region.start,
            to: region.end,
            find_positions: &region.find,
            options: ParseOptions::default(),
            rules: &rules,
        },
    );

    let from = region.range.from;
    let selection = match output.found.first().copied().flatten() {
        Some(anchor) => {
            let head = output.found.get(1).copied().flatten().unwrap_or(anchor);
            Some(Selection::new(anchor + from, head + from))
        }
        None => None,
    };
    Ok(ParsedRegion {
        range: region.range,
        doc: output.doc,
        selection,
    })
}
