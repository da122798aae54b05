//! Structural replacement of a range with a slice.
//!
//! Open sides of the slice are joined onto the content around the replaced
//! range. No schema fitting is attempted: a slice whose open depths don't
//! line up with the range, or that would join incompatible nodes, fails
//! with a `ReplaceError`.

use crate::error::{ModelError, ReplaceError};
use crate::fragment::Fragment;
use crate::node::Node;
use crate::resolved::ResolvedPos;
use crate::slice::Slice;

impl Node {
    /// Replace the content between `from` and `to` with `slice`.
    pub fn replace(&self, from: usize, to: usize, slice: &Slice) -> Result<Node, ModelError> {
        let rfrom = self.resolve(from)?;
        let rto = self.resolve(to)?;
        replace(&rfrom, &rto, slice)
    }
}

pub(crate) fn replace(
    from: &ResolvedPos,
    to: &ResolvedPos,
    slice: &Slice,
) -> Result<Node, ModelError> {
    if slice.open_start > from.depth() {
        return Err(ReplaceError::from("inserted content deeper than insertion position").into());
    }
    if from.depth() + slice.open_end != to.depth() + slice.open_start {
        return Err(ReplaceError::from("inconsistent open depths").into());
    }
    replace_outer(from, to, slice, 0)
}

fn replace_outer(
    from: &ResolvedPos,
    to: &ResolvedPos,
    slice: &Slice,
    depth: usize,
) -> Result<Node, ModelError> {
    let index = from.index(depth);
    let node = from.node(depth);
    if index == to.index(depth) && depth < from.depth() - slice.open_start {
        let inner = replace_outer(from, to, slice, depth + 1)?;
        Ok(node.copy(node.content().replace_child(index, inner)))
    } else if slice.content.size() == 0 {
        Ok(close(node, replace_two_way(from, to, depth)?))
    } else if slice.open_start == 0
        && slice.open_end == 0
        && from.depth() == depth
        && to.depth() == depth
    {
        // Flat case: both ends in the same parent, nothing to join.
        let parent = from.parent();
        let content = parent.content();
        Ok(close(
            parent,
            content
                .cut(0, from.parent_offset())
                .append(&slice.content)
                .append(&content.cut(to.parent_offset(), content.size())),
        ))
    } else {
        let (start, end) = prepare_slice_for_replace(slice, from)?;
        Ok(close(
            node,
            replace_three_way(from, &start, &end, to, depth)?,
        ))
    }
}

fn check_join(main: &Node, sub: &Node) -> Result<(), ModelError> {
    if !sub.node_type().compatible_content(main.node_type()) {
        return Err(ReplaceError(format!(
            "cannot join {} onto {}",
            sub.name(),
            main.name()
        ))
        .into());
    }
    Ok(())
}

fn joinable(before: &ResolvedPos, after: &ResolvedPos, depth: usize) -> Result<Node, ModelError> {
    let node = before.node(depth);
    check_join(node, after.node(depth))?;
    Ok(node.clone())
}

fn add_node(child: Node, target: &mut Vec<Node>) {
    if let Some(last) = target.last_mut() {
        if child.is_text() && child.same_markup(last) {
            let mut text = String::from(last.text_str().unwrap_or_default());
            text.push_str(child.text_str().unwrap_or_default());
            *last = last.with_text(text);
            return;
        }
    }
    target.push(child);
}

fn add_range(
    start: Option<&ResolvedPos>,
    end: Option<&ResolvedPos>,
    depth: usize,
    target: &mut Vec<Node>,
) {
    let Some(node) = end.or(start).map(|r| r.node(depth)) else {
        return;
    };
    let mut start_index = 0;
    let end_index = end.map_or(node.child_count(), |r| r.index(depth));
    if let Some(start) = start {
        start_index = start.index(depth);
        if start.depth() > depth {
            start_index += 1;
        } else if start.text_offset() > 0 {
            if let Some(after) = start.node_after() {
                add_node(after, target);
            }
            start_index += 1;
        }
    }
    for i in start_index..end_index {
        add_node(node.child(i).clone(), target);
    }
    if let Some(end) = end {
        if end.depth() == depth && end.text_offset() > 0 {
            if let Some(before) = end.node_before() {
                add_node(before, target);
            }
        }
    }
}

fn close(node: &Node, content: Fragment) -> Node {
    node.copy(content)
}

fn replace_three_way(
    from: &ResolvedPos,
    start: &ResolvedPos,
    end: &ResolvedPos,
    to: &ResolvedPos,
    depth: usize,
) -> Result<Fragment, ModelError> {
    let open_start = if from.depth() > depth {
        Some(joinable(from, start, depth + 1)?)
    } else {
        None
    };
    let open_end = if to.depth() > depth {
        Some(joinable(end, to, depth + 1)?)
    } else {
        None
    };

    let mut content = Vec::new();
    add_range(None, Some(from), depth, &mut content);
    match (&open_start, &open_end) {
        (Some(os), Some(oe)) if start.index(depth) == end.index(depth) => {
            check_join(os, oe)?;
            let inner = replace_three_way(from, start, end, to, depth + 1)?;
            add_node(close(os, inner), &mut content);
        }
        _ => {
            if let Some(os) = &open_start {
                let inner = replace_two_way(from, start, depth + 1)?;
                add_node(close(os, inner), &mut content);
            }
            add_range(Some(start), Some(end), depth, &mut content);
            if let Some(oe) = &open_end {
                let inner = replace_two_way(end, to, depth + 1)?;
                add_node(close(oe, inner), &mut content);
            }
        }
    }
    add_range(Some(to), None, depth, &mut content);
    Ok(Fragment::from_nodes(content))
}

fn replace_two_way(
    from: &ResolvedPos,
    to: &ResolvedPos,
    depth: usize,
) -> Result<Fragment, ModelError> {
    let mut content = Vec::new();
    add_range(None, Some(from), depth, &mut content);
    if from.depth() > depth {
        let node = joinable(from, to, depth + 1)?;
        let inner = replace_two_way(from, to, depth + 1)?;
        add_node(close(&node, inner), &mut content);
    }
    add_range(Some(to), None, depth, &mut content);
    Ok(Fragment::from_nodes(content))
}

/// Wrap the slice in copies of the ancestors of `along` so its open sides
/// can be resolved at the same depths as the replaced range.
fn prepare_slice_for_replace(
    slice: &Slice,
    along: &ResolvedPos,
) -> Result<(ResolvedPos, ResolvedPos), ModelError> {
    let extra = along.depth() - slice.open_start;
    let mut node = along.node(extra).copy(slice.content.clone());
    for i in (0..extra).rev() {
        node = along.node(i).copy(Fragment::from_node(node));
    }
    let start = node.resolve(slice.open_start + extra)?;
    let end_pos = node
        .content()
        .size()
        .saturating_sub(slice.open_end + extra);
    let end = node.resolve(end_pos)?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::{blockquote, doc, heading, p, text};

    #[test]
    fn test_insert_text_flat() {
        let d = doc([p("ab")]);
        let slice = Slice::new(Fragment::from_node(text("X")), 0, 0);
        let out = d.replace(2, 2, &slice).unwrap();
        assert_eq!(out, doc([p("aXb")]));
    }

    #[test]
    fn test_delete_inside_text() {
        let d = doc([p("abcd")]);
        let out = d.replace(2, 4, &Slice::empty()).unwrap();
        assert_eq!(out, doc([p("ad")]));
    }

    #[test]
    fn test_delete_joins_paragraphs() {
        let d = doc([p("ab"), p("cd")]);
        let out = d.replace(3, 5, &Slice::empty()).unwrap();
        assert_eq!(out, doc([p("abcd")]));
    }

    #[test]
    fn test_text_replace_across_blocks() {
        let d = doc([p("ab"), p("cd")]);
        let slice = Slice::new(Fragment::from_node(text("X")), 0, 0);
        let out = d.replace(2, 6, &slice).unwrap();
        assert_eq!(out, doc([p("aXd")]));
    }

    #[test]
    fn test_split_with_open_slice() {
        let d = doc([p("ab")]);
        let slice = d.slice(0, 0).unwrap();
        assert_eq!(slice, Slice::empty());
        // Insert a paragraph break: </p><p>
        let split = Slice::new(Fragment::from_nodes([p(""), p("")]), 1, 1);
        let out = d.replace(2, 2, &split).unwrap();
        assert_eq!(out, doc([p("a"), p("b")]));
    }

    #[test]
    fn test_replace_whole_blocks() {
        let d = doc([p("ab"), p("cd")]);
        let slice = Slice::new(Fragment::from_nodes([blockquote([p("x")])]), 0, 0);
        let out = d.replace(4, 8, &slice).unwrap();
        assert_eq!(out, doc([p("ab"), blockquote([p("x")])]));
    }

    #[test]
    fn test_join_heading_and_paragraph() {
        let d = doc([heading("ab"), p("cd")]);
        let out = d.replace(3, 5, &Slice::empty()).unwrap();
        assert_eq!(out, doc([heading("abcd")]));
    }

    #[test]
    fn test_incompatible_join_fails() {
        let d = doc([blockquote([p("ab")]), p("cd")]);
        // From inside the blockquote's paragraph to inside the top-level
        // paragraph: depths differ and the joined types don't match.
        let err = d.replace(3, 8, &Slice::empty()).unwrap_err();
        assert!(matches!(err, ModelError::Replace(_)));
    }
}
