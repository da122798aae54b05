//! Redraw marking for changed spans.

use weaver_editor_model::{ModelError, Node};

use crate::diff::Change;
use crate::surface::Surface;

/// Ask the surface to redraw the old span of `change`.
///
/// A change that starts inside a text node and stays within that same
/// node is left to incremental text sync. Returns whether a redraw was
/// requested.
pub fn mark_changed_span<S: Surface + ?Sized>(
    surface: &mut S,
    doc: &Node,
    change: &Change,
) -> Result<bool, ModelError> {
    let start = doc.resolve(change.start)?;
    let end = doc.resolve(change.end_a)?;
    let depth = start.depth();
    let within_text = start.text_offset() > 0
        && start.shared_depth(change.end_a) == depth
        && start.index(depth) == end.index(end.depth());
    if within_text {
        return Ok(false);
    }
    tracing::trace!(from = change.start, to = change.end_a, "mark_changed_span: redraw");
    surface.mark_dirty(change.start, change.end_a);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySurface;
    use crate::range::DocRange;
    use weaver_editor_model::basic::{doc, p};

    fn change(start: usize, end_a: usize) -> Change {
        Change {
            start,
            end_a,
            end_b: end_a,
        }
    }

    #[test]
    fn test_inside_one_text_node_is_left_alone() {
        // 0 <p> 1 hello 6 </p> 7
        let d = doc([p("hello")]);
        let mut surface = MemorySurface::render(&d);
        assert!(!mark_changed_span(&mut surface, &d, &change(2, 4)).unwrap());
        assert!(surface.dirty().is_empty());
    }

    #[test]
    fn test_node_boundary_is_marked() {
        let d = doc([p("hello"), p("world")]);
        let mut surface = MemorySurface::render(&d);
        assert!(mark_changed_span(&mut surface, &d, &change(1, 3)).unwrap());
        assert!(mark_changed_span(&mut surface, &d, &change(3, 10)).unwrap());
        assert_eq!(surface.dirty(), &[DocRange::new(1, 3), DocRange::new(3, 10)]);
    }
}
