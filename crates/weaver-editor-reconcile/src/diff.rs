//! Content diffing between the old document and freshly parsed content.

use serde::Serialize;
use weaver_editor_model::Fragment;

/// The differing window between two sibling sequences.
///
/// `old[start..end_a]` was replaced by `new[start..end_b]`. All three are
/// absolute positions in the coordinate space the comparison was anchored
/// at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Change {
    pub start: usize,
    pub end_a: usize,
    pub end_b: usize,
}

/// Compare `a` (old) with `b` (new), both starting at `pos`.
///
/// When the left and right scans overlap (typing a character equal to its
/// neighbour, say) the window is ambiguous. It is then placed at
/// `preferred` if that lies inside the overlap, and collapsed at the left
/// scan's start otherwise.
pub fn find_diff(a: &Fragment, b: &Fragment, pos: usize, preferred: usize) -> Option<Change> {
    let mut start = a.find_diff_start(b, pos)?;
    let (mut end_a, mut end_b) = a
        .find_diff_end(b, pos + a.size(), pos + b.size())
        .unwrap_or((pos + a.size(), pos + b.size()));

    if end_a < start && a.size() < b.size() {
        let shift = if preferred <= start && preferred >= end_a {
            start - preferred
        } else {
            0
        };
        start -= shift;
        end_b = start + (end_b - end_a);
        end_a = start;
    } else if end_b < start {
        let shift = if preferred <= start && preferred >= end_b {
            start - preferred
        } else {
            0
        };
        start -= shift;
        end_a = start + (end_a - end_b);
        end_b = start;
    }

    let change = Change {
        start,
        end_a,
        end_b,
    };
    tracing::trace!(?change, pos, preferred, "find_diff");
    Some(change)
}
