//! Slices of document content.

use crate::fragment::Fragment;

/// A piece of a document, possibly cut through open nodes on either side.
///
/// `open_start` and `open_end` count how many levels of the first and last
/// child are cut open, so the slice can be joined into surrounding content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Slice {
    pub content: Fragment,
    pub open_start: usize,
    pub open_end: usize,
}

impl Slice {
    pub fn new(content: Fragment, open_start: usize, open_end: usize) -> Self {
        Self {
            content,
            open_start,
            open_end,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Size this slice adds when inserted.
    pub fn size(&self) -> usize {
        self.content
            .size()
            .saturating_sub(self.open_start + self.open_end)
    }
}
