//! Inline marks and mark sets.
//!
//! Marks are compared by value. A `MarkSet` keeps its marks sorted and
//! deduplicated so two sets holding the same marks are equal regardless of
//! the order they were built in.

use smol_str::SmolStr;

use crate::node::Attrs;

/// An inline attribute (emphasis, link, code, ...) attached to text or atoms.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mark {
    /// Mark type name, e.g. `"strong"` or `"link"`.
    pub name: SmolStr,
    /// Mark attributes, e.g. `href` for links.
    pub attrs: Attrs,
}

impl Mark {
    /// Create a mark without attributes.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            attrs: Attrs::new(),
        }
    }

    /// Create a mark with the given attributes.
    pub fn with_attrs(name: impl Into<SmolStr>, attrs: Attrs) -> Self {
        Self {
            name: name.into(),
            attrs,
        }
    }
}

/// An ordered, deduplicated set of marks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MarkSet(Vec<Mark>);

impl MarkSet {
    /// The empty mark set.
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// Build a set from marks in any order.
    pub fn from_marks(marks: impl IntoIterator<Item = Mark>) -> Self {
        let mut marks: Vec<Mark> = marks.into_iter().collect();
        marks.sort();
        marks.dedup();
        Self(marks)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mark> {
        self.0.iter()
    }

    /// Check whether a mark is part of this set.
    pub fn contains(&self, mark: &Mark) -> bool {
        self.0.binary_search(mark).is_ok()
    }

    /// Return a copy of this set with `mark` added.
    pub fn with(&self, mark: Mark) -> Self {
        match self.0.binary_search(&mark) {
            Ok(_) => self.clone(),
            Err(idx) => {
                let mut marks = self.0.clone();
                marks.insert(idx, mark);
                Self(marks)
            }
        }
    }

    /// Return a copy of this set without `mark`.
    pub fn without(&self, mark: &Mark) -> Self {
        Self(self.0.iter().filter(|m| *m != mark).cloned().collect())
    }
}

impl FromIterator<Mark> for MarkSet {
    fn from_iter<I: IntoIterator<Item = Mark>>(iter: I) -> Self {
        Self::from_marks(iter)
    }
}
