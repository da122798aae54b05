//! Position mapping across document changes.
//!
//! Every replace step produces a `StepMap` describing which ranges it
//! replaced. A `Mapping` is the ordered composition of step maps between two
//! document snapshots, used to move stale positions into the later one.

use serde::{Deserialize, Serialize};

/// Which side a position sticks to when content is inserted exactly at it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Assoc {
    /// Stay in front of inserted content.
    Before,
    /// Move behind inserted content.
    #[default]
    After,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct MapRange {
    start: usize,
    old_size: usize,
    new_size: usize,
}

/// A mapped position plus whether the content around it was deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MapResult {
    pub pos: usize,
    pub deleted: bool,
}

/// The position changes made by a single step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMap {
    ranges: Vec<MapRange>,
}

impl StepMap {
    /// A map for one replaced range.
    pub fn replace(start: usize, old_size: usize, new_size: usize) -> Self {
        if old_size == 0 && new_size == 0 {
            return Self::default();
        }
        Self {
            ranges: vec![MapRange {
                start,
                old_size,
                new_size,
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }

    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut diff: isize = 0;
        for range in &self.ranges {
            if range.start > pos {
                break;
            }
            let end = range.start + range.old_size;
            if pos <= end {
                let side = if range.old_size == 0 {
                    assoc
                } else if pos == range.start {
                    Assoc::Before
                } else if pos == end {
                    Assoc::After
                } else {
                    assoc
                };
                let offset = match side {
                    Assoc::Before => 0,
                    Assoc::After => range.new_size,
                };
                let mapped = range.start as isize + diff + offset as isize;
                return MapResult {
                    pos: mapped.max(0) as usize,
                    deleted: pos > range.start && pos < end,
                };
            }
            diff += range.new_size as isize - range.old_size as isize;
        }
        MapResult {
            pos: (pos as isize + diff).max(0) as usize,
            deleted: false,
        }
    }
}

/// An ordered composition of step maps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    pub fn is_empty(&self) -> bool {
        self.maps.iter().all(StepMap::is_empty)
    }

    pub fn append_map(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    pub fn append_mapping(&mut self, other: &Mapping) {
        self.maps.extend(other.maps.iter().cloned());
    }

    /// Map a position through every step, in order.
    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }

    /// Map a position, reporting whether any step deleted the content
    /// surrounding it.
    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut deleted = false;
        let mut pos = pos;
        for map in &self.maps {
            let result = map.map_result(pos, assoc);
            deleted |= result.deleted;
            pos = result.pos;
        }
        MapResult { pos, deleted }
    }
}
