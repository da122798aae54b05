//! weaver-editor-model: structured document model for the weaver editor.
//!
//! This crate provides:
//! - `Node` / `Fragment` - immutable document trees with position arithmetic
//! - `ResolvedPos` - positions resolved against a document snapshot
//! - `Slice` and `Node::replace` - structural replacement with open-side joining
//! - `StepMap` / `Mapping` - moving positions across document changes
//! - `Transaction`, `Selection`, `EditorState`
//! - `basic` - a small node set and builders

pub mod basic;
pub mod error;
pub mod fragment;
pub mod mapping;
pub mod mark;
pub mod node;
mod replace;
pub mod resolved;
pub mod selection;
pub mod slice;
pub mod transaction;

pub use error::{ModelError, ReplaceError};
pub use fragment::Fragment;
pub use mapping::{Assoc, MapResult, Mapping, StepMap};
pub use mark::{Mark, MarkSet};
pub use node::{Attrs, Node, NodeKind, NodeType};
pub use resolved::ResolvedPos;
pub use selection::{EditorState, SearchDir, Selection, find_text_position};
pub use slice::Slice;
pub use smol_str::SmolStr;
pub use transaction::{ReplaceStep, Transaction};
