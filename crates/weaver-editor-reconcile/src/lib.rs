//! weaver-editor-reconcile: folds edits made directly on a rendering surface
//! back into the weaver document model.
//!
//! This crate provides:
//! - `Surface` / `SurfaceParser` - the rendering surface and its reader
//! - `ReconcileHost` - the editor view the engine reports to
//! - `DomChangeController` - debounced change sessions
//! - `range`, `diff`, `patch` - region resolution, content diff, transaction building
//! - `MemorySurface` / `MemoryParser` - an in-memory surface for hosts and tests

pub mod config;
pub mod diff;
pub mod dirty;
pub mod error;
pub mod host;
pub mod ids;
pub mod memory;
pub mod patch;
pub mod range;
pub mod session;
pub mod surface;
pub mod timer;

pub use config::ReconcileConfig;
pub use diff::{Change, find_diff};
pub use dirty::mark_changed_span;
pub use error::ReconcileError;
pub use host::{KeyEvent, ReconcileHost, SessionId};
pub use ids::{IdAllocator, RandomIds, SequentialIds};
pub use memory::{MemoryContent, MemoryNodeId, MemoryParser, MemorySurface};
pub use patch::{ReconcileOutcome, apply_change, reconcile, uniform_text_between};
pub use range::{DocRange, ParsedRegion, Region, changed_range, parse_region, resolve_region};
pub use session::{DomChangeController, FinishOutcome};
pub use surface::{
    Bias, ParseOptions, ParseOutput, ParseRequest, ParseRule, Surface, SurfaceParser,
    SurfacePoint, SurfaceSelection,
};
pub use timer::{ManualTimer, Timer, TimerHandle};
