//! Error types for reconciliation.

use thiserror::Error;
use weaver_editor_model::ModelError;

/// Errors that drop a pending surface change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReconcileError {
    /// The surface could not be read back even at the document root.
    #[error("surface region {from}..{to} could not be resolved, even at the document root")]
    UnresolvableRegion { from: usize, to: usize },

    /// The parsed change could not be applied to the document.
    #[error(transparent)]
    Model(#[from] ModelError),
}
