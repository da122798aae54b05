//! Host-facing callbacks.

use std::fmt;

use smol_str::SmolStr;
use weaver_editor_model::{EditorState, Transaction};

use crate::surface::{Surface, SurfaceParser};

/// Identifier for one change session. Used for correlation only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u32);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// A synthetic key event offered to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Key name, as in `KeyboardEvent.key`.
    pub key: SmolStr,
    /// Legacy key code.
    pub key_code: u32,
}

impl KeyEvent {
    pub fn enter() -> Self {
        Self {
            key: SmolStr::new_static("Enter"),
            key_code: 13,
        }
    }
}

/// The editor view that owns the document and receives reconciled edits.
pub trait ReconcileHost<S: Surface + ?Sized> {
    /// Current document and selection.
    fn state(&self) -> EditorState;

    fn on_session_start(&mut self, _id: SessionId) {}

    fn on_session_end(&mut self, _id: SessionId) {}

    /// Commit a transaction built against the current `state()`.
    fn on_transaction(&mut self, tr: &Transaction, scroll_into_view: bool);

    /// Key interception. Return `true` if the key was handled.
    fn handle_key(&mut self, _event: &KeyEvent) -> bool {
        false
    }

    /// Text input interception over `from..to` in the current document.
    /// Return `true` if the input was handled.
    fn handle_text_input(&mut self, _from: usize, _to: usize, _text: &str) -> bool {
        false
    }

    /// Parser for the surface's content.
    fn parser(&self) -> &dyn SurfaceParser<S>;
}
