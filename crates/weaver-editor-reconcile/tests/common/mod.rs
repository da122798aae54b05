#![allow(dead_code)]

use weaver_editor_model::{EditorState, Node, Selection, Transaction};
use weaver_editor_reconcile::{
    KeyEvent, MemoryParser, MemorySurface, ReconcileHost, SessionId, SurfaceParser,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Host that applies every transaction to its own state and records what
/// it was asked to do.
#[derive(Debug)]
pub struct RecordingHost {
    pub state: EditorState,
    pub transactions: Vec<Transaction>,
    pub scroll_requests: Vec<bool>,
    pub keys: Vec<KeyEvent>,
    pub text_inputs: Vec<(usize, usize, String)>,
    pub handle_keys: bool,
    pub handle_text: bool,
    pub started: Vec<SessionId>,
    pub ended: Vec<SessionId>,
}

impl RecordingHost {
    pub fn new(doc: Node, selection: Selection) -> Self {
        Self {
            state: EditorState::new(doc, selection),
            transactions: Vec::new(),
            scroll_requests: Vec::new(),
            keys: Vec::new(),
            text_inputs: Vec::new(),
            handle_keys: false,
            handle_text: false,
            started: Vec::new(),
            ended: Vec::new(),
        }
    }

    /// Apply a transaction built by someone other than the reconciler.
    pub fn apply_external(&mut self, tr: &Transaction) {
        self.state.doc = tr.doc().clone();
    }

    pub fn doc(&self) -> &Node {
        &self.state.doc
    }
}

impl ReconcileHost<MemorySurface> for RecordingHost {
    fn state(&self) -> EditorState {
        self.state.clone()
    }

    fn on_session_start(&mut self, id: SessionId) {
        self.started.push(id);
    }

    fn on_session_end(&mut self, id: SessionId) {
        self.ended.push(id);
    }

    fn on_transaction(&mut self, tr: &Transaction, scroll_into_view: bool) {
        self.state.doc = tr.doc().clone();
        if let Some(selection) = tr.selection() {
            self.state.selection = selection;
        }
        self.transactions.push(tr.clone());
        self.scroll_requests.push(scroll_into_view);
    }

    fn handle_key(&mut self, event: &KeyEvent) -> bool {
        self.keys.push(event.clone());
        self.handle_keys
    }

    fn handle_text_input(&mut self, from: usize, to: usize, text: &str) -> bool {
        self.text_inputs.push((from, to, text.to_string()));
        self.handle_text
    }

    fn parser(&self) -> &dyn SurfaceParser<MemorySurface> {
        &MemoryParser
    }
}
