//! Debounced change sessions.
//!
//! Surface mutation notifications arrive in bursts. The controller gathers
//! them into one session per view and reconciles once the surface has been
//! idle for `ReconcileConfig::idle_timeout`, or when the host asks for it
//! explicitly. During IME composition the idle timer is held back so that
//! partial composition text is never parsed.

use web_time::Instant;

use weaver_editor_model::{EditorState, Mapping, Transaction};

use crate::config::ReconcileConfig;
use crate::error::ReconcileError;
use crate::host::{ReconcileHost, SessionId};
use crate::ids::IdAllocator;
use crate::patch::{ReconcileOutcome, reconcile};
use crate::range::DocRange;
use crate::surface::Surface;
use crate::timer::{Timer, TimerHandle};

/// Result of finishing a session. `Ok(None)` means nothing ran.
pub type FinishOutcome = Result<Option<ReconcileOutcome>, ReconcileError>;

/// Pending state for one batched surface edit.
#[derive(Debug)]
struct ChangeSession {
    id: SessionId,
    /// Document and selection the surface represented when the session
    /// started.
    snapshot: EditorState,
    range: Option<DocRange>,
    composing: bool,
    timeout: Option<TimerHandle>,
    /// Model changes applied by others since `snapshot`.
    mapping: Mapping,
    started: Instant,
}

/// Owns the single active change session of a view.
#[derive(Debug)]
pub struct DomChangeController<T: Timer, I: IdAllocator> {
    config: ReconcileConfig,
    timer: T,
    ids: I,
    active: Option<ChangeSession>,
}

impl<T: Timer, I: IdAllocator> DomChangeController<T, I> {
    pub fn new(config: ReconcileConfig, timer: T, ids: I) -> Self {
        Self {
            config,
            timer,
            ids,
            active: None,
        }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_composing(&self) -> bool {
        self.active.as_ref().is_some_and(|s| s.composing)
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.active.as_ref().map(|s| s.id)
    }

    /// Handle of the idle timer currently armed for the session.
    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.active.as_ref().and_then(|s| s.timeout)
    }

    /// Begin a session, or extend the active one.
    ///
    /// A new session snapshots the host state and arms the idle timer
    /// unless `composing`. An active session only reacts to composition,
    /// which cancels its timer until `composition_end`.
    pub fn start<S, H>(&mut self, host: &mut H, composing: bool) -> SessionId
    where
        S: Surface + ?Sized,
        H: ReconcileHost<S> + ?Sized,
    {
        if let Some(session) = self.active.as_mut() {
            if composing {
                if let Some(handle) = session.timeout.take() {
                    self.timer.cancel(handle);
                }
                session.composing = true;
                tracing::trace!(
                    target: "weaver::reconcile",
                    session_id = %session.id,
                    "session extended by composition"
                );
            }
            return session.id;
        }

        let id = self.ids.next_id();
        let timeout = (!composing).then(|| self.timer.schedule(self.config.idle_duration()));
        self.active = Some(ChangeSession {
            id,
            snapshot: host.state(),
            range: None,
            composing,
            timeout,
            mapping: Mapping::new(),
            started: Instant::now(),
        });
        tracing::debug!(target: "weaver::reconcile", session_id = %id, composing, "session started");
        host.on_session_start(id);
        id
    }

    /// Widen the session's range to include `from..to`.
    pub fn add_range(&mut self, from: usize, to: usize) {
        let Some(session) = self.active.as_mut() else {
            tracing::trace!(target: "weaver::reconcile", from, to, "add_range without a session");
            return;
        };
        let range = DocRange::new(from, to);
        session.range = Some(match session.range {
            Some(current) => current.union(range),
            None => range,
        });
        if !session.composing {
            if let Some(handle) = session.timeout.take() {
                self.timer.cancel(handle);
            }
            session.timeout = Some(self.timer.schedule(self.config.idle_duration()));
        }
    }

    /// Composition finished: clear the flag and arm the idle timer.
    pub fn composition_end(&mut self) {
        let Some(session) = self.active.as_mut() else {
            tracing::trace!(target: "weaver::reconcile", "composition_end without a session");
            return;
        };
        session.composing = false;
        if let Some(handle) = session.timeout.take() {
            self.timer.cancel(handle);
        }
        session.timeout = Some(self.timer.schedule(self.config.idle_duration()));
    }

    /// Record a model change applied by another source mid-session.
    pub fn note_mapping(&mut self, mapping: &Mapping) {
        if let Some(session) = self.active.as_mut() {
            session.mapping.append_mapping(mapping);
        }
    }

    pub fn note_transaction(&mut self, tr: &Transaction) {
        self.note_mapping(tr.mapping());
    }

    /// Timer callback. Fires for anything but the session's current timer
    /// are ignored.
    pub fn on_timer<S, H>(&mut self, handle: TimerHandle, surface: &mut S, host: &mut H) -> FinishOutcome
    where
        S: Surface + ?Sized,
        H: ReconcileHost<S> + ?Sized,
    {
        let current = self.active.as_ref().and_then(|s| s.timeout);
        if current != Some(handle) {
            tracing::trace!(target: "weaver::reconcile", ?handle, "stale timer fire");
            return Ok(None);
        }
        if let Some(session) = self.active.as_mut() {
            session.timeout = None;
        }
        self.finish(surface, host)
    }

    /// Reconcile the session now.
    ///
    /// A composing session is left untouched. Otherwise the session is
    /// cleared and `on_session_end` signalled whatever the outcome.
    pub fn finish<S, H>(&mut self, surface: &mut S, host: &mut H) -> FinishOutcome
    where
        S: Surface + ?Sized,
        H: ReconcileHost<S> + ?Sized,
    {
        let Some(session) = self.active.as_mut() else {
            return Ok(None);
        };
        if let Some(handle) = session.timeout.take() {
            self.timer.cancel(handle);
        }
        if session.composing {
            tracing::trace!(
                target: "weaver::reconcile",
                session_id = %session.id,
                "finish deferred while composing"
            );
            return Ok(None);
        }
        let Some(session) = self.active.take() else {
            return Ok(None);
        };

        let result = reconcile(
            surface,
            host,
            &self.config,
            &session.snapshot,
            session.range,
            &session.mapping,
        );
        let elapsed = session.started.elapsed();
        match &result {
            Ok(outcome) => tracing::debug!(
                target: "weaver::reconcile",
                session_id = %session.id,
                ?elapsed,
                outcome = outcome_name(outcome),
                "session ended"
            ),
            Err(err) => tracing::warn!(
                target: "weaver::reconcile",
                session_id = %session.id,
                ?elapsed,
                error = %err,
                "surface change dropped"
            ),
        }
        host.on_session_end(session.id);
        result.map(Some)
    }
}

fn outcome_name(outcome: &ReconcileOutcome) -> &'static str {
    match outcome {
        ReconcileOutcome::NoChange => "no_change",
        ReconcileOutcome::HandledByHost => "handled_by_host",
        ReconcileOutcome::Transaction(_) => "transaction",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::memory::{MemoryParser, MemorySurface};
    use crate::surface::SurfaceParser;
    use crate::timer::ManualTimer;
    use weaver_editor_model::Selection;
    use weaver_editor_model::basic::{doc, p};
    use web_time::Duration;

    struct StaticHost {
        state: EditorState,
        started: Vec<SessionId>,
        ended: Vec<SessionId>,
    }

    impl ReconcileHost<MemorySurface> for StaticHost {
        fn state(&self) -> EditorState {
            self.state.clone()
        }

        fn on_session_start(&mut self, id: SessionId) {
            self.started.push(id);
        }

        fn on_session_end(&mut self, id: SessionId) {
            self.ended.push(id);
        }

        fn on_transaction(&mut self, _tr: &Transaction, _scroll_into_view: bool) {}

        fn parser(&self) -> &dyn SurfaceParser<MemorySurface> {
            &MemoryParser
        }
    }

    fn setup() -> (
        DomChangeController<ManualTimer, SequentialIds>,
        MemorySurface,
        StaticHost,
    ) {
        let d = doc([p("hello")]);
        let surface = MemorySurface::render(&d);
        let host = StaticHost {
            state: EditorState::new(d, Selection::collapsed(3)),
            started: Vec::new(),
            ended: Vec::new(),
        };
        let controller =
            DomChangeController::new(ReconcileConfig::default(), ManualTimer::new(), SequentialIds::new());
        (controller, surface, host)
    }

    #[test]
    fn test_start_twice_keeps_one_session() {
        let (mut controller, _surface, mut host) = setup();
        let first = controller.start::<MemorySurface, _>(&mut host, false);
        let second = controller.start::<MemorySurface, _>(&mut host, false);
        assert_eq!(first, second);
        assert_eq!(host.started, vec![first]);
        assert_eq!(controller.timer().pending_count(), 1);
    }

    #[test]
    fn test_add_range_rearms_timer() {
        let (mut controller, _surface, mut host) = setup();
        controller.start::<MemorySurface, _>(&mut host, false);
        let first = controller.pending_timer().unwrap();
        controller.add_range(1, 2);
        let second = controller.pending_timer().unwrap();
        assert_ne!(first, second);
        assert!(!controller.timer().is_pending(first));
        assert_eq!(controller.timer().pending_count(), 1);
    }

    #[test]
    fn test_add_range_without_session_is_ignored() {
        let (mut controller, _surface, _host) = setup();
        controller.add_range(1, 2);
        controller.composition_end();
        assert!(!controller.is_active());
        assert_eq!(controller.timer().pending_count(), 0);
    }

    #[test]
    fn test_unchanged_surface_finishes_with_no_change() {
        let (mut controller, mut surface, mut host) = setup();
        let id = controller.start::<MemorySurface, _>(&mut host, false);
        let fired = controller.timer_mut().advance(Duration::from_millis(50));
        assert_eq!(fired.len(), 1);
        let outcome = controller.on_timer(fired[0], &mut surface, &mut host).unwrap();
        assert!(matches!(outcome, Some(ReconcileOutcome::NoChange)));
        assert_eq!(host.ended, vec![id]);
        assert!(!controller.is_active());
    }

    #[test]
    fn test_finish_without_session_is_noop() {
        let (mut controller, mut surface, mut host) = setup();
        assert!(controller.finish(&mut surface, &mut host).unwrap().is_none());
        assert!(host.ended.is_empty());
    }
}
