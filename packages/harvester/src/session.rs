//! Shared run state and cross-thread signaling.
//!
//! One `SessionState` is shared (via `Arc`) between the pipeline and the
//! issuing side. The pipeline writes the flags; the observer reads them at
//! any time and clears them between runs. Cancellation is advisory: it is
//! polled at the top of every per-category, per-record and per-download
//! iteration, and an in-flight network call is never forcibly aborted.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Lifecycle of a run. Only one run may be active at a time; serializing
/// runs is the caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Cancelled,
    TimedOut,
}

impl RunPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => RunPhase::Running,
            2 => RunPhase::Cancelled,
            3 => RunPhase::TimedOut,
            _ => RunPhase::Idle,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            RunPhase::Idle => 0,
            RunPhase::Running => 1,
            RunPhase::Cancelled => 2,
            RunPhase::TimedOut => 3,
        }
    }
}

/// Process-wide run state: cancellation, coarse failure flags and the
/// running download total.
///
/// The cancellation token lives behind a lock because a cancelled token
/// cannot be reused; `begin_run` installs a fresh one.
pub struct SessionState {
    cancel: RwLock<CancellationToken>,
    timeout_hit: AtomicBool,
    empty_worklist: AtomicBool,
    downloaded: AtomicUsize,
    phase: AtomicU8,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            cancel: RwLock::new(CancellationToken::new()),
            timeout_hit: AtomicBool::new(false),
            empty_worklist: AtomicBool::new(false),
            downloaded: AtomicUsize::new(0),
            phase: AtomicU8::new(RunPhase::Idle.as_u8()),
        }
    }

    /// Reset flags and counters, install a fresh cancellation token and
    /// enter `Running`.
    pub fn begin_run(&self) {
        *self.cancel.write().unwrap() = CancellationToken::new();
        self.timeout_hit.store(false, Ordering::SeqCst);
        self.empty_worklist.store(false, Ordering::SeqCst);
        self.downloaded.store(0, Ordering::SeqCst);
        self.phase
            .store(RunPhase::Running.as_u8(), Ordering::SeqCst);
    }

    /// Resolve the terminal phase for the run that just ended.
    pub fn finish_run(&self) {
        let phase = if self.is_cancelled() {
            RunPhase::Cancelled
        } else if self.timeout_flagged() {
            RunPhase::TimedOut
        } else {
            RunPhase::Idle
        };
        self.phase.store(phase.as_u8(), Ordering::SeqCst);
    }

    pub fn phase(&self) -> RunPhase {
        RunPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// Request cooperative cancellation of the active run.
    pub fn request_cancel(&self) {
        self.cancel.read().unwrap().cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.read().unwrap().is_cancelled()
    }

    /// A clone of the active run's cancellation token, for `select!`-style
    /// integration on the issuing side.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.read().unwrap().clone()
    }

    /// Record an unrecoverable wait or download failure somewhere in the
    /// run. Coarse by design; per-failure detail goes to the progress sink
    /// and the log.
    pub fn flag_timeout(&self) {
        self.timeout_hit.store(true, Ordering::SeqCst);
    }

    pub fn timeout_flagged(&self) -> bool {
        self.timeout_hit.load(Ordering::SeqCst)
    }

    pub fn clear_timeout_flag(&self) {
        self.timeout_hit.store(false, Ordering::SeqCst);
    }

    /// Record that a run was started with nothing to do.
    pub fn flag_empty_worklist(&self) {
        self.empty_worklist.store(true, Ordering::SeqCst);
    }

    pub fn empty_worklist_flagged(&self) -> bool {
        self.empty_worklist.load(Ordering::SeqCst)
    }

    pub fn clear_empty_worklist_flag(&self) {
        self.empty_worklist.store(false, Ordering::SeqCst);
    }

    /// Add to the running download total.
    pub fn note_downloads(&self, count: usize) {
        self.downloaded.fetch_add(count, Ordering::SeqCst);
    }

    /// Files downloaded since the run began.
    pub fn downloads(&self) -> usize {
        self.downloaded.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_run_resets_everything() {
        let session = SessionState::new();
        session.flag_timeout();
        session.flag_empty_worklist();
        session.note_downloads(3);
        session.request_cancel();

        session.begin_run();
        assert_eq!(session.phase(), RunPhase::Running);
        assert!(!session.timeout_flagged());
        assert!(!session.empty_worklist_flagged());
        assert!(!session.is_cancelled());
        assert_eq!(session.downloads(), 0);
    }

    #[test]
    fn test_finish_run_resolves_phase() {
        let session = SessionState::new();

        session.begin_run();
        session.finish_run();
        assert_eq!(session.phase(), RunPhase::Idle);

        session.begin_run();
        session.flag_timeout();
        session.finish_run();
        assert_eq!(session.phase(), RunPhase::TimedOut);

        session.begin_run();
        session.request_cancel();
        session.flag_timeout();
        session.finish_run();
        // Cancellation wins over the timeout flag.
        assert_eq!(session.phase(), RunPhase::Cancelled);
    }

    #[test]
    fn test_download_counter_accumulates() {
        let session = SessionState::new();
        session.begin_run();
        session.note_downloads(2);
        session.note_downloads(1);
        assert_eq!(session.downloads(), 3);
    }

    #[test]
    fn test_cancel_token_tracks_run() {
        let session = SessionState::new();
        session.begin_run();
        let token = session.cancel_token();
        assert!(!token.is_cancelled());
        session.request_cancel();
        assert!(token.is_cancelled());
        assert!(session.is_cancelled());

        // A new run gets a fresh token; the old clone stays cancelled.
        session.begin_run();
        assert!(!session.is_cancelled());
        assert!(token.is_cancelled());
    }
}
