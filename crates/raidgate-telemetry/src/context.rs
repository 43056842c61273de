//! Run-scoped span helpers.
//!
//! # Design
//! - Every pipeline invocation gets a fresh identifier recorded on a `run` span.
//! - The span can be created up front and entered later on a blocking worker thread.

use tracing::Span;
use tracing::span::EnteredSpan;
use uuid::Uuid;

use crate::init::build_sha;

/// Fresh identifier for one pipeline invocation.
#[must_use]
pub fn new_run_id() -> Uuid {
    Uuid::new_v4()
}

/// The `run` span carrying `run_id` and the build SHA.
#[must_use]
pub fn run_span(run_id: Uuid) -> Span {
    tracing::info_span!("run", run_id = %run_id, build_sha = %build_sha())
}

/// Guard that keeps a run span entered on the current thread.
pub struct RunContextGuard {
    _entered: EnteredSpan,
}

impl RunContextGuard {
    /// Enter an existing run span, e.g. on a blocking worker thread.
    #[must_use]
    pub fn enter(span: Span) -> Self {
        Self {
            _entered: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(new_run_id(), new_run_id());
    }

    #[test]
    fn run_span_can_be_entered_from_another_thread() {
        let guard = RunContextGuard::enter(run_span(new_run_id()));
        let span = run_span(new_run_id());
        let result = std::thread::spawn(move || {
            let _context = RunContextGuard::enter(span);
            21 * 2
        })
        .join();
        assert_eq!(result.ok(), Some(42));
        drop(guard);
    }
}
