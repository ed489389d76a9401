//! Fixed-interval run polling under a hard deadline.
//!
//! The loop is split into a pure transition function ([`next_step`]) and
//! a driver ([`poll_run`]) that owns the side effects: sleeping on the
//! injected [`Clock`] and re-fetching the run from the [`AgentService`].
//!
//! ```text
//!            ┌──────────── fetch ◀──── sleep(interval) ◀──┐
//!            ▼                                            │
//!   status ──┬─ terminal ───────────────▶ Terminal        │
//!            ├─ elapsed > timeout ──────▶ TimedOut        │
//!            └─ otherwise ────────────────────────────────┘
//! ```
//!
//! The deadline is checked before each sleep, so a run is never fetched
//! after the deadline has passed.

use std::time::Duration;

use ra_agents::{AgentService, Run, RunStatus};
use ra_domain::error::Result;
use ra_domain::trace::TraceEvent;

use super::clock::Clock;

/// What the poller should do next for an observed status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    /// Sleep one interval, then fetch again.
    Continue,
    /// The run settled.
    Terminal,
    /// The deadline passed while the run was still in flight.
    TimedOut,
}

/// Transition function of the poll loop.
///
/// A terminal status wins over an expired deadline; the deadline only
/// expires once `elapsed` strictly exceeds `timeout`.
pub fn next_step(status: &RunStatus, elapsed: Duration, timeout: Duration) -> PollStep {
    if status.is_terminal() {
        PollStep::Terminal
    } else if elapsed > timeout {
        PollStep::TimedOut
    } else {
        PollStep::Continue
    }
}

/// How the poll loop ended.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    Terminal(Run),
    /// Carries the last observed (non-terminal) run.
    TimedOut(Run),
}

impl PollOutcome {
    pub fn run(&self) -> &Run {
        match self {
            PollOutcome::Terminal(run) | PollOutcome::TimedOut(run) => run,
        }
    }

    pub fn into_run(self) -> Run {
        match self {
            PollOutcome::Terminal(run) | PollOutcome::TimedOut(run) => run,
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, PollOutcome::TimedOut(_))
    }
}

/// Result of [`poll_run`] with loop statistics.
#[derive(Debug, Clone)]
pub struct PollReport {
    pub outcome: PollOutcome,
    pub sleeps: u32,
    pub elapsed: Duration,
}

/// Poll `run` until it settles or `timeout` elapses.
///
/// The clock starts when this function is entered, i.e. right after the
/// run was launched.  A failed fetch aborts polling and is returned as-is.
pub async fn poll_run(
    service: &dyn AgentService,
    clock: &dyn Clock,
    thread_id: &str,
    run: Run,
    interval: Duration,
    timeout: Duration,
) -> Result<PollReport> {
    let started = clock.now();
    let mut run = run;
    let mut sleeps: u32 = 0;

    loop {
        let elapsed = clock.now().saturating_sub(started);

        let outcome = match next_step(&run.status, elapsed, timeout) {
            PollStep::Continue => {
                clock.sleep(interval).await;
                sleeps += 1;
                run = service.get_run(thread_id, &run.id).await?;
                tracing::debug!(
                    run_id = %run.id,
                    status = %run.status,
                    sleeps,
                    "polled run"
                );
                continue;
            }
            PollStep::Terminal => PollOutcome::Terminal(run),
            PollStep::TimedOut => PollOutcome::TimedOut(run),
        };

        TraceEvent::RunPolled {
            run_id: outcome.run().id.clone(),
            status: outcome.run().status.to_string(),
            sleeps,
            elapsed_ms: elapsed.as_millis() as u64,
            timed_out: outcome.timed_out(),
        }
        .emit();

        return Ok(PollReport {
            outcome,
            sleeps,
            elapsed,
        });
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use ra_agents::{Thread, ThreadMessage};
    use ra_domain::error::Error;

    use super::*;

    /// Clock that only moves when slept on or advanced explicitly.
    #[derive(Default)]
    struct ManualClock {
        now_ms: AtomicU64,
    }

    impl ManualClock {
        fn advance(&self, ms: u64) {
            self.now_ms.fetch_add(ms, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Clock for ManualClock {
        fn now(&self) -> Duration {
            Duration::from_millis(self.now_ms.load(Ordering::SeqCst))
        }

        async fn sleep(&self, duration: Duration) {
            self.advance(duration.as_millis() as u64);
        }
    }

    /// Serves scripted statuses from `get_run`, each fetch costing
    /// `latency_ms` on the shared clock.
    struct ScriptedRuns {
        clock: Arc<ManualClock>,
        latency_ms: u64,
        statuses: Mutex<VecDeque<std::result::Result<&'static str, &'static str>>>,
        fetches: AtomicU32,
    }

    impl ScriptedRuns {
        fn new(clock: Arc<ManualClock>, latency_ms: u64, script: &[&'static str]) -> Self {
            Self {
                clock,
                latency_ms,
                statuses: Mutex::new(script.iter().map(|s| Ok(*s)).collect()),
                fetches: AtomicU32::new(0),
            }
        }

        fn fail_next(&self, message: &'static str) {
            self.statuses.lock().push_front(Err(message));
        }
    }

    #[async_trait]
    impl AgentService for ScriptedRuns {
        async fn create_thread(&self) -> Result<Thread> {
            unreachable!("poller never creates threads")
        }
        async fn create_message(&self, _: &str, _: &str) -> Result<ThreadMessage> {
            unreachable!("poller never creates messages")
        }
        async fn create_run(&self, _: &str, _: &str) -> Result<Run> {
            unreachable!("poller never creates runs")
        }
        async fn cancel_run(&self, _: &str, _: &str) -> Result<Run> {
            unreachable!("poller never cancels runs")
        }
        async fn list_messages(&self, _: &str) -> Result<Vec<ThreadMessage>> {
            unreachable!("poller never lists messages")
        }

        async fn get_run(&self, _thread_id: &str, run_id: &str) -> Result<Run> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.clock.advance(self.latency_ms);
            let next = self
                .statuses
                .lock()
                .pop_front()
                .unwrap_or(Ok("in_progress"));
            match next {
                Ok(status) => Ok(run(run_id, status)),
                Err(message) => Err(Error::Http(message.into())),
            }
        }
    }

    fn run(id: &str, status: &str) -> Run {
        Run {
            id: id.into(),
            thread_id: Some("thread_1".into()),
            status: RunStatus::from(status.to_owned()),
            last_error: None,
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn transition_function() {
        let queued = RunStatus::Queued;
        assert_eq!(next_step(&queued, ms(0), ms(3000)), PollStep::Continue);
        assert_eq!(next_step(&queued, ms(3000), ms(3000)), PollStep::Continue);
        assert_eq!(next_step(&queued, ms(3001), ms(3000)), PollStep::TimedOut);
        assert_eq!(
            next_step(&RunStatus::Completed, ms(9999), ms(3000)),
            PollStep::Terminal
        );
        assert_eq!(
            next_step(&RunStatus::Unknown("new_state".into()), ms(10), ms(3000)),
            PollStep::Continue
        );
    }

    #[tokio::test]
    async fn already_terminal_run_is_not_polled() {
        let clock = Arc::new(ManualClock::default());
        let svc = ScriptedRuns::new(clock.clone(), 5, &[]);

        let report = poll_run(&svc, clock.as_ref(), "thread_1", run("run_1", "failed"), ms(1000), ms(3000))
            .await
            .unwrap();

        assert!(!report.outcome.timed_out());
        assert_eq!(report.outcome.run().status, RunStatus::Failed);
        assert_eq!(report.sleeps, 0);
        assert_eq!(svc.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn settles_before_deadline() {
        let clock = Arc::new(ManualClock::default());
        let svc = ScriptedRuns::new(clock.clone(), 5, &["in_progress", "completed"]);

        let report = poll_run(&svc, clock.as_ref(), "thread_1", run("run_1", "queued"), ms(1000), ms(60_000))
            .await
            .unwrap();

        assert!(matches!(report.outcome, PollOutcome::Terminal(_)));
        assert_eq!(report.outcome.run().status, RunStatus::Completed);
        assert_eq!(report.sleeps, 2);
        assert_eq!(svc.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn deadline_checked_before_each_sleep() {
        // Completes only on the 4th fetch (~4s); the 3s deadline passes
        // after the 3rd fetch, so the 4th is never made.
        let clock = Arc::new(ManualClock::default());
        let svc = ScriptedRuns::new(
            clock.clone(),
            5,
            &["queued", "in_progress", "in_progress", "completed"],
        );

        let report = poll_run(&svc, clock.as_ref(), "thread_1", run("run_1", "queued"), ms(1000), ms(3000))
            .await
            .unwrap();

        assert!(report.outcome.timed_out());
        assert_eq!(report.outcome.run().status, RunStatus::InProgress);
        assert!(!report.outcome.run().status.is_terminal());
        assert_eq!(report.sleeps, 3);
        assert_eq!(svc.fetches.load(Ordering::SeqCst), 3);
        assert_eq!(report.elapsed, ms(3015));
    }

    #[tokio::test]
    async fn fetch_error_aborts_polling() {
        let clock = Arc::new(ManualClock::default());
        let svc = ScriptedRuns::new(clock.clone(), 5, &["completed"]);
        svc.fail_next("connection reset");

        let err = poll_run(&svc, clock.as_ref(), "thread_1", run("run_1", "queued"), ms(1000), ms(3000))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("connection reset"));
        assert_eq!(svc.fetches.load(Ordering::SeqCst), 1);
    }
}
