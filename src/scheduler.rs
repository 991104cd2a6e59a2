//! Debounced recomputation after structural edits.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

/// Flag handed to a running job. Flips once a newer job supersedes it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Job whose debounce delay ran out.
#[derive(Debug)]
pub struct ReadyJob<J> {
    pub job: J,
    pub token: CancellationToken,
}

#[derive(Debug)]
struct Pending<J> {
    job: J,
    due: Duration,
    token: CancellationToken,
}

/// One pending slot with a debounce delay.
///
/// Scheduling replaces the pending job and cancels the token of the job that
/// was handed out last, so at most one recomputation is ever current.
#[derive(Debug)]
pub struct RecomputeScheduler<J> {
    delay: Duration,
    pending: Option<Pending<J>>,
    running: Option<CancellationToken>,
}

impl<J> RecomputeScheduler<J> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            running: None,
        }
    }

    /// Queues `job` to become ready `delay` after `now`.
    pub fn schedule(&mut self, job: J, now: Duration) {
        if let Some(previous) = self.pending.take() {
            log::trace!("pending recompute replaced");
            previous.token.cancel();
        }
        if let Some(running) = self.running.take() {
            running.cancel();
        }
        self.pending = Some(Pending {
            job,
            due: now + self.delay,
            token: CancellationToken::new(),
        });
    }

    /// Drops the pending job and cancels the running one.
    pub fn cancel(&mut self) {
        if let Some(p) = self.pending.take() {
            p.token.cancel();
        }
        if let Some(running) = self.running.take() {
            running.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Hands out the pending job once it is due.
    pub fn poll(&mut self, now: Duration) -> Option<ReadyJob<J>> {
        if self.pending.as_ref()?.due > now {
            return None;
        }
        let Pending { job, token, .. } = self.pending.take()?;
        self.running = Some(token.clone());
        Some(ReadyJob { job, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn job_waits_for_delay() {
        let mut s = RecomputeScheduler::new(ms(300));
        s.schedule("layout", ms(0));
        assert!(s.poll(ms(299)).is_none());
        let ready = s.poll(ms(300)).unwrap();
        assert_eq!(ready.job, "layout");
        assert!(!ready.token.is_cancelled());
        assert!(s.poll(ms(1000)).is_none());
    }

    #[test]
    fn rescheduling_debounces() {
        let mut s = RecomputeScheduler::new(ms(300));
        s.schedule(1, ms(0));
        s.schedule(2, ms(200));
        assert!(s.poll(ms(300)).is_none());
        assert_eq!(s.poll(ms(500)).unwrap().job, 2);
    }

    #[test]
    fn newer_job_cancels_running_one() {
        let mut s = RecomputeScheduler::new(ms(0));
        s.schedule(1, ms(0));
        let first = s.poll(ms(0)).unwrap();
        s.schedule(2, ms(10));
        assert!(first.token.is_cancelled());
        let second = s.poll(ms(10)).unwrap();
        assert!(!second.token.is_cancelled());
    }

    #[test]
    fn cancel_clears_everything() {
        let mut s = RecomputeScheduler::new(ms(0));
        s.schedule(1, ms(0));
        let running = s.poll(ms(0)).unwrap();
        s.schedule(2, ms(0));
        s.cancel();
        assert!(!s.is_pending());
        assert!(running.token.is_cancelled());
        assert!(s.poll(ms(100)).is_none());
    }
}
