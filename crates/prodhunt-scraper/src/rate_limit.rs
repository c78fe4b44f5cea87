//! Politeness pacing between successive requests to one source.

use std::time::Duration;

use tokio::time::Instant;

/// Enforces a minimum idle gap between consecutive fetches.
///
/// The gap runs from the end of one fetch (recorded with
/// [`PolitenessGate::mark`]) to the start of the next, so a slow response does
/// not eat into it. [`PolitenessGate::wait`] returns immediately until the
/// first mark. One gate is owned by each crawl, so sources are paced
/// independently.
#[derive(Debug)]
pub(crate) struct PolitenessGate {
    gap: Duration,
    last: Option<Instant>,
}

impl PolitenessGate {
    pub(crate) fn new(gap: Duration) -> Self {
        Self { gap, last: None }
    }

    pub(crate) async fn wait(&mut self) {
        if let Some(last) = self.last {
            let ready_at = last + self.gap;
            if Instant::now() < ready_at {
                tracing::trace!(gap_ms = self.gap.as_millis(), "politeness delay");
                tokio::time::sleep_until(ready_at).await;
            }
        }
    }

    /// Records that a fetch just finished.
    pub(crate) fn mark(&mut self) {
        self.last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_wait_does_not_sleep() {
        let mut gate = PolitenessGate::new(Duration::from_secs(5));
        let start = Instant::now();
        gate.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn later_waits_are_spaced_by_gap() {
        let gap = Duration::from_millis(750);
        let mut gate = PolitenessGate::new(gap);
        let start = Instant::now();
        for _ in 0..4 {
            gate.wait().await;
            gate.mark();
        }
        assert_eq!(start.elapsed(), gap * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_time_after_mark_counts_toward_gap() {
        let gap = Duration::from_secs(2);
        let mut gate = PolitenessGate::new(gap);
        gate.mark();
        tokio::time::sleep(Duration::from_secs(3)).await;
        let before = Instant::now();
        gate.wait().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn gap_is_measured_from_mark_not_from_wait() {
        let gap = Duration::from_secs(1);
        let mut gate = PolitenessGate::new(gap);
        gate.wait().await;
        // A fetch slower than the gap.
        tokio::time::sleep(Duration::from_secs(2)).await;
        gate.mark();
        let before = Instant::now();
        gate.wait().await;
        assert_eq!(before.elapsed(), gap);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_gap_never_sleeps() {
        let mut gate = PolitenessGate::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..10 {
            gate.wait().await;
            gate.mark();
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
