//! Debounced search input.
//!
//! [`DebounceState`] is the clock-free core: callers hand it timestamps, which
//! keeps the timing rules testable without a runtime. [`Debouncer`] drives
//! that core from a tokio task and emits settled values on a channel.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

/// Pending-value bookkeeping for a trailing-edge debounce.
#[derive(Debug, Clone)]
pub struct DebounceState<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> DebounceState<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Replace whatever is pending with `value`, due `quiet` after `at`.
    pub fn push(&mut self, value: T, at: Instant) {
        self.pending = Some((value, at + self.quiet));
    }

    /// When the pending value becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Take the pending value if its deadline has passed.
    ///
    /// A value pushed at the very instant the pending one falls due must be
    /// pushed before polling at that instant; it then supersedes the old one.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending.take() {
            Some((value, due)) if now >= due => Some(value),
            other => {
                self.pending = other;
                None
            }
        }
    }

    /// Drop the pending value without emitting it.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Tokio-driven debouncer for raw query strings.
///
/// Every value passed to [`Debouncer::push`] restarts the quiet period; the
/// latest value is sent on the `settled` channel once no newer value arrives
/// within it. Dropping or disposing the debouncer aborts the worker, so no
/// value is emitted after teardown.
#[derive(Debug)]
pub struct Debouncer {
    input: mpsc::UnboundedSender<String>,
    worker: JoinHandle<()>,
}

impl Debouncer {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(quiet: Duration, settled: mpsc::UnboundedSender<String>) -> Self {
        let (input, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(DebounceState::new(quiet), rx, settled));
        debug!(quiet_ms = quiet.as_millis() as u64, "Debouncer started");
        Self { input, worker }
    }

    /// Feed one raw value. Ignored once the worker is gone.
    pub fn push(&self, raw: impl Into<String>) {
        let raw = raw.into();
        trace!(raw = %raw, "Raw query");
        let _ = self.input.send(raw);
    }

    /// Tear down, cancelling any pending emission.
    pub fn dispose(self) {
        // Drop does the work
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.worker.abort();
        debug!("Debouncer disposed");
    }
}

async fn run_worker(
    mut state: DebounceState<String>,
    mut input: mpsc::UnboundedReceiver<String>,
    settled: mpsc::UnboundedSender<String>,
) {
    loop {
        let deadline = state.deadline();
        tokio::select! {
            // Input first: a value arriving together with the deadline wins
            biased;
            next = input.recv() => match next {
                Some(raw) => state.push(raw, Instant::now()),
                None => break,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                while let Ok(raw) = input.try_recv() {
                    state.push(raw, Instant::now());
                }
                if let Some(value) = state.poll(Instant::now()) {
                    debug!(query = %value, "Query settled");
                    if settled.send(value).is_err() {
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_rapid_typing_settles_on_last_value() {
        let t0 = Instant::now();
        let mut state = DebounceState::new(ms(300));
        let mut emitted = Vec::new();

        // "j" at 0ms, "ja" at 50ms, "jazz" at 350ms, polled every 10ms
        state.push("j", t0);
        for step in (0..50).step_by(10) {
            emitted.extend(state.poll(t0 + ms(step)));
        }
        state.push("ja", t0 + ms(50));
        for step in (50..350).step_by(10) {
            emitted.extend(state.poll(t0 + ms(step)));
        }
        // "ja" falls due at 350ms, the same instant "jazz" arrives
        assert_eq!(state.deadline(), Some(t0 + ms(350)));
        state.push("jazz", t0 + ms(350));
        for step in (350..=700).step_by(10) {
            emitted.extend(state.poll(t0 + ms(step)));
        }

        assert_eq!(emitted, vec!["jazz"]);
        assert!(!state.is_pending());
    }

    #[test]
    fn test_emits_exactly_at_deadline() {
        let t0 = Instant::now();
        let mut state = DebounceState::new(ms(300));
        state.push("jazz".to_string(), t0 + ms(350));
        assert_eq!(state.deadline(), Some(t0 + ms(650)));
        assert_eq!(state.poll(t0 + ms(649)), None);
        assert_eq!(state.poll(t0 + ms(650)).as_deref(), Some("jazz"));
        assert_eq!(state.poll(t0 + ms(900)), None);
    }

    #[test]
    fn test_push_at_due_instant_supersedes_pending() {
        let t0 = Instant::now();
        let mut state = DebounceState::new(ms(300));
        state.push("ja", t0);
        state.push("jazz", t0 + ms(300));
        assert_eq!(state.poll(t0 + ms(300)), None);
        assert_eq!(state.poll(t0 + ms(600)), Some("jazz"));
    }

    #[test]
    fn test_cancel_drops_pending_value() {
        let t0 = Instant::now();
        let mut state = DebounceState::new(ms(300));
        state.push("j", t0);
        assert!(state.cancel());
        assert_eq!(state.poll(t0 + ms(1_000)), None);
        assert!(!state.cancel());
    }

    #[test]
    fn test_empty_string_is_emitted() {
        let t0 = Instant::now();
        let mut state = DebounceState::new(ms(300));
        state.push(String::new(), t0);
        assert_eq!(state.poll(t0 + ms(300)), Some(String::new()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_emits_once_for_a_burst() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::spawn(ms(300), tx);

        debouncer.push("j");
        tokio::time::sleep(ms(50)).await;
        debouncer.push("ja");
        tokio::time::sleep(ms(250)).await;
        debouncer.push("jazz");
        tokio::time::sleep(ms(1_000)).await;

        assert_eq!(rx.try_recv().ok().as_deref(), Some("jazz"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_newer_value_wins_deadline_tie() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::spawn(ms(300), tx);

        // "ja" is due at 350ms, exactly when "jazz" arrives
        debouncer.push("j");
        tokio::time::sleep(ms(50)).await;
        debouncer.push("ja");
        tokio::time::sleep(ms(300)).await;
        debouncer.push("jazz");
        tokio::time::sleep(ms(2_000)).await;

        let mut emitted = Vec::new();
        while let Ok(value) = rx.try_recv() {
            emitted.push(value);
        }
        assert_eq!(emitted, vec!["jazz".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_settles_each_quiet_window() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::spawn(ms(300), tx);

        debouncer.push("rock");
        tokio::time::sleep(ms(500)).await;
        debouncer.push("");
        tokio::time::sleep(ms(500)).await;

        assert_eq!(rx.try_recv().ok().as_deref(), Some("rock"));
        assert_eq!(rx.try_recv().ok().as_deref(), Some(""));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_pending_emission() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::spawn(ms(300), tx);

        debouncer.push("j");
        tokio::time::sleep(ms(100)).await;
        debouncer.dispose();
        tokio::time::sleep(ms(1_000)).await;

        assert!(rx.try_recv().is_err());
    }
}
