//! Browsing-screen state holder.
//!
//! A [`BrowseSession`] is created when a browse screen mounts and disposed
//! when it goes away. It owns the candidate snapshot, the search box state,
//! the active sort key and the derived result list, and publishes every
//! change on a `watch` channel for the UI to render.

use crate::config::BrowseConfig;
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::pipeline::{run_query, upcoming_now, QueryOutcome};
use crate::source::EventSource;
use crate::types::{EventRecord, SearchQuery, SortKey};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Everything a browse screen renders from.
#[derive(Debug, Clone, Default)]
pub struct BrowseState {
    pub candidates: Arc<Vec<EventRecord>>,
    pub query: SearchQuery,
    pub sort: SortKey,
    pub outcome: QueryOutcome,
}

impl BrowseState {
    fn new(candidates: Vec<EventRecord>, sort: SortKey) -> Self {
        let mut state = Self {
            candidates: Arc::new(candidates),
            sort,
            ..Self::default()
        };
        state.recompute();
        state
    }

    fn recompute(&mut self) {
        self.outcome = run_query(&self.candidates, self.query.settled(), self.sort);
    }

    pub fn results(&self) -> &[EventRecord] {
        &self.outcome.events
    }

    /// True when the result list should show its empty state
    pub fn is_empty(&self) -> bool {
        self.outcome.is_empty()
    }
}

pub struct BrowseSession {
    source: Arc<dyn EventSource>,
    state: Arc<watch::Sender<BrowseState>>,
    disposed: Arc<AtomicBool>,
    debouncer: Debouncer,
    settle_loop: JoinHandle<()>,
}

impl BrowseSession {
    /// Fetch the candidates and start the debounce machinery.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn mount(source: Arc<dyn EventSource>, config: &BrowseConfig) -> Result<Self> {
        let candidates = source.fetch_all().await?;
        info!(
            source = source.source_name(),
            candidates = candidates.len(),
            sort = %config.default_sort,
            "Browse session mounted"
        );

        let (state, _) = watch::channel(BrowseState::new(candidates, config.default_sort));
        let state = Arc::new(state);

        let (settled_tx, mut settled_rx) = mpsc::unbounded_channel::<String>();
        let debouncer = Debouncer::spawn(config.debounce(), settled_tx);

        // The loop never keeps the channel open on its own
        let disposed = Arc::new(AtomicBool::new(false));
        let loop_state = Arc::downgrade(&state);
        let loop_disposed = Arc::clone(&disposed);
        let settle_loop = tokio::spawn(async move {
            while let Some(query) = settled_rx.recv().await {
                let Some(state) = loop_state.upgrade() else {
                    break;
                };
                state.send_if_modified(|s| {
                    if loop_disposed.load(Ordering::Acquire) || !s.query.settle(&query) {
                        return false;
                    }
                    s.recompute();
                    true
                });
            }
        });

        Ok(Self {
            source,
            state,
            disposed,
            debouncer,
            settle_loop,
        })
    }

    /// One keystroke in the search box. The filter catches up once typing
    /// pauses for the configured quiet period.
    pub fn type_query(&self, raw: impl Into<String>) {
        let raw = raw.into();
        self.state.send_if_modified(|s| {
            let changed = s.query.raw() != raw;
            s.query.record_raw(raw.clone());
            changed
        });
        self.debouncer.push(raw);
    }

    /// Apply `query` immediately, bypassing the quiet period.
    pub fn settle_now(&self, query: impl Into<String>) {
        let query = query.into();
        self.state.send_if_modified(|s| {
            s.query.record_raw(query.clone());
            if !s.query.settle(&query) {
                return false;
            }
            s.recompute();
            true
        });
    }

    pub fn select_sort(&self, sort: SortKey) {
        let changed = self.state.send_if_modified(|s| {
            if s.sort == sort {
                return false;
            }
            s.sort = sort;
            s.recompute();
            true
        });
        if changed {
            debug!(sort = %sort, "Sort changed");
        }
    }

    /// Re-fetch from the source and re-run against the settled query.
    pub async fn refresh(&self) -> Result<()> {
        let events = self.source.fetch_all().await?;
        info!(
            source = self.source.source_name(),
            candidates = events.len(),
            "Browse candidates refreshed"
        );
        self.replace_candidates(events);
        Ok(())
    }

    pub fn replace_candidates(&self, events: Vec<EventRecord>) {
        self.state.send_modify(|s| {
            s.candidates = Arc::new(events);
            s.recompute();
        });
    }

    /// Look up one event for a detail view.
    pub async fn event_details(&self, id: &str) -> Result<Option<EventRecord>> {
        self.source.fetch_by_id(id).await
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> BrowseState {
        self.state.borrow().clone()
    }

    pub fn results(&self) -> Vec<EventRecord> {
        self.state.borrow().outcome.events.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BrowseState> {
        self.state.subscribe()
    }

    /// Dashboard strip: next `cap` events after the current time.
    pub fn upcoming(&self, cap: usize) -> Vec<EventRecord> {
        let candidates = Arc::clone(&self.state.borrow().candidates);
        upcoming_now(&candidates, cap)
    }

    /// Unmount. Pending debounced queries are dropped unapplied.
    pub fn dispose(self) {}
}

impl Drop for BrowseSession {
    fn drop(&mut self) {
        // Flip the flag under the channel's write lock: a settle already in
        // progress on another worker finishes first, later ones see the flag
        let disposed = Arc::clone(&self.disposed);
        self.state.send_if_modified(|_| {
            disposed.store(true, Ordering::Release);
            false
        });
        self.settle_loop.abort();
        info!("Browse session disposed");
    }
}
