// Browse pipeline: filter by the settled query, then sort by the active key

pub mod filter;
pub mod sort;
pub mod upcoming;

pub use filter::{filter_events, matches_query};
pub use sort::{compare, sort_events};
pub use upcoming::{upcoming, upcoming_now};

use crate::types::{EventRecord, SortKey};
use serde::Serialize;
use tracing::debug;

/// Result of one filter + sort pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub events: Vec<EventRecord>,
    pub total_candidates: usize,
}

impl QueryOutcome {
    /// Nothing matched; the list should render its empty state.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

/// Run the full pipeline over a snapshot of the candidates.
pub fn run_query(candidates: &[EventRecord], query: &str, sort: SortKey) -> QueryOutcome {
    let filtered = filter_events(candidates, query);
    let events = sort_events(filtered, sort);
    debug!(
        query = %query,
        sort = %sort,
        candidates = candidates.len(),
        matched = events.len(),
        "Browse query evaluated"
    );
    QueryOutcome {
        events,
        total_candidates: candidates.len(),
    }
}
