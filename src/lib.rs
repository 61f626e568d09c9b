pub mod config;
pub mod constants;
pub mod debounce;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod session;
pub mod source;
pub mod types;

pub use error::{BrowseError, Result};
pub use pipeline::{run_query, QueryOutcome};
pub use session::{BrowseSession, BrowseState};
pub use source::EventSource;
pub use types::{EventRecord, SearchQuery, SortKey};
