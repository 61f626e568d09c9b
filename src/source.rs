use crate::error::{BrowseError, Result};
use crate::types::EventRecord;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Where the browse screens get their candidate events from.
///
/// Implementations hand back whatever they have: no freshness, ordering or
/// de-duplication guarantees. Failures are reported here, before any data
/// reaches the pipeline.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Short name for logs
    fn source_name(&self) -> &'static str;

    async fn fetch_all(&self) -> Result<Vec<EventRecord>>;

    async fn fetch_by_id(&self, id: &str) -> Result<Option<EventRecord>>;
}

/// In-memory source for development/testing
#[derive(Debug, Default)]
pub struct InMemoryEventSource {
    events: RwLock<Vec<EventRecord>>,
}

impl InMemoryEventSource {
    pub fn new(events: Vec<EventRecord>) -> Self {
        Self {
            events: RwLock::new(events),
        }
    }

    /// Swap the whole collection, as a refreshed backend would.
    pub async fn replace(&self, events: Vec<EventRecord>) {
        let mut guard = self.events.write().await;
        debug!("Replacing {} in-memory events with {}", guard.len(), events.len());
        *guard = events;
    }
}

#[async_trait]
impl EventSource for InMemoryEventSource {
    fn source_name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_all(&self) -> Result<Vec<EventRecord>> {
        Ok(self.events.read().await.clone())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<EventRecord>> {
        let events = self.events.read().await;
        Ok(events.iter().find(|e| e.id == id).cloned())
    }
}

/// Reads a JSON array of events from a fixture file on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileEventSource {
    path: PathBuf,
}

impl JsonFileEventSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EventSource for JsonFileEventSource {
    fn source_name(&self) -> &'static str {
        "file"
    }

    async fn fetch_all(&self) -> Result<Vec<EventRecord>> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            BrowseError::Source {
                message: format!("Failed to read '{}': {}", self.path.display(), e),
            }
        })?;
        let events: Vec<EventRecord> = serde_json::from_str(&contents)?;
        info!("Loaded {} events from {}", events.len(), self.path.display());
        Ok(events)
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<EventRecord>> {
        Ok(self.fetch_all().await?.into_iter().find(|e| e.id == id))
    }
}

/// Thin wrapper over the events REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpEventSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEventSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn events_url(&self) -> String {
        format!("{}/events", self.base_url)
    }

    pub fn event_url(&self, id: &str) -> String {
        format!("{}/events/{}", self.base_url, id)
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    fn source_name(&self) -> &'static str {
        "http"
    }

    async fn fetch_all(&self) -> Result<Vec<EventRecord>> {
        let url = self.events_url();
        debug!("GET {}", url);
        let events = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<EventRecord>>()
            .await?;
        info!("Fetched {} events from {}", events.len(), url);
        Ok(events)
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<EventRecord>> {
        let url = self.event_url(id);
        debug!("GET {}", url);
        let resp = self.client.get(&url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let event = resp.error_for_status()?.json::<EventRecord>().await?;
        Ok(Some(event))
    }
}
