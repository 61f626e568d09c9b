use crate::constants;
use crate::error::BrowseError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Event as produced by the event-source collaborator.
///
/// Only the fields the browse pipeline reads are modelled. Optional fields
/// stay optional: the pipeline maps each absence to a defined sentinel
/// instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_name: Option<String>,
    /// Raw timestamp as delivered; parsed lazily by [`EventRecord::parsed_date`]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity_score: Option<f64>,
}

impl EventRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            venue_name: None,
            date: date.into(),
            min_price: None,
            popularity_score: None,
        }
    }

    pub fn with_venue(mut self, venue_name: impl Into<String>) -> Self {
        self.venue_name = Some(venue_name.into());
        self
    }

    pub fn with_min_price(mut self, min_price: f64) -> Self {
        self.min_price = Some(min_price);
        self
    }

    pub fn with_popularity(mut self, score: f64) -> Self {
        self.popularity_score = Some(score);
        self
    }

    /// Parse `date` into UTC. Returns `None` for anything unparseable.
    ///
    /// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (taken as UTC) and a
    /// bare `YYYY-MM-DD` (midnight UTC).
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        parse_event_date(&self.date)
    }

    /// `min_price` with NaN folded into absence
    pub fn price(&self) -> Option<f64> {
        self.min_price.filter(|p| !p.is_nan())
    }

    /// `popularity_score` with NaN folded into absence
    pub fn popularity(&self) -> Option<f64> {
        self.popularity_score.filter(|s| !s.is_nan())
    }
}

pub fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// The active ordering of the browse list. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    DateAsc,
    DateDesc,
    PriceAsc,
    PriceDesc,
    Popularity,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::DateAsc => constants::SORT_DATE_ASC,
            SortKey::DateDesc => constants::SORT_DATE_DESC,
            SortKey::PriceAsc => constants::SORT_PRICE_ASC,
            SortKey::PriceDesc => constants::SORT_PRICE_DESC,
            SortKey::Popularity => constants::SORT_POPULARITY,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = BrowseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            constants::SORT_DATE_ASC => Ok(SortKey::DateAsc),
            constants::SORT_DATE_DESC => Ok(SortKey::DateDesc),
            constants::SORT_PRICE_ASC => Ok(SortKey::PriceAsc),
            constants::SORT_PRICE_DESC => Ok(SortKey::PriceDesc),
            constants::SORT_POPULARITY => Ok(SortKey::Popularity),
            _ => Err(BrowseError::UnknownSortKey(s.to_string())),
        }
    }
}

/// Search box state: what was typed and what the filter consumes.
///
/// `settled` only ever takes a value that was previously recorded as `raw`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    raw: String,
    settled: String,
    #[serde(skip)]
    history: Vec<String>,
}

impl SearchQuery {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn settled(&self) -> &str {
        &self.settled
    }

    /// Record a keystroke.
    pub fn record_raw(&mut self, raw: impl Into<String>) {
        let raw = raw.into();
        if self.history.last() != Some(&raw) {
            self.history.push(raw.clone());
        }
        self.raw = raw;
    }

    /// Settle on `value` if it was typed at some point. Returns whether the
    /// settled query changed.
    pub fn settle(&mut self, value: &str) -> bool {
        if !value.is_empty() && !self.history.iter().any(|typed| typed == value) {
            return false;
        }
        // Values typed before the settled one can never settle again
        if let Some(pos) = self.history.iter().rposition(|typed| typed == value) {
            self.history.drain(..pos);
        }
        if self.settled == value {
            return false;
        }
        self.settled = value.to_string();
        true
    }
}
