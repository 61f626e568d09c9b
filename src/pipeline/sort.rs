use crate::types::{EventRecord, SortKey};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Order two events under `key`.
///
/// Total and panic-free: unparseable dates act as the maximum date, absent
/// prices and popularity scores always sort after present ones.
pub fn compare(a: &EventRecord, b: &EventRecord, key: SortKey) -> Ordering {
    compare_values(&sort_value(a, key), &sort_value(b, key), key)
}

/// Stable sort: events with equal keys keep their input order.
pub fn sort_events(events: Vec<EventRecord>, key: SortKey) -> Vec<EventRecord> {
    // Extract each key once instead of reparsing dates per comparison
    let mut keyed: Vec<(SortValue, EventRecord)> = events
        .into_iter()
        .map(|event| (sort_value(&event, key), event))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_values(a, b, key));
    keyed.into_iter().map(|(_, event)| event).collect()
}

#[derive(Debug, Clone, Copy)]
enum SortValue {
    Date(Option<DateTime<Utc>>),
    Number(Option<f64>),
}

fn sort_value(event: &EventRecord, key: SortKey) -> SortValue {
    match key {
        SortKey::DateAsc | SortKey::DateDesc => SortValue::Date(event.parsed_date()),
        SortKey::PriceAsc | SortKey::PriceDesc => SortValue::Number(event.price()),
        SortKey::Popularity => SortValue::Number(event.popularity()),
    }
}

fn compare_values(a: &SortValue, b: &SortValue, key: SortKey) -> Ordering {
    match (a, b) {
        (SortValue::Date(a), SortValue::Date(b)) => {
            let ascending = unparsed_as_max(a, b);
            if key == SortKey::DateDesc {
                ascending.reverse()
            } else {
                ascending
            }
        }
        (SortValue::Number(a), SortValue::Number(b)) => {
            let descending = matches!(key, SortKey::PriceDesc | SortKey::Popularity);
            absent_last(a, b, descending)
        }
        // Both values always come from the same key
        _ => Ordering::Equal,
    }
}

/// `None` compares greater than every date.
fn unparsed_as_max(a: &Option<DateTime<Utc>>, b: &Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// `None` sorts after every number regardless of direction.
fn absent_last(a: &Option<f64>, b: &Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.total_cmp(a),
        (Some(a), Some(b)) => a.total_cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
