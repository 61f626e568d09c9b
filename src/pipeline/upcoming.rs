use super::sort::sort_events;
use crate::types::{EventRecord, SortKey};
use chrono::{DateTime, Utc};

/// Events strictly after `now`, earliest first, at most `cap` of them.
///
/// Events whose date does not parse are never upcoming.
pub fn upcoming(events: &[EventRecord], now: DateTime<Utc>, cap: usize) -> Vec<EventRecord> {
    let future: Vec<EventRecord> = events
        .iter()
        .filter(|event| event.parsed_date().is_some_and(|date| date > now))
        .cloned()
        .collect();
    let mut sorted = sort_events(future, SortKey::DateAsc);
    sorted.truncate(cap);
    sorted
}

/// [`upcoming`] against the current time, read fresh on every call.
pub fn upcoming_now(events: &[EventRecord], cap: usize) -> Vec<EventRecord> {
    upcoming(events, Utc::now(), cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_caps_and_sorts_future_events() {
        // Ten future events in scrambled order
        let events: Vec<EventRecord> = [7, 2, 9, 1, 5, 10, 3, 8, 4, 6]
            .iter()
            .map(|days| {
                let date = now() + Duration::days(*days);
                EventRecord::new(format!("d{days}"), "Show", date.to_rfc3339())
            })
            .collect();

        let result = upcoming(&events, now(), 6);
        let ids: Vec<&str> = result.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d2", "d3", "d4", "d5", "d6"]);

        assert_eq!(upcoming(&events, now(), 25).len(), 10);
        assert!(upcoming(&events, now(), 0).is_empty());
    }

    #[test]
    fn test_now_itself_is_not_upcoming() {
        let events = vec![
            EventRecord::new("now", "Now", now().to_rfc3339()),
            EventRecord::new("past", "Past", "2024-05-31"),
            EventRecord::new("later", "Later", "2024-06-01T12:00:01Z"),
            EventRecord::new("bad", "Bad", "tbd"),
        ];
        let result = upcoming(&events, now(), 6);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "later");
    }

    #[test]
    fn test_upcoming_now_reads_current_time() {
        let soon = Utc::now() + Duration::hours(1);
        let events = vec![
            EventRecord::new("soon", "Soon", soon.to_rfc3339()),
            EventRecord::new("old", "Old", "2000-01-01"),
        ];
        let result = upcoming_now(&events, 6);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "soon");
    }
}
