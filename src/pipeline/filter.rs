use crate::types::EventRecord;

/// Case-insensitive literal substring match against title, then venue.
///
/// An empty query matches everything. A missing venue only fails the venue
/// clause; the title clause still applies.
pub fn matches_query(event: &EventRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    matches_lowered(event, &query.to_lowercase())
}

fn matches_lowered(event: &EventRecord, needle: &str) -> bool {
    event.title.to_lowercase().contains(needle)
        || event
            .venue_name
            .as_deref()
            .is_some_and(|venue| venue.to_lowercase().contains(needle))
}

/// Keep the events matching `query`, in their original order.
pub fn filter_events(events: &[EventRecord], query: &str) -> Vec<EventRecord> {
    if query.is_empty() {
        return events.to_vec();
    }
    let needle = query.to_lowercase();
    events
        .iter()
        .filter(|event| matches_lowered(event, &needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<EventRecord> {
        vec![
            EventRecord::new("1", "Jazz Night", "2025-01-01").with_venue("Blue Room"),
            EventRecord::new("2", "Tech Expo", "2024-06-01").with_venue("Hall A"),
            EventRecord::new("3", "Open Mic", "2024-07-01"),
            EventRecord::new("4", "Late Set", "2024-08-01").with_venue("The JAZZ Cellar"),
        ]
    }

    fn ids(events: &[EventRecord]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_query_matches_title_case_insensitively() {
        let events = candidates();
        let filtered = filter_events(&events[..2], "jazz");
        assert_eq!(ids(&filtered), vec!["1"]);
        assert_eq!(filtered[0].title, "Jazz Night");
    }

    #[test]
    fn test_query_matches_venue() {
        let filtered = filter_events(&candidates(), "JAZZ");
        assert_eq!(ids(&filtered), vec!["1", "4"]);

        let filtered = filter_events(&candidates(), "hall");
        assert_eq!(ids(&filtered), vec!["2"]);
    }

    #[test]
    fn test_missing_venue_does_not_exclude_title_match() {
        let filtered = filter_events(&candidates(), "mic");
        assert_eq!(ids(&filtered), vec!["3"]);
        assert!(!matches_query(&candidates()[2], "room"));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let events = candidates();
        assert_eq!(filter_events(&events, ""), events);
        assert!(events.iter().all(|e| matches_query(e, "")));
    }

    #[test]
    fn test_literal_substring_only() {
        let events = candidates();
        // No tokenization: words out of order do not match
        assert!(filter_events(&events, "night jazz").is_empty());
        assert_eq!(ids(&filter_events(&events, "z n")), vec!["1"]);
        // No diacritic folding
        let cafe = vec![EventRecord::new("5", "Café Sessions", "2024-09-01")];
        assert!(filter_events(&cafe, "cafe").is_empty());
        assert_eq!(filter_events(&cafe, "CAFÉ").len(), 1);
    }

    #[test]
    fn test_filter_is_idempotent_and_keeps_duplicates() {
        let mut events = candidates();
        events.push(events[0].clone());
        let once = filter_events(&events, "jazz");
        let twice = filter_events(&once, "jazz");
        assert_eq!(once, twice);
        assert_eq!(ids(&once), vec!["1", "4", "1"]);
    }

    #[test]
    fn test_inclusion_iff_substring_of_title_or_venue() {
        let events = candidates();
        for query in ["", "a", "ZZ", "room", "expo", "x", "set", "cellar", "nope"] {
            let filtered = filter_events(&events, query);
            for event in &events {
                let q = query.to_lowercase();
                let expected = q.is_empty()
                    || event.title.to_lowercase().contains(&q)
                    || event
                        .venue_name
                        .as_ref()
                        .is_some_and(|v| v.to_lowercase().contains(&q));
                assert_eq!(filtered.contains(event), expected, "query {query:?} event {}", event.id);
            }
        }
    }
}
