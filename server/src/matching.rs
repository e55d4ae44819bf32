//! Derives which published events a vendor should see.
//!
//! An event matches when it is published and its state code is one of the
//! vendor's service states. Coordinates and travel radius take no part.

use crate::models::Event;

pub fn is_match(event: &Event, service_states: &[String]) -> bool {
    event.is_published && service_states.iter().any(|code| *code == event.state)
}

/// Filters `events` down to the vendor's matches, newest first.
pub fn matching_events<'a, I>(events: I, service_states: &[String]) -> Vec<Event>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut matches: Vec<Event> = events
        .into_iter()
        .filter(|event| is_match(event, service_states))
        .cloned()
        .collect();
    matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    fn event(state: &str, is_published: bool) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            title: format!("Gala in {state}"),
            description: String::new(),
            date: None,
            start_time: None,
            end_time: None,
            city: "Somewhere".to_string(),
            state: state.to_string(),
            country: "US".to_string(),
            latitude: None,
            longitude: None,
            needs_sound: true,
            needs_lighting: false,
            needs_video: false,
            needs_staging: false,
            full_service_package: false,
            is_published,
            created_at: now,
            updated_at: now,
        }
    }

    fn codes(values: &[&str]) -> Vec<String> {
        values.iter().map(|code| code.to_string()).collect()
    }

    #[rstest]
    #[case("CA", true, &["CA", "NY"], true)]
    #[case("NY", true, &["CA", "NY"], true)]
    #[case("CA", false, &["CA", "NY"], false)]
    #[case("TX", true, &["CA", "NY"], false)]
    #[case("CA", true, &[], false)]
    #[case("ca", true, &["CA"], false)]
    fn match_requires_published_and_served_state(
        #[case] state: &str,
        #[case] published: bool,
        #[case] served: &[&str],
        #[case] expected: bool,
    ) {
        assert_eq!(is_match(&event(state, published), &codes(served)), expected);
    }

    #[test]
    fn matching_events_are_newest_first() {
        let mut older = event("CA", true);
        older.created_at = Utc::now() - Duration::days(2);
        let newer = event("NY", true);
        let hidden = event("TX", true);

        let events = vec![older.clone(), hidden, newer.clone()];
        let result = matching_events(&events, &codes(&["CA", "NY"]));

        let ids: Vec<Uuid> = result.iter().map(|event| event.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }
}
