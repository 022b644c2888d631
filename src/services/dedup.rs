use std::collections::HashMap;

use crate::domain::Event;
use crate::normalize::normalize;

/// Grouping key for recurring listings: normalized title plus the venue part
/// of the location (the substring before the first comma).
fn dedup_key(event: &Event) -> String {
    let title = normalize(&event.title);
    let venue_token = event
        .location
        .split(',')
        .next()
        .map(normalize)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    format!("{}::{}", title, venue_token)
}

/// Collapse external events that are the same recurring listing (same
/// normalized title + venue) into one record. The surviving record keeps the
/// earliest occurrence as its `start_time`; all other occurrences land in
/// `extra_dates`, ascending and deduplicated, never including `start_time`.
///
/// Encounter order of first occurrences is preserved. Undated occurrences
/// are absorbed into their group without contributing an extra date and
/// never displace a dated anchor.
pub fn dedupe_recurring(events: Vec<Event>) -> Vec<Event> {
    let mut groups: Vec<Event> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for event in events {
        let key = dedup_key(&event);
        match index.get(&key) {
            None => {
                index.insert(key, groups.len());
                groups.push(event);
            }
            Some(&i) => {
                let group = &mut groups[i];
                match (event.start_time, group.start_time) {
                    (Some(incoming), Some(anchor)) if incoming < anchor => {
                        // Swap: the displaced anchor becomes an extra date
                        group.extra_dates.push(anchor);
                        group.start_time = Some(incoming);
                    }
                    (Some(incoming), Some(_)) => group.extra_dates.push(incoming),
                    (Some(incoming), None) => group.start_time = Some(incoming),
                    (None, _) => {}
                }
            }
        }
    }

    for group in &mut groups {
        group.extra_dates.sort();
        group.extra_dates.dedup();
        if let Some(anchor) = group.start_time {
            group.extra_dates.retain(|d| *d != anchor);
        }
        group.extra_count = group.extra_dates.len();
    }

    groups
}
