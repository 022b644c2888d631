use chrono::{DateTime, Utc};

use crate::domain::{Event, Origin, Price, PLACEHOLDER_IMAGE_URL};
use crate::sources::record::ProviderEvent;

/// Namespace prefix keeping provider ids disjoint from local store ids.
pub const EXTERNAL_ID_PREFIX: &str = "tm_";

/// Organizer shown when the provider record carries no promoter.
pub const FALLBACK_ORGANIZER: &str = "Ticketmaster";

const FALLBACK_TITLE: &str = "Untitled";

/// Images below this width are skipped when a larger one exists.
const MIN_IMAGE_WIDTH: u32 = 400;

/// Convert a raw provider record into the canonical event shape. Pure and
/// total: every missing field degrades to a defined fallback, a malformed
/// record never aborts the batch it arrived in.
pub fn map_provider_record(raw: ProviderEvent) -> Event {
    let id = format!("{}{}", EXTERNAL_ID_PREFIX, raw.id.unwrap_or_default());

    let title = raw
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());

    let start_time = raw
        .dates
        .and_then(|d| d.start)
        .and_then(|s| s.date_time)
        .and_then(|dt| parse_timestamp(&dt));

    let location = raw
        .embedded
        .and_then(|e| e.venues)
        .and_then(|v| v.into_iter().next())
        .map(|venue| {
            let name = venue.name.unwrap_or_default();
            let city = venue.city.and_then(|c| c.name).unwrap_or_default();
            join_location(&name, &city)
        })
        .unwrap_or_default();

    let image_url = raw
        .images
        .and_then(|images| {
            images
                .iter()
                .find(|i| i.width.unwrap_or(0) >= MIN_IMAGE_WIDTH)
                .or_else(|| images.first())
                .and_then(|i| i.url.clone())
        })
        .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string());

    let price = raw
        .price_ranges
        .and_then(|ranges| ranges.into_iter().next())
        .and_then(|range| match (range.min, range.max) {
            (Some(min), Some(max)) => {
                let currency = range.currency.unwrap_or_default();
                Some(Price::Label(
                    format!("{}\u{2013}{} {}", min, max, currency).trim_end().to_string(),
                ))
            }
            _ => None,
        })
        .unwrap_or_else(Price::paid);

    let category = raw
        .classifications
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.segment)
        .and_then(|s| s.name);

    let external_organizer = raw
        .promoter
        .and_then(|p| p.name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_ORGANIZER.to_string());

    Event {
        id,
        title,
        start_time,
        price,
        location,
        description: raw.info.unwrap_or_default(),
        image_url,
        seats_left: None,
        category,
        origin: Origin::External,
        external_url: raw.url,
        external_organizer: Some(external_organizer),
        extra_dates: Vec::new(),
        extra_count: 0,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn join_location(name: &str, city: &str) -> String {
    match (name.is_empty(), city.is_empty()) {
        (false, false) => format!("{}, {}", name, city),
        (false, true) => name.to_string(),
        (true, false) => city.to_string(),
        (true, true) => String::new(),
    }
}
