use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shown when neither source provides an image for an event.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/600x400?text=Event";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Local,
    External,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Local => "local",
            Origin::External => "external",
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Price of an event: a numeric amount from the local store, or a label
/// ("Free", "Paid", a currency range) when no single number exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(f64),
    Label(String),
}

impl Price {
    pub fn free() -> Self {
        Price::Label("Free".to_string())
    }

    pub fn paid() -> Self {
        Price::Label("Paid".to_string())
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Price::Amount(amount) => write!(f, "{:.2}", amount),
            Price::Label(label) => write!(f, "{}", label),
        }
    }
}

/// The unified shape both sources are mapped into before composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub start_time: Option<DateTime<Utc>>,
    pub price: Price,
    pub location: String,
    pub description: String,
    pub image_url: String,
    pub seats_left: Option<i64>,
    pub category: Option<String>,
    pub origin: Origin,
    pub external_url: Option<String>,
    pub external_organizer: Option<String>,
    /// Additional occurrence dates for a recurring external listing,
    /// ascending, never containing `start_time` itself.
    pub extra_dates: Vec<DateTime<Utc>>,
    pub extra_count: usize,
}

impl Event {
    pub fn from_local_row(row: super::LocalEventRow) -> Self {
        let price = if row.price <= 0.0 {
            Price::free()
        } else {
            Price::Amount(row.price)
        };

        Self {
            id: row.id.to_string(),
            title: row.title,
            start_time: row.start_time,
            price,
            location: row.location,
            description: row.description,
            image_url: if row.image_url.is_empty() {
                PLACEHOLDER_IMAGE_URL.to_string()
            } else {
                row.image_url
            },
            seats_left: row.seats_left,
            category: row.category_name,
            origin: Origin::Local,
            external_url: None,
            external_organizer: None,
            extra_dates: Vec::new(),
            extra_count: 0,
        }
    }
}
