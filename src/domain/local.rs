use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row shape returned by the local event store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalEventRow {
    pub id: i64,
    pub title: String,
    pub start_time: Option<DateTime<Utc>>,
    pub price: f64,
    pub location: String,
    pub description: String,
    pub image_url: String,
    pub seats_left: Option<i64>,
    pub creator_id: Option<String>,
    pub category_name: Option<String>,
}

/// Insert shape for the local event store.
#[derive(Debug, Clone)]
pub struct NewLocalEvent {
    pub title: String,
    pub start_time: Option<DateTime<Utc>>,
    pub price: f64,
    pub location: String,
    pub description: String,
    pub image_url: String,
    pub seats_left: Option<i64>,
    pub creator_id: Option<String>,
    pub category: Option<String>,
}

impl NewLocalEvent {
    pub fn new(title: String, location: String) -> Self {
        Self {
            title,
            start_time: None,
            price: 0.0,
            location,
            description: String::new(),
            image_url: String::new(),
            seats_left: None,
            creator_id: None,
            category: None,
        }
    }

    pub fn with_start_time(mut self, start_time: Option<DateTime<Utc>>) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = description;
        self
    }

    pub fn with_seats(mut self, seats_left: Option<i64>) -> Self {
        self.seats_left = seats_left;
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }
}
