use crate::domain::{LocalEventRow, NewLocalEvent};
use crate::errors::EventsResult;

/// Search filters applied to the local store. Keyword and location are
/// substring matches; category is an id equality match.
#[derive(Debug, Clone, Default)]
pub struct LocalQuery {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub category_id: Option<i64>,
}

#[cfg_attr(test, mockall::automock)]
pub trait EventStore: Send + Sync {
    /// Search local events, ordered by start time ascending, paginated by
    /// offset/limit.
    fn search(&self, query: &LocalQuery, offset: u32, limit: u32)
        -> EventsResult<Vec<LocalEventRow>>;

    /// Resolve a category name to its id. Unknown names are `None`.
    fn resolve_category_id(&self, name: &str) -> EventsResult<Option<i64>>;

    /// Insert a local event, creating its category if needed. Returns the
    /// new row id.
    fn insert(&self, event: &NewLocalEvent) -> EventsResult<i64>;
}
