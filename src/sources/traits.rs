use crate::errors::EventsResult;
use crate::sources::record::ProviderEvent;

/// Search filters forwarded to the external provider.
#[derive(Debug, Clone, Default)]
pub struct ExternalQuery {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub classification_id: Option<String>,
}

/// One page of raw provider records plus the provider's own pagination
/// metadata. Page size is fixed by the provider, not by the caller.
#[derive(Debug, Clone, Default)]
pub struct ExternalPage {
    pub records: Vec<ProviderEvent>,
    pub has_more: bool,
    pub next_page: u32,
}

#[cfg_attr(test, mockall::automock)]
pub trait ExternalSource: Send + Sync {
    /// Fetch one page of events matching the query.
    fn search(&self, query: &ExternalQuery, page: u32) -> EventsResult<ExternalPage>;
}
