/// Cursor + exhaustion flag for one source. Reset on filter change, advanced
/// monotonically on load-more, never decremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page: u32,
    pub has_more: bool,
}

impl PaginationState {
    pub fn initial() -> Self {
        Self {
            page: 0,
            has_more: true,
        }
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Independent pagination for the local store and the external provider.
/// The combined feed can grow while either source still has pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedPagination {
    pub local: PaginationState,
    pub external: PaginationState,
}

impl FeedPagination {
    pub fn reset(&mut self) {
        self.local = PaginationState::initial();
        self.external = PaginationState::initial();
    }

    /// Local exhaustion is inferred: a short page means the store ran out.
    pub fn advance_local(&mut self, returned: usize, page_size: u32) {
        self.local.page += 1;
        self.local.has_more = returned == page_size as usize;
    }

    /// External cursor and exhaustion come from the provider's own metadata.
    pub fn advance_external(&mut self, has_more: bool, next_page: u32) {
        self.external.page = self.external.page.max(next_page);
        self.external.has_more = has_more;
    }

    /// The provider could not be reached this cycle: keep its cursor so a
    /// retry resumes in place, but stop advertising more pages.
    pub fn mark_external_unavailable(&mut self) {
        self.external.has_more = false;
    }

    pub fn can_load_more(&self) -> bool {
        self.local.has_more || self.external.has_more
    }
}
