pub mod category;
pub mod compositor;
pub mod dedup;
pub mod paginator;

pub use category::resolve_classification;
pub use compositor::{FeedCompositor, FeedPage, FetchOutcome};
pub use dedup::dedupe_recurring;
pub use paginator::{FeedPagination, PaginationState};
