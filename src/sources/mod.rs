pub mod mapper;
pub mod record;
pub mod ticketmaster;
pub mod traits;

pub use mapper::{map_provider_record, EXTERNAL_ID_PREFIX, FALLBACK_ORGANIZER};
pub use record::ProviderEvent;
pub use ticketmaster::TicketmasterSource;
pub use traits::{ExternalPage, ExternalQuery, ExternalSource};
