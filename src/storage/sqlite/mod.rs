mod connection;
mod event_store;

pub use connection::SqliteStorage;
pub use event_store::SqliteEventStore;
