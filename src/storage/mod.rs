pub mod sqlite;
pub mod traits;

pub use sqlite::{SqliteEventStore, SqliteStorage};
pub use traits::{EventStore, LocalQuery};
