pub mod event;
pub mod filter;
pub mod local;

pub use event::{Event, Origin, Price, PLACEHOLDER_IMAGE_URL};
pub use filter::FilterSet;
pub use local::{LocalEventRow, NewLocalEvent};
