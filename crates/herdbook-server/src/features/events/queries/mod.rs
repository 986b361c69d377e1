pub mod list;

pub use list::{ListEventsError, ListEventsQuery};
