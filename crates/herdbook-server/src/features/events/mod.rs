pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use commands::{CreateEventCommand, CreateEventError};
pub use queries::{ListEventsError, ListEventsQuery};
pub use types::EventResponse;

pub use routes::events_routes;
