pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{CreateTagCommand, CreateTagError};
pub use queries::{ListTagsError, ListTagsQuery};

pub use routes::tags_routes;
