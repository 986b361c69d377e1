pub mod create;

pub use create::{CreateTagCommand, CreateTagError};
