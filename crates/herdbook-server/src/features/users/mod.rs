//! Accounts and API tokens
//!
//! Registration and token issue are public; `/me` requires a token.

pub mod commands;
pub mod routes;
pub mod types;

pub use commands::{
    IssueTokenCommand, IssueTokenError, RegisterUserCommand, RegisterUserError, UpdateMeCommand,
    UpdateMeError,
};
pub use types::TokenResponse;

pub use routes::users_routes;
