pub mod issue_token;
pub mod register;
pub mod update_me;

pub use issue_token::{IssueTokenCommand, IssueTokenError};
pub use register::{RegisterUserCommand, RegisterUserError};
pub use update_me::{UpdateMeCommand, UpdateMeError};
