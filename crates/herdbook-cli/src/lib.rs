//! Herdbook CLI Library
//!
//! Administrative commands that talk to the database directly:
//!
//! - **Schema**: apply migrations (`herdbook migrate`)
//! - **Accounts**: create users and superusers (`herdbook create-user`,
//!   `herdbook create-superuser`), deactivate them (`herdbook deactivate-user`)
//! - **Tokens**: print a user's API token (`herdbook issue-token`)
//!
//! Superusers can only be created here; the HTTP API registers regular
//! accounts.

pub mod commands;
pub mod error;

// Re-export commonly used types
pub use error::{CliError, Result};

use clap::{Args, Parser, Subcommand};

/// Herdbook - livestock records administration
#[derive(Parser, Debug)]
#[command(name = "herdbook")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Postgres connection string
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgresql://localhost/herdbook",
        global = true
    )]
    pub database_url: String,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Create a regular user
    CreateUser(UserArgs),

    /// Create a staff superuser
    CreateSuperuser(UserArgs),

    /// Print the API token of a user, creating it if needed
    IssueToken {
        /// Email address of the user
        #[arg(short, long)]
        email: String,
    },

    /// Stop a user from authenticating
    DeactivateUser {
        /// Email address of the user
        #[arg(short, long)]
        email: String,
    },
}

/// Account fields shared by the user creation commands
#[derive(Args, Debug, Clone)]
pub struct UserArgs {
    /// Email address, used to log in
    #[arg(short, long)]
    pub email: String,

    /// Display name
    #[arg(short, long)]
    pub name: String,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Password; prompted for when omitted
    #[arg(long, env = "HERDBOOK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}
