//! `herdbook create-user`, `create-superuser`, `issue-token` and
//! `deactivate-user` command implementations
//!
//! Account creation runs through the same validation as `POST /users`.

use colored::Colorize;
use herdbook_server::auth::generate_key;
use herdbook_server::features::shared::Field;
use herdbook_server::features::users::commands::register::{
    self, RegisterUserCommand, RegisterUserError,
};
use herdbook_server::models::{normalize_email, User, UserChanges};
use herdbook_server::store::HerdStore;

use crate::error::{CliError, Result};
use crate::UserArgs;

pub async fn create(database_url: &str, args: &UserArgs, superuser: bool) -> Result<()> {
    let password = match &args.password {
        Some(password) => password.clone(),
        None => inquire::Password::new("Password:").prompt()?,
    };

    let command = register_command(args, password);
    let store = super::connect(database_url).await?;

    let result = if superuser {
        register::handle_superuser(&store, command).await
    } else {
        register::handle(&store, command).await
    };
    let user = result.map_err(|e| match e {
        RegisterUserError::Validation(errors) => CliError::Validation(errors.to_string()),
        RegisterUserError::Store(e) => CliError::Store(e),
        RegisterUserError::Password(e) => CliError::Internal(e.to_string()),
    })?;

    let kind = if superuser { "superuser" } else { "user" };
    println!("{} Created {} {} (id {})", "✓".green(), kind, user.email.bold(), user.id);
    Ok(())
}

pub async fn issue_token(database_url: &str, email: &str) -> Result<()> {
    let store = super::connect(database_url).await?;
    let user = find_user(&store, email).await?;

    let token = store.get_or_create_token(user.id, &generate_key()).await?;

    println!("{}", token);
    Ok(())
}

pub async fn deactivate(database_url: &str, email: &str) -> Result<()> {
    let store = super::connect(database_url).await?;
    let user = find_user(&store, email).await?;

    if !user.is_active {
        println!("{} {} is already inactive", "•".dimmed(), user.email);
        return Ok(());
    }

    let changes = UserChanges {
        is_active: Some(false),
        ..Default::default()
    };
    store.update_user(user.id, changes).await?;

    println!("{} Deactivated {}", "✓".green(), user.email.bold());
    Ok(())
}

fn register_command(args: &UserArgs, password: String) -> RegisterUserCommand {
    RegisterUserCommand {
        email: Field::Value(args.email.clone()),
        password: Field::Value(password),
        name: Field::Value(args.name.clone()),
        phone: args.phone.clone().map_or(Field::Missing, Field::Value),
    }
}

async fn find_user(store: &dyn HerdStore, email: &str) -> Result<User> {
    store
        .find_user_by_email(&normalize_email(email))
        .await?
        .ok_or_else(|| CliError::UserNotFound(email.to_string()))
}
