//! `herdbook migrate` command implementation

use colored::Colorize;

use crate::error::Result;

pub async fn run(database_url: &str) -> Result<()> {
    tracing::debug!("Applying migrations");

    super::connect(database_url).await?;

    println!("{} Database schema is up to date", "✓".green());
    Ok(())
}
