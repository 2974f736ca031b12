//! Logout command.

use noterepo_plugins::RepositoryPlugin;

use crate::config::ClientConfig;
use crate::error::ClientResult;

use super::open_repository;

/// Logs out of the session and prints where to log back in.
pub async fn run(config: &ClientConfig, session: &str) -> ClientResult<()> {
    let repo = open_repository(config, session)?;

    if !repo.is_logged_in() {
        println!("Not logged in.");
        return Ok(());
    }

    let prompt = repo.log_out().await?;

    println!("Logged out.");
    println!("Log back in with `noterepo login` or at:\n  {}", prompt.url);

    Ok(())
}
