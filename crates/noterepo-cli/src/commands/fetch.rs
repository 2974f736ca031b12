//! Section fetch command.

use std::path::PathBuf;

use noterepo_plugins::RepositoryPlugin;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

use super::open_repository;

/// Downloads a section to a local file.
pub async fn run(
    id: &str,
    output: Option<PathBuf>,
    config: &ClientConfig,
    session: &str,
) -> ClientResult<()> {
    let repo = open_repository(config, session)?;

    if !repo.is_logged_in() {
        return Err(ClientError::AuthRequired(
            "run `noterepo login` first".to_string(),
        ));
    }

    let dest = output.unwrap_or_else(|| PathBuf::from(format!("{}.one", id)));
    let fetched = repo.fetch_entry(id, &dest).await?;

    println!("Saved to {}", fetched.path.display());
    println!("Source: {}", fetched.source_url);

    Ok(())
}
