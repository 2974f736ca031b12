//! Status command.

use noterepo_core::FileTypeFilter;
use noterepo_plugins::RepositoryPlugin;

use crate::config::ClientConfig;
use crate::error::ClientResult;

use super::open_repository;

/// Prints the login state for the current session.
pub async fn run(config: &ClientConfig, session: &str) -> ClientResult<()> {
    let repo = open_repository(config, session)?;

    println!("Plugin:    {}", repo.name());
    println!("Session:   {}", session);
    println!(
        "Logged in: {}",
        if repo.is_logged_in() { "yes" } else { "no" }
    );

    let caps = repo.capabilities();
    let filetypes = match caps.filetypes {
        FileTypeFilter::Any => "any".to_string(),
        FileTypeFilter::Extensions(exts) => exts.join(", "),
    };
    println!("Search:    {}", if caps.global_search { "yes" } else { "no" });
    println!("Filetypes: {}", filetypes);

    Ok(())
}
