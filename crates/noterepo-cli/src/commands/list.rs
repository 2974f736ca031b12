//! Listing command.

use noterepo_core::EntryKind;
use noterepo_plugins::RepositoryPlugin;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

use super::open_repository;

/// Lists the entries at a path and prints the breadcrumb trail.
pub async fn run(path: &str, config: &ClientConfig, session: &str) -> ClientResult<()> {
    let repo = open_repository(config, session)?;

    if !repo.is_logged_in() {
        return Err(ClientError::AuthRequired(
            "run `noterepo login` first".to_string(),
        ));
    }

    let listing = repo.list_entries(path, 0).await?;

    let trail: Vec<&str> = listing
        .breadcrumbs
        .iter()
        .map(|b| b.name.as_str())
        .collect();
    println!("{}", trail.join(" > "));
    println!();

    if listing.entries.is_empty() {
        println!("(empty)");
        return Ok(());
    }

    for entry in &listing.entries {
        let kind = match entry.kind {
            EntryKind::Notebook => "notebook",
            EntryKind::Section => "section",
            EntryKind::Page => "page",
        };
        let modified = entry
            .modified
            .map(|m| m.format(" %Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{:<10} {:<40} {}{}", kind, entry.id, entry.title, modified);
    }

    Ok(())
}
