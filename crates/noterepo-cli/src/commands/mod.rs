//! Command implementations.

pub mod auth;
pub mod fetch;
pub mod list;
pub mod logout;
pub mod status;

use std::sync::Arc;

use noterepo_plugins::onenote::{OAuthCredentials, OneNoteConfig, OneNoteRepository};
use noterepo_plugins::{FileTokenStore, SessionId};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Return URL used for commands that never run the login redirect.
/// The token exchange already happened; this only fills the config slot.
const PLACEHOLDER_RETURN_URL: &str = "http://127.0.0.1:8080/callback";

/// Builds a repository instance for the given session, with tokens
/// persisted under the configured token directory.
pub fn open_repository(config: &ClientConfig, session: &str) -> ClientResult<OneNoteRepository> {
    let onenote = config.onenote.as_ref().ok_or_else(missing_credentials_error)?;

    let (client_id, client_secret) = match (&onenote.client_id, &onenote.client_secret) {
        (Some(id), Some(secret)) => (id.clone(), secret.clone()),
        _ => return Err(missing_credentials_error()),
    };

    let credentials = OAuthCredentials::new(client_id, client_secret);
    let plugin_config = OneNoteConfig::new(credentials, PLACEHOLDER_RETURN_URL);

    let store = Arc::new(FileTokenStore::new(config.token_dir()));

    OneNoteRepository::new(plugin_config, store, SessionId::new(session)).map_err(Into::into)
}

fn missing_credentials_error() -> ClientError {
    ClientError::Config(format!(
        "OneNote credentials are required. Provide via:\n  \
         - client_id + client_secret under [onenote] in {}\n  \
         - --client-id and --client-secret flags to `noterepo login`\n  \
         - NOTEREPO_CLIENT_ID and NOTEREPO_CLIENT_SECRET env vars",
        ClientConfig::default_path().display()
    ))
}
