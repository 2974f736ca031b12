//! OneNote repository plugin implementation.
//!
//! This module implements the [`RepositoryPlugin`] trait for a OneNote
//! account: authenticate via the OAuth2 code flow, list notebooks,
//! sections and pages as browsable entries, download a section into host
//! storage.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use noterepo_core::{Breadcrumb, Capabilities, FileEntry, Listing};

use crate::error::{RepositoryError, RepositoryResult};
use crate::plugin::{BoxFuture, FetchedFile, LoginMode, LoginPrompt, RepositoryPlugin};
use crate::session::{AccessToken, SessionId, TokenStore};

use super::client::OneNoteClient;
use super::config::OneNoteConfig;
use super::oauth::{OAuthClient, OAuthEndpoints};

/// Name shown as the root breadcrumb entry.
const DISPLAY_NAME: &str = "OneNote";

/// OneNote repository plugin.
///
/// The adapter owns no token itself: every operation reads the session
/// store and hands the bearer token to the API client for that one call,
/// so a token restored from an earlier request in the session is always
/// the one used on the wire.
pub struct OneNoteRepository {
    config: OneNoteConfig,
    token_store: Arc<dyn TokenStore>,
    session: SessionId,
    oauth: OAuthClient,
    client: OneNoteClient,
}

impl std::fmt::Debug for OneNoteRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneNoteRepository")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl OneNoteRepository {
    /// Creates a new plugin instance for one host session.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the client id, secret or
    /// return URL is missing.
    pub fn new(
        config: OneNoteConfig,
        token_store: Arc<dyn TokenStore>,
        session: SessionId,
    ) -> RepositoryResult<Self> {
        config.validate().map_err(RepositoryError::configuration)?;

        let oauth = OAuthClient::new(
            config.credentials.clone(),
            config.return_url.clone(),
            config.timeout,
        );
        let client = OneNoteClient::new(config.timeout, &config.user_agent);

        Ok(Self {
            config,
            token_store,
            session,
            oauth,
            client,
        })
    }

    /// Points the adapter at a different API base URL (service clouds,
    /// tests).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.client = self.client.with_api_base(base);
        self
    }

    /// Points the adapter at a different OAuth endpoint set.
    pub fn with_oauth_endpoints(mut self, endpoints: OAuthEndpoints) -> Self {
        self.oauth = self.oauth.with_endpoints(endpoints);
        self
    }

    /// Returns the session token if present and usable.
    fn token(&self) -> Option<AccessToken> {
        self.token_store
            .get(&self.session)
            .filter(|t| !t.is_expired())
    }

    /// Returns the session token or an authentication failure.
    fn require_token(&self) -> RepositoryResult<AccessToken> {
        self.token().ok_or_else(|| {
            RepositoryError::authentication("not logged in").with_plugin(DISPLAY_NAME.to_lowercase())
        })
    }

    /// Resolves one path segment to its display name.
    ///
    /// The first segment of a path is always a notebook; everything
    /// deeper is a section.
    async fn segment_name(
        &self,
        depth: usize,
        id: &str,
        token: &AccessToken,
    ) -> RepositoryResult<String> {
        if depth == 0 {
            self.client.notebook_name(id, token).await
        } else {
            self.client.section_name(id, token).await
        }
    }

    /// Lists the children of the folder the path points at.
    async fn children(
        &self,
        segments: &[&str],
        token: &AccessToken,
    ) -> RepositoryResult<Vec<FileEntry>> {
        match segments {
            [] => self.client.list_notebooks(token).await,
            [notebook] => self.client.list_sections(notebook, token).await,
            [_, section] => self.client.list_pages(section, token).await,
            // Pages are leaves; anything deeper is a stale path.
            _ => Ok(Vec::new()),
        }
    }

    async fn list_entries_impl(&self, path: &str) -> RepositoryResult<Listing> {
        let token = self.require_token()?;

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        debug!("listing path {:?} ({} segments)", path, segments.len());

        let mut listing = Listing::new(
            Breadcrumb::new(DISPLAY_NAME, ""),
            self.config.manage_url.clone(),
        );

        // Resolve each level of the trail to a display name.
        let mut trail = String::new();
        for (depth, id) in segments.iter().enumerate() {
            if !trail.is_empty() {
                trail.push('/');
            }
            trail.push_str(id);

            let name = self.segment_name(depth, id, &token).await?;
            listing.push_breadcrumb(Breadcrumb::new(name, trail.clone()));
        }

        let entries = self.children(&segments, &token).await?;
        Ok(listing.with_entries(entries))
    }

    async fn fetch_entry_impl(&self, id: &str, dest: &Path) -> RepositoryResult<FetchedFile> {
        let token = self.require_token()?;

        let (path, source_url) = self.client.download_section(id, &token, dest).await?;
        info!("fetched section {} to {}", id, path.display());

        Ok(FetchedFile { path, source_url })
    }

    async fn handle_callback_impl(&self, code: Option<&str>) -> RepositoryResult<()> {
        let Some(code) = code else {
            // Callback hit without a code: the user backed out or the
            // provider redirected empty-handed. Nothing changes.
            debug!("callback without authorization code, ignoring");
            return Ok(());
        };

        let token = self.oauth.exchange_code(code).await?;
        self.token_store.set(&self.session, token)?;
        info!("session {} authenticated", self.session);
        Ok(())
    }

    async fn log_out_impl(&self) -> RepositoryResult<LoginPrompt> {
        // Local state goes first so a remote failure cannot leave the
        // session half logged in.
        self.token_store.clear(&self.session)?;
        self.oauth.log_out().await?;
        info!("session {} logged out", self.session);
        Ok(self.login_prompt())
    }
}

impl RepositoryPlugin for OneNoteRepository {
    fn name(&self) -> &str {
        "onenote"
    }

    fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    fn login_prompt(&self) -> LoginPrompt {
        let mode = if self.config.popup {
            LoginMode::Popup
        } else {
            LoginMode::Redirect
        };
        LoginPrompt::new(self.oauth.login_url(&self.config.scopes), mode)
    }

    fn handle_callback<'a>(&'a self, code: Option<&'a str>) -> BoxFuture<'a, RepositoryResult<()>> {
        Box::pin(async move { self.handle_callback_impl(code).await })
    }

    fn list_entries<'a>(
        &'a self,
        path: &'a str,
        _page: u32,
    ) -> BoxFuture<'a, RepositoryResult<Listing>> {
        Box::pin(async move { self.list_entries_impl(path).await })
    }

    fn fetch_entry<'a>(
        &'a self,
        id: &'a str,
        dest: &'a Path,
    ) -> BoxFuture<'a, RepositoryResult<FetchedFile>> {
        Box::pin(async move { self.fetch_entry_impl(id, dest).await })
    }

    fn log_out(&self) -> BoxFuture<'_, RepositoryResult<LoginPrompt>> {
        Box::pin(async move { self.log_out_impl().await })
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::copy_in()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepositoryErrorCode;
    use crate::onenote::config::OAuthCredentials;
    use crate::session::MemoryTokenStore;
    use noterepo_core::EntryKind;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> OneNoteConfig {
        OneNoteConfig::new(
            OAuthCredentials::new("test-client-id", "test-secret"),
            "https://host.example/repository/callback",
        )
    }

    fn test_repository(server: &MockServer) -> (OneNoteRepository, Arc<MemoryTokenStore>) {
        let store = Arc::new(MemoryTokenStore::new());
        let repo = OneNoteRepository::new(
            test_config(),
            store.clone(),
            SessionId::new("sess-1"),
        )
        .unwrap()
        .with_api_base(server.uri())
        .with_oauth_endpoints(OAuthEndpoints {
            authorize_url: format!("{}/authorize", server.uri()),
            token_url: format!("{}/token", server.uri()),
            logout_url: format!("{}/logout", server.uri()),
        });
        (repo, store)
    }

    fn log_in(store: &MemoryTokenStore) {
        store
            .set(&SessionId::new("sess-1"), AccessToken::new("tok", Some(3600)))
            .unwrap();
    }

    #[test]
    fn missing_credentials_rejected_at_construction() {
        let config = OneNoteConfig::new(
            OAuthCredentials::new("", ""),
            "https://host.example/callback",
        );
        let result = OneNoteRepository::new(
            config,
            Arc::new(MemoryTokenStore::new()),
            SessionId::new("sess-1"),
        );
        assert_eq!(
            result.unwrap_err().code(),
            RepositoryErrorCode::ConfigurationError
        );
    }

    #[tokio::test]
    async fn fresh_session_is_not_logged_in() {
        let server = MockServer::start().await;
        let (repo, _store) = test_repository(&server);

        assert!(!repo.is_logged_in());

        let err = repo.list_entries("", 0).await.unwrap_err();
        assert_eq!(err.code(), RepositoryErrorCode::AuthenticationFailed);

        let tmp = tempfile::tempdir().unwrap();
        let err = repo
            .fetch_entry("sec-1", &tmp.path().join("out.one"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), RepositoryErrorCode::AuthenticationFailed);
    }

    #[tokio::test]
    async fn expired_token_counts_as_logged_out() {
        let server = MockServer::start().await;
        let (repo, store) = test_repository(&server);

        let mut token = AccessToken::new("tok", Some(3600));
        token.expires_at = Some(chrono::Utc::now() - chrono::Duration::hours(1));
        store.set(&SessionId::new("sess-1"), token).unwrap();

        assert!(!repo.is_logged_in());
    }

    #[tokio::test]
    async fn callback_with_code_logs_in() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-new",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let (repo, _store) = test_repository(&server);
        assert!(!repo.is_logged_in());

        repo.handle_callback(Some("auth-code")).await.unwrap();
        assert!(repo.is_logged_in());
    }

    #[tokio::test]
    async fn callback_without_code_changes_nothing() {
        let server = MockServer::start().await;
        let (repo, store) = test_repository(&server);

        repo.handle_callback(None).await.unwrap();

        assert!(!repo.is_logged_in());
        assert!(store.get(&SessionId::new("sess-1")).is_none());
    }

    #[tokio::test]
    async fn rejected_exchange_propagates_and_stores_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/token"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let (repo, _store) = test_repository(&server);
        let err = repo.handle_callback(Some("bad-code")).await.unwrap_err();
        assert_eq!(err.code(), RepositoryErrorCode::AuthenticationFailed);
        assert!(!repo.is_logged_in());
    }

    #[tokio::test]
    async fn empty_path_lists_root_with_single_breadcrumb() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/notebooks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [
                    {"id": "nb-1", "name": "Work Notes"},
                    {"id": "nb-2", "name": "Personal"}
                ]
            })))
            .mount(&server)
            .await;

        let (repo, store) = test_repository(&server);
        log_in(&store);

        let listing = repo.list_entries("", 0).await.unwrap();

        assert!(listing.dynamic_load);
        assert!(!listing.search_supported);
        assert_eq!(listing.manage_url, OneNoteConfig::DEFAULT_MANAGE_URL);
        assert_eq!(listing.breadcrumbs, vec![Breadcrumb::new("OneNote", "")]);
        assert_eq!(listing.entries.len(), 2);
        assert_eq!(listing.entries[0].kind, EntryKind::Notebook);
    }

    #[tokio::test]
    async fn nested_path_resolves_full_breadcrumb_trail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/notebooks/nb-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "nb-1", "name": "Work Notes"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/sections/sec-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "sec-2", "name": "Meetings"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/sections/sec-2/pages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [
                    {"id": "pg-1", "title": "Standup"}
                ]
            })))
            .mount(&server)
            .await;

        let (repo, store) = test_repository(&server);
        log_in(&store);

        let listing = repo.list_entries("nb-1/sec-2", 0).await.unwrap();

        assert_eq!(
            listing.breadcrumbs,
            vec![
                Breadcrumb::new("OneNote", ""),
                Breadcrumb::new("Work Notes", "nb-1"),
                Breadcrumb::new("Meetings", "nb-1/sec-2"),
            ]
        );
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0].kind, EntryKind::Page);
    }

    #[tokio::test]
    async fn single_segment_lists_sections() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/notebooks/nb-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "nb-1", "name": "Work Notes"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/notebooks/nb-1/sections"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [
                    {"id": "sec-2", "name": "Meetings"}
                ]
            })))
            .mount(&server)
            .await;

        let (repo, store) = test_repository(&server);
        log_in(&store);

        let listing = repo.list_entries("nb-1", 0).await.unwrap();
        assert_eq!(listing.breadcrumbs.len(), 2);
        assert_eq!(listing.entries[0].kind, EntryKind::Section);
    }

    #[tokio::test]
    async fn fetch_entry_downloads_to_destination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/sections/sec-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "sec-2",
                "name": "Meetings",
                "links": {"oneNoteWebUrl": {"href": "https://www.onenote.com/x/sec-2"}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/sections/sec-2/content"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"one content".to_vec()))
            .mount(&server)
            .await;

        let (repo, store) = test_repository(&server);
        log_in(&store);

        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("meetings.one");
        let fetched = repo.fetch_entry("sec-2", &dest).await.unwrap();

        assert_eq!(fetched.path, dest);
        assert_eq!(fetched.source_url, "https://www.onenote.com/x/sec-2");
        assert!(dest.exists());
        assert!(std::fs::metadata(&dest).unwrap().len() > 0);
    }

    #[tokio::test]
    async fn log_out_clears_session_and_returns_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/logout"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let (repo, store) = test_repository(&server);
        log_in(&store);
        assert!(repo.is_logged_in());

        let prompt = repo.log_out().await.unwrap();

        assert!(!repo.is_logged_in());
        assert!(prompt.url.contains("client_id=test-client-id"));
        assert_eq!(prompt.mode, LoginMode::Redirect);
    }

    #[tokio::test]
    async fn log_out_clears_locally_even_when_remote_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/logout"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (repo, store) = test_repository(&server);
        log_in(&store);

        let result = repo.log_out().await;
        assert!(result.is_err());
        assert!(!repo.is_logged_in());
    }

    #[test]
    fn login_prompt_reflects_popup_flag() {
        let repo = OneNoteRepository::new(
            test_config().with_popup(true),
            Arc::new(MemoryTokenStore::new()),
            SessionId::new("sess-1"),
        )
        .unwrap();

        let prompt = repo.login_prompt();
        assert_eq!(prompt.mode, LoginMode::Popup);
        assert!(prompt.url.contains("response_type=code"));
    }

    #[test]
    fn capabilities_are_copy_in_without_search() {
        let repo = OneNoteRepository::new(
            test_config(),
            Arc::new(MemoryTokenStore::new()),
            SessionId::new("sess-1"),
        )
        .unwrap();

        let caps = repo.capabilities();
        assert!(!caps.global_search);
        assert_eq!(caps.return_mode, noterepo_core::ReturnMode::Copy);
        assert_eq!(repo.name(), "onenote");
    }
}
