//! OneNote API client.
//!
//! A low-level HTTP client for the notebook listing/download API. The
//! bearer token is an argument to every call rather than client state:
//! the adapter reads the session store on each operation and hands the
//! token in, so a token restored from the session is always the one that
//! reaches the wire.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use noterepo_core::{EntryKind, FileEntry};

use crate::error::{RepositoryError, RepositoryResult};
use crate::session::AccessToken;

/// Base URL for the OneNote API.
const ONENOTE_API_BASE: &str = "https://www.onenote.com/api/v1.0";

/// OneNote API client.
#[derive(Debug)]
pub struct OneNoteClient {
    http_client: reqwest::Client,
    api_base: String,
}

impl OneNoteClient {
    /// Creates a new client with the given timeout and user agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .expect("failed to create HTTP client");

        Self {
            http_client,
            api_base: ONENOTE_API_BASE.to_string(),
        }
    }

    /// Overrides the API base URL.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Lists the user's notebooks.
    pub async fn list_notebooks(&self, token: &AccessToken) -> RepositoryResult<Vec<FileEntry>> {
        let url = format!("{}/notebooks", self.api_base);
        let list: ODataList<ApiNotebook> = self.get_json(&url, token).await?;

        debug!("fetched {} notebooks", list.value.len());
        Ok(list
            .value
            .into_iter()
            .map(|nb| convert_entry(nb.id, nb.name, EntryKind::Notebook, nb.last_modified_time))
            .collect())
    }

    /// Lists the sections of a notebook.
    pub async fn list_sections(
        &self,
        notebook_id: &str,
        token: &AccessToken,
    ) -> RepositoryResult<Vec<FileEntry>> {
        let url = format!(
            "{}/notebooks/{}/sections",
            self.api_base,
            urlencoding::encode(notebook_id)
        );
        let list: ODataList<ApiSection> = self.get_json(&url, token).await?;

        debug!("fetched {} sections from notebook {}", list.value.len(), notebook_id);
        Ok(list
            .value
            .into_iter()
            .map(|s| convert_entry(s.id, s.name, EntryKind::Section, s.last_modified_time))
            .collect())
    }

    /// Lists the pages of a section.
    pub async fn list_pages(
        &self,
        section_id: &str,
        token: &AccessToken,
    ) -> RepositoryResult<Vec<FileEntry>> {
        let url = format!(
            "{}/sections/{}/pages",
            self.api_base,
            urlencoding::encode(section_id)
        );
        let list: ODataList<ApiPage> = self.get_json(&url, token).await?;

        debug!("fetched {} pages from section {}", list.value.len(), section_id);
        Ok(list
            .value
            .into_iter()
            .map(|p| convert_entry(p.id, p.title, EntryKind::Page, p.last_modified_time))
            .collect())
    }

    /// Resolves a notebook id to its display name.
    pub async fn notebook_name(&self, id: &str, token: &AccessToken) -> RepositoryResult<String> {
        let url = format!("{}/notebooks/{}", self.api_base, urlencoding::encode(id));
        let notebook: ApiNotebook = self.get_json(&url, token).await?;
        Ok(notebook.name)
    }

    /// Resolves a section id to its display name.
    pub async fn section_name(&self, id: &str, token: &AccessToken) -> RepositoryResult<String> {
        let url = format!("{}/sections/{}", self.api_base, urlencoding::encode(id));
        let section: ApiSection = self.get_json(&url, token).await?;
        Ok(section.name)
    }

    /// Downloads a section's content to `dest`.
    ///
    /// Returns the local path and the section's web URL as the source.
    pub async fn download_section(
        &self,
        id: &str,
        token: &AccessToken,
        dest: &Path,
    ) -> RepositoryResult<(PathBuf, String)> {
        // Metadata first, for the source URL shown to the user.
        let meta_url = format!("{}/sections/{}", self.api_base, urlencoding::encode(id));
        let section: ApiSection = self.get_json(&meta_url, token).await?;

        let source_url = section
            .links
            .and_then(|l| l.one_note_web_url)
            .map(|l| l.href)
            .unwrap_or_else(|| meta_url.clone());

        let content_url = format!(
            "{}/sections/{}/content",
            self.api_base,
            urlencoding::encode(id)
        );

        let response = self
            .http_client
            .get(&content_url)
            .bearer_auth(&token.secret)
            .send()
            .await
            .map_err(map_request_error)?;

        let response = check_status(response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RepositoryError::network(format!("failed to read content: {}", e)))?;

        std::fs::write(dest, &bytes).map_err(|e| {
            RepositoryError::internal(format!("failed to write {}: {}", dest.display(), e))
                .with_source(e)
        })?;

        debug!("downloaded section {} ({} bytes) to {}", id, bytes.len(), dest.display());
        Ok((dest.to_path_buf(), source_url))
    }

    /// Performs an authenticated GET and parses the JSON body.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        token: &AccessToken,
    ) -> RepositoryResult<T> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&token.secret)
            .send()
            .await
            .map_err(map_request_error)?;

        let response = check_status(response).await?;

        let body = response
            .text()
            .await
            .map_err(|e| RepositoryError::network(format!("failed to read response: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| RepositoryError::invalid_response(format!("failed to parse response: {}", e)))
    }
}

/// Maps reqwest transport errors onto the taxonomy.
fn map_request_error(e: reqwest::Error) -> RepositoryError {
    if e.is_timeout() {
        RepositoryError::network("request timeout")
    } else if e.is_connect() {
        RepositoryError::network(format!("connection failed: {}", e))
    } else {
        RepositoryError::network(format!("request failed: {}", e))
    }
}

/// Maps non-2xx statuses onto the taxonomy, passing 2xx through.
async fn check_status(response: reqwest::Response) -> RepositoryResult<reqwest::Response> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(RepositoryError::authentication(
            "access token expired or invalid",
        ));
    }

    if status == reqwest::StatusCode::FORBIDDEN {
        return Err(RepositoryError::authorization("access denied to notebook"));
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(RepositoryError::not_found("no such notebook item"));
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        return Err(RepositoryError::rate_limited(format!(
            "rate limit exceeded{}",
            retry_after
                .map(|s| format!(", retry after {} seconds", s))
                .unwrap_or_default()
        )));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RepositoryError::server(format!(
            "API error ({}): {}",
            status, body
        )));
    }

    Ok(response)
}

/// Builds a [`FileEntry`] from API fields, tolerating unparsable times.
fn convert_entry(
    id: String,
    title: String,
    kind: EntryKind,
    modified: Option<String>,
) -> FileEntry {
    let mut entry = FileEntry::new(id, title, kind);
    if let Some(raw) = modified {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            entry = entry.with_modified(parsed.with_timezone(&Utc));
        }
    }
    entry
}

/// OData collection envelope.
#[derive(Debug, Deserialize)]
struct ODataList<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

/// A notebook from the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiNotebook {
    id: String,
    name: String,
    last_modified_time: Option<String>,
}

/// A section from the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSection {
    id: String,
    name: String,
    last_modified_time: Option<String>,
    links: Option<ApiLinks>,
}

/// A page from the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPage {
    id: String,
    title: String,
    last_modified_time: Option<String>,
}

/// Navigation links attached to an API resource.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiLinks {
    one_note_web_url: Option<ApiLink>,
}

/// A single link object.
#[derive(Debug, Deserialize)]
struct ApiLink {
    href: String,
}
