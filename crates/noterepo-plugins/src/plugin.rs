//! RepositoryPlugin trait definition.
//!
//! This module defines the [`RepositoryPlugin`] trait, the capability
//! interface the host framework depends on. A plugin bridges the host's
//! generic "repository" contract to one remote account: it authenticates,
//! lists browsable entries, and downloads a selected entry into host
//! storage.
//!
//! The token lifecycle a plugin moves through:
//!
//! ```text
//! Unauthenticated --(login redirect)--> PendingCallback
//! PendingCallback --(callback with code)--> Authenticated
//! PendingCallback --(callback without code)--> Unauthenticated
//! Authenticated --(log_out)--> Unauthenticated
//! ```

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use noterepo_core::{Capabilities, Listing};

use crate::error::RepositoryResult;

/// How a login affordance should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    /// Open the authorization URL in a popup window (AJAX hosts).
    Popup,
    /// Navigate the whole page to the authorization URL.
    Redirect,
}

/// A login affordance returned when the user is not authenticated.
#[derive(Debug, Clone)]
pub struct LoginPrompt {
    /// The remote authorization endpoint URL to send the user to.
    pub url: String,
    /// Presentation mode for the host UI.
    pub mode: LoginMode,
}

impl LoginPrompt {
    /// Creates a login prompt for the given authorization URL.
    pub fn new(url: impl Into<String>, mode: LoginMode) -> Self {
        Self {
            url: url.into(),
            mode,
        }
    }
}

/// The result of fetching an entry into local storage.
#[derive(Debug, Clone)]
pub struct FetchedFile {
    /// Local path the content was written to.
    pub path: PathBuf,
    /// URL of the original remote source.
    pub source_url: String,
}

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe, so the host can hold plugins
/// as `dyn RepositoryPlugin`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The capability interface for repository backends.
///
/// Each operation runs within one host request and completes before the
/// response is returned; plugins keep no background work. The only state
/// a plugin owns is the session-scoped access token, held in the token
/// store handed to it at construction.
pub trait RepositoryPlugin: Send + Sync {
    /// Returns the name of this plugin (e.g., "onenote").
    fn name(&self) -> &str;

    /// Returns true if a usable token is present for the current session.
    fn is_logged_in(&self) -> bool;

    /// Returns the login affordance sending the user to the remote
    /// authorization endpoint.
    fn login_prompt(&self) -> LoginPrompt;

    /// Handles the OAuth2 callback.
    ///
    /// With `Some(code)`, exchanges the authorization code for a token and
    /// stores it for the session; a rejected exchange propagates as an
    /// authentication failure. With `None`, does nothing.
    fn handle_callback<'a>(&'a self, code: Option<&'a str>) -> BoxFuture<'a, RepositoryResult<()>>;

    /// Lists the entries at a slash-delimited folder path.
    ///
    /// An empty path lists the root. The returned listing carries the
    /// breadcrumb trail resolved from the path segments. `page` is the
    /// host's pagination cursor; backends listing full containers per
    /// call may ignore it.
    fn list_entries<'a>(
        &'a self,
        path: &'a str,
        page: u32,
    ) -> BoxFuture<'a, RepositoryResult<Listing>>;

    /// Downloads the entry identified by `id` to the caller-prepared
    /// local path and returns that path plus the remote source URL.
    fn fetch_entry<'a>(
        &'a self,
        id: &'a str,
        dest: &'a Path,
    ) -> BoxFuture<'a, RepositoryResult<FetchedFile>>;

    /// Invalidates the session token locally and remotely, returning a
    /// fresh login prompt.
    fn log_out(&self) -> BoxFuture<'_, RepositoryResult<LoginPrompt>>;

    /// Reports what this plugin supports.
    fn capabilities(&self) -> Capabilities;
}
