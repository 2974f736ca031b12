//! OneNote plugin configuration.

use std::time::Duration;

/// OAuth 2.0 credentials for the registered application.
///
/// Both values come from the host's admin settings; the admin form
/// requires them, so an empty value here is a deployment bug surfaced
/// by [`validate`](OAuthCredentials::validate) at construction.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    /// The OAuth 2.0 client ID of the registered application.
    pub client_id: String,
    /// The OAuth 2.0 client secret.
    pub client_secret: String,
}

impl OAuthCredentials {
    /// Creates new OAuth credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Validates that both credential values are present.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

/// Configuration for the OneNote repository plugin.
#[derive(Debug, Clone)]
pub struct OneNoteConfig {
    /// OAuth credentials for the registered application.
    pub credentials: OAuthCredentials,

    /// The host's callback endpoint the authorization redirect returns to.
    pub return_url: String,

    /// Whether the host renders in AJAX mode; drives popup vs full-page
    /// login presentation.
    pub popup: bool,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string for API requests.
    pub user_agent: String,

    /// URL where the user manages their notebooks.
    pub manage_url: String,

    /// OAuth scopes to request.
    pub scopes: Vec<String>,
}

impl OneNoteConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default OAuth scope for notebook access.
    pub const DEFAULT_SCOPE: &'static str = "office.onenote";

    /// Default management URL.
    pub const DEFAULT_MANAGE_URL: &'static str = "https://www.onenote.com/notebooks";

    /// Creates a new configuration with the given credentials and
    /// callback URL.
    pub fn new(credentials: OAuthCredentials, return_url: impl Into<String>) -> Self {
        Self {
            credentials,
            return_url: return_url.into(),
            popup: false,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("noterepo/{}", env!("CARGO_PKG_VERSION")),
            manage_url: Self::DEFAULT_MANAGE_URL.to_string(),
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
        }
    }

    /// Sets AJAX (popup) mode.
    pub fn with_popup(mut self, popup: bool) -> Self {
        self.popup = popup;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the management URL.
    pub fn with_manage_url(mut self, url: impl Into<String>) -> Self {
        self.manage_url = url.into();
        self
    }

    /// Sets the OAuth scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.credentials
            .validate()
            .map_err(|e| format!("invalid credentials: {}", e))?;

        if self.return_url.is_empty() {
            return Err("return_url is required".to_string());
        }

        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }

        Ok(())
    }
}
