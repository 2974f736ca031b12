//! OAuth 2.0 authorization-code flow against the Microsoft consumer
//! endpoints.
//!
//! The plugin side of the flow is deliberately small: the host owns the
//! callback endpoint and hands the authorization code in, so all this
//! module does is build the authorization URL, exchange a code for a
//! bearer token, and hit the logout endpoint to invalidate the remote
//! session.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{RepositoryError, RepositoryResult};
use crate::session::AccessToken;

use super::config::OAuthCredentials;

/// Microsoft consumer (Live) OAuth endpoints.
const LIVE_AUTHORIZE_URL: &str = "https://login.live.com/oauth20_authorize.srf";
const LIVE_TOKEN_URL: &str = "https://login.live.com/oauth20_token.srf";
const LIVE_LOGOUT_URL: &str = "https://login.live.com/oauth20_logout.srf";

/// The endpoint set an [`OAuthClient`] talks to.
///
/// Defaults to the consumer cloud; overridable for organizational
/// deployments and for tests pointing at a local server.
#[derive(Debug, Clone)]
pub struct OAuthEndpoints {
    /// Browser-facing authorization endpoint.
    pub authorize_url: String,
    /// Token exchange endpoint.
    pub token_url: String,
    /// Remote session logout endpoint.
    pub logout_url: String,
}

impl Default for OAuthEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: LIVE_AUTHORIZE_URL.to_string(),
            token_url: LIVE_TOKEN_URL.to_string(),
            logout_url: LIVE_LOGOUT_URL.to_string(),
        }
    }
}

/// OAuth client for the notebook service.
#[derive(Debug)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    return_url: String,
    endpoints: OAuthEndpoints,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Creates a new OAuth client for the given credentials and host
    /// callback URL.
    pub fn new(credentials: OAuthCredentials, return_url: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            credentials,
            return_url: return_url.into(),
            endpoints: OAuthEndpoints::default(),
            http_client,
        }
    }

    /// Overrides the endpoint set.
    pub fn with_endpoints(mut self, endpoints: OAuthEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Builds the authorization URL the user's browser is sent to.
    pub fn login_url(&self, scopes: &[String]) -> String {
        let scope = scopes.join(" ");

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            self.endpoints.authorize_url,
            urlencoding::encode(&self.credentials.client_id),
            urlencoding::encode(&self.return_url),
            urlencoding::encode(&scope),
        )
    }

    /// Exchanges an authorization code for a bearer token.
    ///
    /// # Errors
    ///
    /// Any failure here is an authentication failure from the host's
    /// point of view: the user stays logged out and is prompted again.
    pub async fn exchange_code(&self, code: &str) -> RepositoryResult<AccessToken> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.return_url.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.endpoints.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| RepositoryError::network(format!("token exchange request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RepositoryError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(RepositoryError::authentication(format!(
                "token exchange failed ({}): {}",
                status, body
            )));
        }

        let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            RepositoryError::invalid_response(format!("invalid token response: {}", e))
        })?;

        info!("successfully obtained access token");
        Ok(AccessToken::new(
            token_response.access_token,
            token_response.expires_in,
        ))
    }

    /// Invalidates the remote-side session.
    pub async fn log_out(&self) -> RepositoryResult<()> {
        let url = format!(
            "{}?client_id={}&redirect_uri={}",
            self.endpoints.logout_url,
            urlencoding::encode(&self.credentials.client_id),
            urlencoding::encode(&self.return_url),
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| RepositoryError::network(format!("logout request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() && !status.is_redirection() {
            return Err(RepositoryError::server(format!(
                "logout failed ({})",
                status
            )));
        }

        debug!("remote session invalidated");
        Ok(())
    }
}

/// Response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    scope: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> OAuthClient {
        OAuthClient::new(
            OAuthCredentials::new("test-client-id", "test-secret"),
            "https://host.example/repository/callback",
            Duration::from_secs(5),
        )
    }

    #[test]
    fn login_url_format() {
        let client = test_client();
        let url = client.login_url(&["office.onenote".to_string()]);

        assert!(url.starts_with(LIVE_AUTHORIZE_URL));
        assert!(url.contains("client_id=test-client-id"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=office.onenote"));
        assert!(url.contains(&urlencoding::encode("https://host.example/repository/callback").into_owned()));
    }

    #[test]
    fn login_url_joins_scopes() {
        let client = test_client();
        let url = client.login_url(&["office.onenote".to_string(), "wl.offline_access".to_string()]);
        assert!(url.contains(&urlencoding::encode("office.onenote wl.offline_access").into_owned()));
    }

    #[test]
    fn token_response_parsing() {
        let json = r#"{
            "token_type": "bearer",
            "expires_in": 3600,
            "scope": "office.onenote",
            "access_token": "EwAoA..."
        }"#;

        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "EwAoA...");
        assert_eq!(response.expires_in, Some(3600));
    }

    #[test]
    fn token_response_minimal() {
        let json = r#"{ "access_token": "tok" }"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "tok");
        assert!(response.expires_in.is_none());
    }

    #[tokio::test]
    async fn exchange_code_success() {
        use wiremock::matchers::{body_string_contains, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=auth-code-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-xyz",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let client = test_client().with_endpoints(OAuthEndpoints {
            authorize_url: format!("{}/authorize", server.uri()),
            token_url: format!("{}/token", server.uri()),
            logout_url: format!("{}/logout", server.uri()),
        });

        let token = client.exchange_code("auth-code-1").await.unwrap();
        assert_eq!(token.secret, "tok-xyz");
        assert!(!token.is_expired());
    }

    #[tokio::test]
    async fn exchange_code_rejection_is_authentication_failure() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let client = test_client().with_endpoints(OAuthEndpoints {
            authorize_url: format!("{}/authorize", server.uri()),
            token_url: format!("{}/token", server.uri()),
            logout_url: format!("{}/logout", server.uri()),
        });

        let err = client.exchange_code("bad-code").await.unwrap_err();
        assert_eq!(
            err.code(),
            crate::error::RepositoryErrorCode::AuthenticationFailed
        );
    }
}
