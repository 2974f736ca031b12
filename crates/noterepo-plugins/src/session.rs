//! Session-scoped token storage.
//!
//! The access token is the only entity this layer persists. It is created
//! on a successful OAuth callback, read on every listing/download call,
//! and discarded at logout or when the session ends. Instead of an
//! ambient session global, plugins receive an explicit [`TokenStore`]
//! keyed by session id, so the dependency is visible and testable.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RepositoryError, RepositoryResult};

/// A bearer token obtained from the OAuth2 code exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// The opaque credential string sent as the bearer token.
    pub secret: String,

    /// When the token expires, if the exchange reported a lifetime.
    pub expires_at: Option<DateTime<Utc>>,

    /// When the token was obtained.
    pub acquired_at: DateTime<Utc>,
}

impl AccessToken {
    /// Creates a token from OAuth exchange response data.
    pub fn new(secret: impl Into<String>, expires_in_secs: Option<i64>) -> Self {
        let expires_at = expires_in_secs.map(|secs| {
            // Refresh margin so the token is not used right at expiry
            Utc::now() + Duration::seconds(secs) - Duration::seconds(60)
        });

        Self {
            secret: secret.into(),
            expires_at,
            acquired_at: Utc::now(),
        }
    }

    /// Returns true if the token is expired or about to expire.
    ///
    /// Tokens without a reported lifetime are session-scoped and treated
    /// as valid.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            None => false,
        }
    }
}

/// Identifies one user session at the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Per-session token storage.
///
/// The host framework decides where tokens live (in-memory per worker,
/// on disk for a CLI); plugins only see this interface.
pub trait TokenStore: Send + Sync {
    /// Returns the token stored for the session, if any.
    fn get(&self, session: &SessionId) -> Option<AccessToken>;

    /// Stores a token for the session, replacing any previous one.
    fn set(&self, session: &SessionId, token: AccessToken) -> RepositoryResult<()>;

    /// Removes the token stored for the session. Clearing an absent
    /// token is not an error.
    fn clear(&self, session: &SessionId) -> RepositoryResult<()>;
}

/// In-memory token store, one entry per session.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<HashMap<SessionId, AccessToken>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, session: &SessionId) -> Option<AccessToken> {
        self.tokens.read().unwrap().get(session).cloned()
    }

    fn set(&self, session: &SessionId, token: AccessToken) -> RepositoryResult<()> {
        self.tokens.write().unwrap().insert(session.clone(), token);
        Ok(())
    }

    fn clear(&self, session: &SessionId) -> RepositoryResult<()> {
        self.tokens.write().unwrap().remove(session);
        Ok(())
    }
}

/// File-backed token store: one JSON file per session under a directory.
///
/// Writes go to a temp file first, then rename, so a crash cannot leave a
/// half-written token behind. Files get restrictive permissions on Unix.
#[derive(Debug)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    /// Creates a store rooted at the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn token_path(&self, session: &SessionId) -> PathBuf {
        // Session ids come from the host; keep only filename-safe chars.
        let safe: String = session
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("token-{}.json", safe))
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, session: &SessionId) -> Option<AccessToken> {
        let path = self.token_path(session);
        if !path.exists() {
            debug!("no token file at {:?}", path);
            return None;
        }

        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(token) => Some(token),
            Err(e) => {
                debug!("failed to parse token file {:?}: {}", path, e);
                None
            }
        }
    }

    fn set(&self, session: &SessionId, token: AccessToken) -> RepositoryResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            RepositoryError::configuration(format!("failed to create token directory: {}", e))
        })?;

        let path = self.token_path(session);
        let temp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(&token)
            .map_err(|e| RepositoryError::internal(format!("failed to serialize token: {}", e)))?;

        fs::write(&temp_path, &content).map_err(|e| {
            RepositoryError::configuration(format!("failed to write token file: {}", e))
        })?;

        fs::rename(&temp_path, &path).map_err(|e| {
            RepositoryError::configuration(format!("failed to rename token file: {}", e))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&path, perms);
        }

        debug!("saved token to {:?}", path);
        Ok(())
    }

    fn clear(&self, session: &SessionId) -> RepositoryResult<()> {
        let path = self.token_path(session);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                RepositoryError::configuration(format!("failed to remove token file: {}", e))
            })?;
            info!("cleared token at {:?}", path);
        }
        Ok(())
    }
}
