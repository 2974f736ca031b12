//! OneNote repository backend.
//!
//! This module provides an [`OneNoteRepository`] that bridges the
//! [`RepositoryPlugin`](crate::RepositoryPlugin) contract to a OneNote
//! account.
//!
//! # Authentication Flow
//!
//! 1. The host shows the [`LoginPrompt`](crate::LoginPrompt) URL; the
//!    browser lands on the service's consent page
//! 2. The service redirects back to the host's return URL with an
//!    authorization code
//! 3. The host feeds the code to `handle_callback`, which exchanges it
//!    for a bearer token and stores it for the session
//! 4. Listing and download calls read the session token on every call
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use noterepo_plugins::onenote::{OneNoteConfig, OneNoteRepository, OAuthCredentials};
//! use noterepo_plugins::{MemoryTokenStore, RepositoryPlugin, SessionId};
//!
//! let config = OneNoteConfig::new(
//!     OAuthCredentials::new("client-id", "client-secret"),
//!     "https://host.example/repository/callback",
//! );
//!
//! let repo = OneNoteRepository::new(
//!     config,
//!     Arc::new(MemoryTokenStore::new()),
//!     SessionId::new("user-session"),
//! )?;
//!
//! if !repo.is_logged_in() {
//!     println!("log in at {}", repo.login_prompt().url);
//! }
//! ```

mod client;
mod config;
mod oauth;
mod repository;

pub use client::OneNoteClient;
pub use config::{OAuthCredentials, OneNoteConfig};
pub use oauth::{OAuthClient, OAuthEndpoints};
pub use repository::OneNoteRepository;
