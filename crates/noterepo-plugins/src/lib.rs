//! RepositoryPlugin trait and implementations.
//!
//! This crate provides the abstraction layer for repository backends:
//!
//! - [`RepositoryPlugin`] - The capability trait the host framework
//!   depends on
//! - [`TokenStore`] - Session-scoped token storage handed to plugins
//! - [`RepositoryError`] - Error types for plugin operations
//! - [`onenote`] - The OneNote backend
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  OneNote API     │
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐     ┌─────────────┐
//! │ OneNoteRepository│────▶│ TokenStore  │ (per-session token)
//! └────────┬─────────┘     └─────────────┘
//!          │
//!          │ RepositoryPlugin
//!          ▼
//! ┌──────────────────┐
//! │  Host framework  │ (listings, downloads, login prompts)
//! └──────────────────┘
//! ```

pub mod error;
pub mod onenote;
pub mod plugin;
pub mod session;

// Re-export main types at crate root
pub use error::{RepositoryError, RepositoryErrorCode, RepositoryResult};
pub use plugin::{BoxFuture, FetchedFile, LoginMode, LoginPrompt, RepositoryPlugin};
pub use session::{AccessToken, FileTokenStore, MemoryTokenStore, SessionId, TokenStore};
