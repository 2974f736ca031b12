//! Capability reporting for repository plugins.

use serde::{Deserialize, Serialize};

/// Which file types a plugin can deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileTypeFilter {
    /// Any file type.
    Any,
    /// Only the listed extensions (without leading dot).
    Extensions(Vec<String>),
}

impl FileTypeFilter {
    /// Returns true if a file with the given extension is accepted.
    pub fn accepts(&self, extension: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Extensions(exts) => exts.iter().any(|e| e.eq_ignore_ascii_case(extension)),
        }
    }
}

/// How fetched files relate to their remote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnMode {
    /// Files are copied into host storage.
    Copy,
    /// Files are referenced at their remote location.
    Reference,
}

/// What a repository plugin supports, reported once to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Whether the plugin can answer global (cross-folder) searches.
    pub global_search: bool,
    /// Accepted file types.
    pub filetypes: FileTypeFilter,
    /// How fetched files are returned.
    pub return_mode: ReturnMode,
}

impl Capabilities {
    /// Capabilities of a copy-in backend without search, accepting
    /// any file type.
    pub fn copy_in() -> Self {
        Self {
            global_search: false,
            filetypes: FileTypeFilter::Any,
            return_mode: ReturnMode::Copy,
        }
    }
}
