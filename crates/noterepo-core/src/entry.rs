//! View-model types for browsable repository content.
//!
//! These are the shapes the host framework consumes: file-like entries,
//! the breadcrumb trail, and the listing returned for a folder path.
//! None of them are owned by a plugin beyond the duration of one call —
//! they are requested fresh from the remote service every time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of a remote entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A notebook: the top-level container.
    Notebook,
    /// A section: browsable and also the downloadable unit.
    Section,
    /// A page inside a section. Leaf node.
    Page,
}

impl EntryKind {
    /// Returns true if entries of this kind can be opened as a folder.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Notebook | Self::Section)
    }
}

/// A single entry in a folder listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Remote identifier, opaque to the host.
    pub id: String,
    /// Display name shown in the file picker.
    pub title: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Last modification time, if the service reports one.
    pub modified: Option<DateTime<Utc>>,
}

impl FileEntry {
    /// Creates a new entry with the given id, title and kind.
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            modified: None,
        }
    }

    /// Builder method to set the modification time.
    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }
}

/// One element of the navigation trail: a display name and the
/// slash-delimited path that reaches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Display name of the folder.
    pub name: String,
    /// Accumulated path from the root ("" for the root itself).
    pub path: String,
}

impl Breadcrumb {
    /// Creates a breadcrumb element.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// The result of listing a folder path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Folder contents are loaded lazily, one folder at a time.
    pub dynamic_load: bool,
    /// Whether the backend supports searching this listing.
    pub search_supported: bool,
    /// URL where the user can manage their account content.
    pub manage_url: String,
    /// Navigation trail from the root to the listed folder.
    pub breadcrumbs: Vec<Breadcrumb>,
    /// Child entries at the listed path.
    pub entries: Vec<FileEntry>,
}

impl Listing {
    /// Creates a listing rooted at the given breadcrumb, with no entries.
    pub fn new(root: Breadcrumb, manage_url: impl Into<String>) -> Self {
        Self {
            dynamic_load: true,
            search_supported: false,
            manage_url: manage_url.into(),
            breadcrumbs: vec![root],
            entries: Vec::new(),
        }
    }

    /// Builder method to set the child entries.
    pub fn with_entries(mut self, entries: Vec<FileEntry>) -> Self {
        self.entries = entries;
        self
    }

    /// Appends a breadcrumb to the trail.
    pub fn push_breadcrumb(&mut self, crumb: Breadcrumb) {
        self.breadcrumbs.push(crumb);
    }
}
