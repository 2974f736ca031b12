//! Core types: entries, listings, breadcrumbs, capabilities

pub mod capabilities;
pub mod entry;
pub mod tracing;

pub use capabilities::{Capabilities, FileTypeFilter, ReturnMode};
pub use entry::{Breadcrumb, EntryKind, FileEntry, Listing};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
