//! Declarative SELinux file-context management.
//!
//! Reconciles desired fcontext mappings (path spec, file type, context type)
//! against the `semanage` policy store: each operation re-reads current
//! state, applies the minimal mutation (add, modify, delete, or nothing) and
//! runs a `restorecon` relabel pass over the affected paths when the store
//! actually changed.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod constants;
pub mod mapping;
pub mod reconciler;

// Policy store querying and relabeling
pub mod query;
pub mod relabel;

// Host integration
pub mod platform;
pub mod tools;

// Re-exports for convenience
pub use mapping::{ContextMapping, FileTypeCode};
pub use reconciler::{ContextReconciler, Outcome};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
