//! `thrivedoc_core` is the template variable engine behind the Thrive
//! examination-document template editor. It scans document content for
//! `{{namespace.key}}` placeholder tokens, resolves them against a merged
//! namespace of variable sources, validates compatibility with a selected
//! fee schedule, performs optimistic variable mutations with conflict
//! detection and rollback, and coordinates the save → publish and
//! external-pull flows between local draft state and the collaborative
//! document copy.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Document content
//!   → scan (tokenizes {{ns.key}} placeholders, dedups, order-preserving)
//!   → resolve (merges system / application / fees / custom sources)
//!   → validate (classifies placeholders, runs lint rules)
//!   → check_compatibility (required fee keys vs selected schedule)
//!   → SyncController (gates save → publish and confirm-gated pull)
//! ```
//!
//! Variable edits flow separately through [`MutationCoordinator`], whose
//! committed results feed back into the collections the registry resolves
//! from.
//!
//! ## Modules
//!
//! - [`model`] — Entity and payload types (templates, versions, variables,
//!   fee schedules, drafts).
//! - [`scanner`] — Placeholder extraction from raw document text.
//! - [`registry`] — The merged namespace mapping and fee value formatting.
//! - [`compat`] — The pure required-vs-available fee diff.
//! - [`validate`] — Placeholder classification plus pluggable lint rules.
//! - [`remote`] — Async collaborator seams (persistence, external document
//!   provider, schedule and variable stores).
//! - [`mutation`] — Optimistic create/update with rollback and conflict
//!   handling.
//! - [`sync`] — The push/pull state machine.
//!
//! ## Quick Start
//!
//! ```rust
//! use thrivedoc_core::resolve;
//! use thrivedoc_core::scan;
//! use thrivedoc_core::ValidationEngine;
//!
//! let content = "Dear {{application.examinee_name}}, your fee is {{fees.base_fee}}.";
//! let placeholders = scan(content);
//! let registry = resolve(&[], &[], None);
//! let result = ValidationEngine::new().validate(&placeholders, &registry);
//! assert!(result.is_valid());
//! ```

pub use compat::*;
pub use error::*;
pub use model::*;
pub use mutation::*;
pub use registry::*;
pub use remote::*;
pub use scanner::*;
pub use sync::*;
pub use validate::*;

pub mod compat;
mod error;
pub mod model;
pub mod mutation;
pub mod registry;
pub mod remote;
pub mod scanner;
pub mod sync;
pub mod validate;

#[cfg(test)]
mod __fixtures;
