//! Filesystem side of FIS.
//!
//! ## Architecture
//!
//! ### ignore.rs
//! Decides which paths never make it into a document: custom anchored regex
//! rules, `.gitignore` semantics via the `ignore` crate, version control
//! metadata directories and `.fis` documents. Any enabled rule excludes.
//!
//! ### text.rs
//! Sniffs a bounded prefix of a file to decide whether it is embedded verbatim
//! or marked `[BINARY]`.
//!
//! ### resolver.rs
//! Maps record paths (untrusted, possibly model generated) onto real paths
//! under a project root, rejecting anything that would escape it.
//!
//! ### apply.rs
//! Executes decoded records against a project root and reports a per-record
//! outcome. All writes from documents go through this layer.

pub mod apply;
pub mod ignore;
pub mod resolver;
pub mod text;
