//! Command implementations
//!
//! - `plumbing`: low-level object store commands (cat-file, hash-object)
//! - `porcelain`: user-facing workflows (add, commit, log, checkout, ...)

pub mod plumbing;
pub mod porcelain;
