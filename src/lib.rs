//! mim: a small content-addressed version control system
//!
//! - `areas`: the on-disk parts of a repository (object store, refs, index,
//!   working tree, configuration) and their composition in `Repository`
//! - `artifacts`: data structures and algorithms over those areas
//! - `commands`: user-facing operations as methods on `Repository`
//! - `remote`: synchronization with other repositories
//! - `errors`: the library error type

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
pub mod remote;
