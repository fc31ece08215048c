//! Core repository components
//!
//! - `database`: content-addressable object store
//! - `refs`: branches and HEAD
//! - `commit_graph`: commit creation and history walks over `database` and `refs`
//! - `index`: staging area and per-path status tracking
//! - `workspace`: working-tree file system operations
//! - `config`: settings and remotes under `.mim/config`
//! - `identity`: author of new commits
//! - `lock`: exclusive repository lock for mutating operations
//! - `repository`: composition of all of the above

pub mod commit_graph;
pub mod config;
pub mod database;
pub mod identity;
pub mod index;
pub mod lock;
pub mod refs;
pub mod repository;
pub mod workspace;

/// Name of the metadata directory at the working-tree root
pub const METADATA_DIR: &str = ".mim";
