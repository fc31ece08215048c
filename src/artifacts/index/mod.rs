//! Index file format
//!
//! The index (staging area) records one entry per path of the working tree.
//! It is a text file with one tab-separated line per entry, sorted by path:
//!
//! ```text
//! <path>\t<hash>\t<last-commit-hash>\t<status-code>
//! ```
//!
//! Either hash may be empty: a deleted file has no current hash and a file
//! that was never committed has no last-commit hash.

pub mod file_status;
pub mod index_entry;

/// Field separator of an index line
pub const FIELD_SEPARATOR: char = '\t';
