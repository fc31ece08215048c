//! Plumbing commands (direct access to the object store)
//!
//! - `cat-file`: print a stored object
//! - `hash-object`: compute a blob ID and optionally store the blob

pub mod cat_file;
pub mod hash_object;
