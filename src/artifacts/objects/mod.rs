//! Stored object types
//!
//! Two kinds of objects live in the object store, both identified by the hash
//! of their stored bytes:
//!
//! - **Blob**: file content, stored verbatim
//! - **Commit**: snapshot record with parents, author, message and file table
//!
//! Objects carry no type header on disk; the reader knows what it expects from
//! context (refs and parent links name commits, file tables name blobs).

pub mod blob;
pub mod commit;
pub mod hasher;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-256 digest in hexadecimal format
pub const SHA256_HEX_LENGTH: usize = 64;

/// Length of a SHA-1 digest in hexadecimal format
pub const SHA1_HEX_LENGTH: usize = 40;

/// Length of an abbreviated object ID
pub const SHORT_ID_LENGTH: usize = 7;
