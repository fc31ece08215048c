//! Data structures and algorithms
//!
//! - `branch`: branch names and revision parsing
//! - `checkout`: moving the working tree between commits, conflict detection
//! - `diff`: Myers line diff, hunks and patches
//! - `index`: index entries and their status codes
//! - `objects`: blob and commit objects, object IDs and hash functions
//! - `status`: working tree status reports

pub mod branch;
pub mod checkout;
pub mod diff;
pub mod index;
pub mod objects;
pub mod status;
