//! Working tree status
//!
//! - `file_change`: classification of a path into staged and unstaged changes
//! - `status_info`: the status report and its long and porcelain renderings

pub mod file_change;
pub mod status_info;
