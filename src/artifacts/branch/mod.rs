//! Branch names and revision arguments

pub mod branch_name;
pub mod revision;

/// Branch HEAD points at in a freshly initialized repository
pub const DEFAULT_BRANCH: &str = "master";

pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";
pub const PARENT_REGEX: &str = r"^(.+)\^$";
pub const ANCESTOR_REGEX: &str = r"^(.+)\~(\d+)$";

/// Shortest abbreviated object ID accepted as a revision
pub const MIN_ABBREVIATED_ID_LENGTH: usize = 4;
