//! Porcelain commands (user-facing operations)
//!
//! Each command is an inherent method on [`Repository`](crate::areas::repository::Repository)
//! that takes the repository lock when it mutates state and writes its report
//! to the repository's writer.
//!
//! ## Commands
//!
//! - `init`: create the metadata directory
//! - `add`, `restore --staged`, `rm`: edit the staging area
//! - `commit`: record the staged snapshot
//! - `status`: staged, unstaged and untracked files
//! - `log`: first-parent history
//! - `branch`: create, list or delete branches
//! - `checkout`: switch branches or detach HEAD
//! - `diff`, `apply`: line diffs between files and patch replay
//! - `remote`, `push`, `pull`, `clone`: synchronization with other repositories

pub mod add;
pub mod apply;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod diff;
pub mod init;
pub mod log;
pub mod remote;
pub mod restore;
pub mod rm;
pub mod status;
