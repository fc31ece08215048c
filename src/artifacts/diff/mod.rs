//! Line-level diffs
//!
//! - `myers`: shortest edit script between two line sequences
//! - `hunk`: grouping of edits into hunks with surrounding context
//! - `patch`: file diffs, their text form, and replaying them onto a target
//! - `format`: colored output for the terminal

pub mod format;
pub mod hunk;
pub mod myers;
pub mod patch;

use crate::errors::Result;
use hunk::{DEFAULT_CONTEXT, Hunk};
use myers::{DiffAlgorithm, MyersDiff};
use patch::FileDiff;

/// Hunks turning `old` into `new`, with the default amount of context
pub fn diff_lines(old: &[String], new: &[String]) -> Vec<Hunk> {
    diff_lines_with_context(old, new, DEFAULT_CONTEXT)
}

pub fn diff_lines_with_context(old: &[String], new: &[String], context: usize) -> Vec<Hunk> {
    Hunk::build(&MyersDiff::new(old, new).diff(), context)
}

/// Split text into lines without their terminators
///
/// A trailing newline does not start an extra empty line.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = text.split('\n').map(str::to_string).collect::<Vec<_>>();
    if lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }

    lines
}

/// Split text into lines, marking an unterminated last line
///
/// The mark is a trailing `\n`, which no split line can otherwise contain,
/// so `a` and `a\n` differ as last lines.
fn split_marked_lines(text: &str) -> (Vec<String>, bool) {
    let mut lines = split_lines(text);
    let missing_newline = !text.is_empty() && !text.ends_with('\n');
    if missing_newline && let Some(last) = lines.last_mut() {
        last.push('\n');
    }

    (lines, missing_newline)
}

pub fn diff_text(old_path: &str, new_path: &str, old: &str, new: &str) -> FileDiff {
    let (old_lines, old_missing_newline) = split_marked_lines(old);
    let (new_lines, new_missing_newline) = split_marked_lines(new);

    let mut hunks = diff_lines(&old_lines, &new_lines);
    for line in hunks.iter_mut().flat_map(|hunk| hunk.lines.iter_mut()) {
        if line.text.ends_with('\n') {
            line.text.pop();
        }
    }

    // the marker only matters when the final hunk covers the last line
    let last = hunks.last();
    let old_missing_newline =
        old_missing_newline && last.is_some_and(|hunk| hunk.old_end() == old_lines.len());
    let new_missing_newline =
        new_missing_newline && last.is_some_and(|hunk| hunk.new_end() == new_lines.len());

    FileDiff {
        old_path: old_path.to_string(),
        new_path: new_path.to_string(),
        hunks,
        old_missing_newline,
        new_missing_newline,
    }
}

/// Apply `diff` to `text`
///
/// When the final hunk reaches the end of `text`, the result ends with a
/// newline unless the diff marks the new side as lacking one. Otherwise
/// `text` keeps its own trailing newline state.
pub fn apply_patch_to_text(diff: &FileDiff, text: &str) -> Result<String> {
    let target = split_lines(text);
    let lines = patch::apply_patch(diff, &target)?;
    if lines.is_empty() {
        return Ok(String::new());
    }

    let reaches_end = diff
        .hunks
        .iter()
        .map(Hunk::old_end)
        .max()
        .is_some_and(|end| end == target.len());
    let ends_with_newline = if reaches_end {
        !diff.new_missing_newline
    } else {
        text.ends_with('\n')
    };

    let mut patched = lines.join("\n");
    if ends_with_newline {
        patched.push('\n');
    }

    Ok(patched)
}
