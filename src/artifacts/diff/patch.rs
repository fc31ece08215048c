//! File diffs: serialization, parsing and application
//!
//! ## Format
//!
//! ```text
//! --- <old path>
//! +++ <new path>
//! @@ -<old start>,<old count> +<new start>,<new count> @@
//!  context line
//! -deleted line
//! +inserted line
//! \ No newline at end of file
//! ```
//!
//! The marker follows the last line of a side that does not end with a
//! newline; only the final hunk can carry it.

use crate::artifacts::diff::hunk::{DiffLine, Hunk, LineTag};
use crate::errors::{Error, Result};
use derive_new::new;

const OLD_PATH_PREFIX: &str = "--- ";
const NEW_PATH_PREFIX: &str = "+++ ";
pub(crate) const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

#[derive(Debug, Clone, PartialEq, Eq, Hash, new)]
pub struct FileDiff {
    pub old_path: String,
    pub new_path: String,
    pub hunks: Vec<Hunk>,
    /// The old file's last line, covered by the final hunk, has no newline
    #[new(default)]
    pub old_missing_newline: bool,
    /// The new file's last line, covered by the final hunk, has no newline
    #[new(default)]
    pub new_missing_newline: bool,
}

impl FileDiff {
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Whether line `line_index` of hunk `hunk_index` is followed by the
    /// no-newline marker
    pub fn lacks_newline_after(&self, hunk_index: usize, line_index: usize) -> bool {
        if hunk_index + 1 != self.hunks.len() {
            return false;
        }

        let lines = &self.hunks[hunk_index].lines;
        let last_old = lines.iter().rposition(|line| line.tag.in_old());
        let last_new = lines.iter().rposition(|line| line.tag.in_new());

        (self.old_missing_newline && last_old == Some(line_index))
            || (self.new_missing_newline && last_new == Some(line_index))
    }

    fn record_missing_newline(&mut self, after: Option<LineTag>) -> Result<()> {
        match after {
            Some(LineTag::Context) => {
                self.old_missing_newline = true;
                self.new_missing_newline = true;
            }
            Some(LineTag::Delete) => self.old_missing_newline = true,
            Some(LineTag::Insert) => self.new_missing_newline = true,
            None => {
                return Err(Error::InvalidObject(format!(
                    "{NO_NEWLINE_MARKER:?} does not follow a hunk line"
                )));
            }
        }

        Ok(())
    }

    pub fn serialize(&self) -> String {
        let mut out = format!("{OLD_PATH_PREFIX}{}\n{NEW_PATH_PREFIX}{}\n", self.old_path, self.new_path);

        for (hunk_index, hunk) in self.hunks.iter().enumerate() {
            out.push_str(&hunk.header());
            out.push('\n');
            for (line_index, line) in hunk.lines.iter().enumerate() {
                out.push_str(&line.to_string());
                out.push('\n');
                if self.lacks_newline_after(hunk_index, line_index) {
                    out.push_str(NO_NEWLINE_MARKER);
                    out.push('\n');
                }
            }
        }

        out
    }

    /// Parse the serialized form
    ///
    /// Lines are split on `\n` only, so a `\r` stays part of the line text.
    /// Hunk bodies are read by their header counts, so an empty line inside a
    /// body is an empty context line.
    pub fn parse(text: &str) -> Result<Self> {
        let mut pieces = text.split('\n').collect::<Vec<_>>();
        if pieces.last().is_some_and(|piece| piece.is_empty()) {
            pieces.pop();
        }
        let mut lines = pieces.into_iter().peekable();

        let old_path = lines
            .next()
            .and_then(|line| line.strip_prefix(OLD_PATH_PREFIX))
            .ok_or_else(|| Error::InvalidObject("patch is missing its '--- ' line".into()))?
            .to_string();
        let new_path = lines
            .next()
            .and_then(|line| line.strip_prefix(NEW_PATH_PREFIX))
            .ok_or_else(|| Error::InvalidObject("patch is missing its '+++ ' line".into()))?
            .to_string();

        let mut diff = FileDiff::new(old_path, new_path, Vec::new());
        while let Some(header) = lines.next() {
            if header.trim().is_empty() {
                continue;
            }

            let (old_start, old_count, new_start, new_count) = Hunk::parse_header(header)?;
            let (mut old_seen, mut new_seen) = (0, 0);
            let mut body: Vec<DiffLine> = Vec::new();

            while old_seen < old_count || new_seen < new_count {
                let line = lines.next().ok_or_else(|| {
                    Error::InvalidObject(format!("hunk {header:?} ends early"))
                })?;
                if line == NO_NEWLINE_MARKER {
                    diff.record_missing_newline(body.last().map(|line| line.tag))?;
                    continue;
                }

                let mut chars = line.chars();
                let tag = match chars.next() {
                    None => LineTag::Context,
                    Some(prefix) => LineTag::from_prefix(prefix).ok_or_else(|| {
                        Error::InvalidObject(format!("invalid hunk line {line:?}"))
                    })?,
                };

                old_seen += usize::from(tag.in_old());
                new_seen += usize::from(tag.in_new());
                body.push(DiffLine::new(tag, chars.as_str().to_string()));
            }

            if old_seen != old_count || new_seen != new_count {
                return Err(Error::InvalidObject(format!(
                    "hunk {header:?} does not match its line counts"
                )));
            }
            while lines.next_if_eq(&NO_NEWLINE_MARKER).is_some() {
                diff.record_missing_newline(body.last().map(|line| line.tag))?;
            }

            diff.hunks
                .push(Hunk::new(old_start, old_count, new_start, new_count, body));
        }

        Ok(diff)
    }
}

/// Replay a diff onto `target`
///
/// Hunks apply in `old_start` order. Every hunk is checked (range, matching
/// context and deleted lines, no overlap with the previous hunk) before the
/// result is returned; on failure nothing is produced and `target` is untouched.
pub fn apply_patch(diff: &FileDiff, target: &[String]) -> Result<Vec<String>> {
    let mut hunks = diff.hunks.iter().enumerate().collect::<Vec<_>>();
    hunks.sort_by_key(|(_, hunk)| hunk.old_start);

    let mut output = Vec::with_capacity(target.len());
    let mut cursor = 0;

    for (index, hunk) in hunks {
        let out_of_range = |reason: String| Error::HunkOutOfRange { index, reason };

        let expected = hunk.old_lines().collect::<Vec<_>>();
        if expected.len() != hunk.old_count {
            return Err(out_of_range(format!(
                "header counts {} old lines, body has {}",
                hunk.old_count,
                expected.len()
            )));
        }

        let start = match (hunk.old_start, hunk.old_count) {
            (start, 0) => start,
            (0, _) => return Err(out_of_range("old start 0 with a non-empty old side".into())),
            (start, _) => start - 1,
        };
        let end = start + hunk.old_count;

        if end > target.len() {
            return Err(out_of_range(format!(
                "lines {}..{end} exceed the {} lines of the target",
                start + 1,
                target.len()
            )));
        }
        if start < cursor {
            return Err(out_of_range(format!(
                "overlaps the previous hunk ending at line {cursor}"
            )));
        }

        if let Some(offset) = expected
            .iter()
            .zip(&target[start..end])
            .position(|(expected, actual)| *expected != actual.as_str())
        {
            return Err(out_of_range(format!(
                "line {} is {:?}, expected {:?}",
                start + offset + 1,
                target[start + offset],
                expected[offset]
            )));
        }

        output.extend_from_slice(&target[cursor..start]);
        output.extend(hunk.new_lines().map(str::to_string));
        cursor = end;
    }

    output.extend_from_slice(&target[cursor..]);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::diff::{apply_patch_to_text, diff_lines, diff_text};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|line| line.to_string()).collect()
    }

    fn file_diff(old: &[&str], new: &[&str]) -> FileDiff {
        FileDiff::new(
            "a.txt".to_string(),
            "a.txt".to_string(),
            diff_lines(&lines(old), &lines(new)),
        )
    }

    #[test]
    fn serializes_in_unified_form() {
        let diff = file_diff(&["Line1", "Line2", "Line3"], &["Line1", "LineX", "Line3"]);

        assert_eq!(
            diff.serialize(),
            "--- a.txt\n+++ a.txt\n@@ -1,3 +1,3 @@\n Line1\n-Line2\n+LineX\n Line3\n"
        );
    }

    #[test]
    fn empty_lines_parse_as_empty_context() {
        let diff = FileDiff::parse("--- a\n+++ b\n@@ -1,3 +1,3 @@\n first\n\n-x\n+y\n").unwrap();

        assert_eq!(diff.hunks[0].lines[1], DiffLine::new(LineTag::Context, String::new()));
    }

    #[test]
    fn parses_carriage_returns_as_line_text() {
        let diff = FileDiff::parse("--- a\n+++ b\n@@ -1,1 +1,1 @@\n-x\r\n+y\r\n").unwrap();

        assert_eq!(diff.hunks[0].lines[0], DiffLine::new(LineTag::Delete, "x\r".to_string()));
        assert_eq!(diff.hunks[0].lines[1], DiffLine::new(LineTag::Insert, "y\r".to_string()));
    }

    #[test]
    fn records_which_side_lacks_a_newline() {
        let diff = FileDiff::parse(
            "--- a\n+++ b\n@@ -1,1 +1,1 @@\n-x\n\\ No newline at end of file\n+y\n",
        )
        .unwrap();

        assert!(diff.old_missing_newline);
        assert!(!diff.new_missing_newline);
    }

    #[test]
    fn rejects_truncated_hunks() {
        let result = FileDiff::parse("--- a\n+++ b\n@@ -1,3 +1,3 @@\n first\n");

        assert!(matches!(result, Err(Error::InvalidObject(_))));
    }

    #[test]
    fn rejects_mismatched_context() {
        let diff = file_diff(&["a", "b", "c"], &["a", "B", "c"]);
        let target = lines(&["a", "b", "changed"]);

        let result = apply_patch(&diff, &target);

        assert!(matches!(result, Err(Error::HunkOutOfRange { index: 0, .. })));
        assert_eq!(target, lines(&["a", "b", "changed"]));
    }

    #[test]
    fn rejects_hunks_past_the_end() {
        let diff = file_diff(&["a", "b", "c", "d"], &["a", "b", "c", "D"]);

        let result = apply_patch(&diff, &lines(&["a", "b"]));

        assert!(matches!(result, Err(Error::HunkOutOfRange { .. })));
    }

    #[test]
    fn rejects_overlapping_hunks() {
        let hunk = |start| {
            Hunk::new(
                start,
                2,
                start,
                2,
                vec![
                    DiffLine::new(LineTag::Context, "a".to_string()),
                    DiffLine::new(LineTag::Context, "a".to_string()),
                ],
            )
        };
        let diff = FileDiff::new("f".into(), "f".into(), vec![hunk(1), hunk(2)]);

        let result = apply_patch(&diff, &lines(&["a", "a", "a"]));

        assert!(matches!(result, Err(Error::HunkOutOfRange { index: 1, .. })));
    }

    #[test]
    fn applies_hunks_given_out_of_order() {
        let old = (1..=20).map(|n| format!("l{n}")).collect::<Vec<_>>();
        let mut new = old.clone();
        new[0] = "first".to_string();
        new[19] = "last".to_string();
        let mut diff = FileDiff::new("f".into(), "f".into(), diff_lines(&old, &new));
        diff.hunks.reverse();

        assert_eq!(apply_patch(&diff, &old).unwrap(), new);
    }

    fn line_sequences() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("[a-c\ré]{0,2}", 0..16)
    }

    fn texts() -> impl Strategy<Value = String> {
        (line_sequences(), any::<bool>()).prop_map(|(lines, terminated)| {
            let mut text = lines.join("\n");
            if terminated && !lines.is_empty() {
                text.push('\n');
            }
            text
        })
    }

    proptest! {
        #[test]
        fn applying_a_diff_reproduces_the_new_side(a in line_sequences(), b in line_sequences()) {
            let diff = FileDiff::new("f".into(), "f".into(), diff_lines(&a, &b));

            prop_assert_eq!(apply_patch(&diff, &a).unwrap(), b);
        }

        #[test]
        fn parsing_inverts_serialization(a in line_sequences(), b in line_sequences()) {
            let diff = FileDiff::new("old/f".into(), "new/f".into(), diff_lines(&a, &b));

            prop_assert_eq!(FileDiff::parse(&diff.serialize()).unwrap(), diff);
        }

        #[test]
        fn text_patches_survive_serialization(a in texts(), b in texts()) {
            let diff = diff_text("f", "f", &a, &b);
            let parsed = FileDiff::parse(&diff.serialize()).unwrap();

            prop_assert_eq!(&parsed, &diff);
            prop_assert_eq!(apply_patch_to_text(&parsed, &a).unwrap(), b);
        }

        #[test]
        fn identical_inputs_have_no_hunks(a in line_sequences()) {
            prop_assert!(diff_lines(&a, &a).is_empty());
        }
    }
}
