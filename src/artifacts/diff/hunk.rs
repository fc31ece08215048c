//! Hunks: contiguous runs of changes with surrounding context
//!
//! Line numbers are 1-based. A side with a zero count names the line the
//! hunk sits after, so an insertion at the top of a file starts at line 0.

use crate::artifacts::diff::myers::Edit;
use crate::errors::{Error, Result};
use derive_new::new;
use regex::Regex;
use std::sync::LazyLock;

/// Lines of unchanged context kept around each change
pub const DEFAULT_CONTEXT: usize = 3;

const HUNK_HEADER_REGEX: &str = r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@";

static HUNK_HEADER_PATTERN: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(HUNK_HEADER_REGEX));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineTag {
    Context,
    Insert,
    Delete,
}

impl LineTag {
    pub fn prefix(&self) -> char {
        match self {
            LineTag::Context => ' ',
            LineTag::Insert => '+',
            LineTag::Delete => '-',
        }
    }

    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            ' ' => Some(LineTag::Context),
            '+' => Some(LineTag::Insert),
            '-' => Some(LineTag::Delete),
            _ => None,
        }
    }

    /// Whether the line exists in the old file
    pub fn in_old(&self) -> bool {
        !matches!(self, LineTag::Insert)
    }

    /// Whether the line exists in the new file
    pub fn in_new(&self) -> bool {
        !matches!(self, LineTag::Delete)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, new)]
pub struct DiffLine {
    pub tag: LineTag,
    pub text: String,
}

impl std::fmt::Display for DiffLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.tag.prefix(), self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, new)]
pub struct Hunk {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// `@@ -old_start,old_count +new_start,new_count @@`
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_count, self.new_start, self.new_count
        )
    }

    /// Parse a header line into `(old_start, old_count, new_start, new_count)`
    ///
    /// An omitted count means one line.
    pub fn parse_header(line: &str) -> Result<(usize, usize, usize, usize)> {
        let re = HUNK_HEADER_PATTERN
            .as_ref()
            .map_err(|e| Error::InvalidState(format!("invalid hunk header regex: {e}")))?;
        let caps = re
            .captures(line)
            .ok_or_else(|| Error::InvalidObject(format!("invalid hunk header {line:?}")))?;

        let number = |index: usize| -> Result<usize> {
            caps.get(index)
                .map(|m| m.as_str().parse::<usize>())
                .transpose()
                .map_err(|e| Error::InvalidObject(format!("invalid hunk header {line:?}: {e}")))
                .map(|value| value.unwrap_or(1))
        };

        Ok((number(1)?, number(2)?, number(3)?, number(4)?))
    }

    /// Number of old lines up to and including the hunk's last old line
    pub fn old_end(&self) -> usize {
        match self.old_count {
            0 => self.old_start,
            count => self.old_start.saturating_sub(1) + count,
        }
    }

    /// Number of new lines up to and including the hunk's last new line
    pub fn new_end(&self) -> usize {
        match self.new_count {
            0 => self.new_start,
            count => self.new_start.saturating_sub(1) + count,
        }
    }

    /// Lines the hunk expects to find in the old file
    pub fn old_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|line| line.tag.in_old())
            .map(|line| line.text.as_str())
    }

    /// Lines the hunk leaves in the new file
    pub fn new_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|line| line.tag.in_new())
            .map(|line| line.text.as_str())
    }

    /// Group an edit script into hunks with `context` lines of context
    ///
    /// Changes separated by at most `2 * context` unchanged lines share a hunk.
    pub fn build(edits: &[Edit<String>], context: usize) -> Vec<Hunk> {
        // old and new line offsets before each edit
        let mut offsets = Vec::with_capacity(edits.len() + 1);
        let (mut old_offset, mut new_offset) = (0usize, 0usize);
        for edit in edits {
            offsets.push((old_offset, new_offset));
            match edit {
                Edit::Delete { .. } => old_offset += 1,
                Edit::Insert { .. } => new_offset += 1,
                Edit::Equal { .. } => {
                    old_offset += 1;
                    new_offset += 1;
                }
            }
        }
        offsets.push((old_offset, new_offset));

        let changes = edits
            .iter()
            .enumerate()
            .filter(|(_, edit)| edit.is_change())
            .map(|(position, _)| position)
            .collect::<Vec<_>>();

        let mut hunks = Vec::new();
        let mut next = 0;
        while next < changes.len() {
            let first = changes[next];
            let mut last = first;
            next += 1;

            while next < changes.len() && changes[next] - last - 1 <= 2 * context {
                last = changes[next];
                next += 1;
            }

            let start = first.saturating_sub(context);
            let end = (last + context + 1).min(edits.len());
            hunks.push(Self::from_edits(&edits[start..end], offsets[start]));
        }

        hunks
    }

    fn from_edits(edits: &[Edit<String>], (old_offset, new_offset): (usize, usize)) -> Hunk {
        let lines = edits
            .iter()
            .map(|edit| match edit {
                Edit::Delete { value } => DiffLine::new(LineTag::Delete, value.clone()),
                Edit::Insert { value } => DiffLine::new(LineTag::Insert, value.clone()),
                Edit::Equal { value } => DiffLine::new(LineTag::Context, value.clone()),
            })
            .collect::<Vec<_>>();

        let old_count = lines.iter().filter(|line| line.tag.in_old()).count();
        let new_count = lines.iter().filter(|line| line.tag.in_new()).count();

        Hunk {
            old_start: if old_count == 0 { old_offset } else { old_offset + 1 },
            old_count,
            new_start: if new_count == 0 { new_offset } else { new_offset + 1 },
            new_count,
            lines,
        }
    }
}
