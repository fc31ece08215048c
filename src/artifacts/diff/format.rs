use crate::artifacts::diff::hunk::{Hunk, LineTag};
use crate::artifacts::diff::patch::{FileDiff, NO_NEWLINE_MARKER};
use colored::Colorize;
use std::io::Write;

/// Write `diff` in unified form with terminal colors
///
/// Colors are dropped automatically when `colored` is disabled (`NO_COLOR`,
/// non-terminal output).
pub fn write_colored(diff: &FileDiff, writer: &mut dyn Write) -> std::io::Result<()> {
    writeln!(writer, "{}", format!("--- {}", diff.old_path).bold())?;
    writeln!(writer, "{}", format!("+++ {}", diff.new_path).bold())?;

    for (hunk_index, hunk) in diff.hunks.iter().enumerate() {
        write_hunk(diff, hunk_index, hunk, writer)?;
    }

    Ok(())
}

fn write_hunk(diff: &FileDiff, hunk_index: usize, hunk: &Hunk, writer: &mut dyn Write) -> std::io::Result<()> {
    writeln!(writer, "{}", hunk.header().cyan())?;

    for (line_index, line) in hunk.lines.iter().enumerate() {
        let text = line.to_string();
        match line.tag {
            LineTag::Context => writeln!(writer, "{text}")?,
            LineTag::Delete => writeln!(writer, "{}", text.red())?,
            LineTag::Insert => writeln!(writer, "{}", text.green())?,
        }
        if diff.lacks_newline_after(hunk_index, line_index) {
            writeln!(writer, "{NO_NEWLINE_MARKER}")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::diff::diff_text;
    use pretty_assertions::assert_eq;

    #[test]
    fn uncolored_output_matches_serialization() {
        colored::control::set_override(false);
        let diff = diff_text("a.txt", "a.txt", "one\ntwo\n", "one\n2\n");

        let mut out = Vec::new();
        write_colored(&diff, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), diff.serialize());
    }

    #[test]
    fn uncolored_output_includes_the_newline_marker() {
        colored::control::set_override(false);
        let diff = diff_text("a.txt", "a.txt", "one\ntwo", "one\n2");

        let mut out = Vec::new();
        write_colored(&diff, &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out, diff.serialize());
        assert!(out.ends_with("+2\n\\ No newline at end of file\n"));
    }
}
