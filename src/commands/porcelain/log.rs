use crate::areas::commit_graph::CommitEntry;
use crate::areas::repository::Repository;
use crate::errors::Result;
use colored::Colorize;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    /// Stop after this many commits, 0 for the whole history
    pub max_count: usize,
    pub oneline: bool,
}

impl Repository {
    /// Print the first-parent history of HEAD, newest first
    pub fn log(&self, opts: &LogOptions) -> Result<Vec<CommitEntry>> {
        let history = self.commit_graph().get_history(opts.max_count)?;

        for entry in &history {
            if opts.oneline {
                self.show_commit_oneline(entry)?;
            } else {
                self.show_commit_medium(entry)?;
            }
        }

        Ok(history)
    }

    fn show_commit_medium(&self, entry: &CommitEntry) -> Result<()> {
        let commit = &entry.commit;

        self.print(format!("commit {}", entry.oid).yellow())?;
        self.print(format!("Author: {}", commit.author().display_name()))?;
        self.print(format!("Date:   {}", commit.author().readable_timestamp()))?;
        self.print("")?;
        for message_line in commit.message().lines() {
            self.print(format!("    {message_line}"))?;
        }
        self.print("")
    }

    fn show_commit_oneline(&self, entry: &CommitEntry) -> Result<()> {
        self.print(format!(
            "{} {}",
            entry.oid.to_short_oid().yellow(),
            entry.commit.short_message()
        ))
    }
}
