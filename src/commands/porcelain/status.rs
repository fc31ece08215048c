use crate::areas::repository::Repository;
use crate::artifacts::status::status_info::StatusInfo;
use crate::errors::{IoContext, Result};

impl Repository {
    /// Rescan the working tree, persist the refreshed index and report it
    pub fn status(&self, porcelain: bool) -> Result<StatusInfo> {
        let _lock = self.lock()?;
        let mut index = self.refresh_index()?;
        index.write_updates()?;

        let status = StatusInfo::new(self.refs().head()?, self.refs().read_head()?, &index);
        drop(index);

        let mut writer = self.writer();
        let written = if porcelain {
            status.write_porcelain(&mut **writer)
        } else {
            status.write_long(&mut **writer)
        };
        written.io_context(|| "unable to write status")?;

        Ok(status)
    }
}
