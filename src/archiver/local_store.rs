use crate::archiver::model::Channel;
use crate::archiver::month::YearMonth;
use crate::archiver::store::{ArchiveStore, UnitHandle};
use anyhow::{Context, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// `<archive_dir>/<workspace-domain>/<channel-name>/<YYYY-MM>.txt`
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Creates the workspace directory up front.
    pub fn open(archive_dir: &Path, domain: &str) -> Result<Self> {
        let root = archive_dir.join(domain);
        fs::create_dir_all(&root)
            .with_context(|| format!("failed to create {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn channel_dir(&self, channel: &Channel) -> PathBuf {
        self.root.join(&channel.name)
    }

    pub fn unit_path(&self, channel: &Channel, ym: YearMonth) -> PathBuf {
        self.channel_dir(channel).join(ym.file_name())
    }
}

impl ArchiveStore for LocalStore {
    fn prepare_channel(&mut self, channel: &Channel) -> Result<()> {
        let dir = self.channel_dir(channel);
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))
    }

    fn exists(&self, channel: &Channel, ym: YearMonth) -> Result<bool> {
        let path = self.unit_path(channel, ym);
        match fs::metadata(&path) {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err).with_context(|| format!("failed to stat {}", path.display())),
        }
    }

    fn persist(&mut self, channel: &Channel, ym: YearMonth, text: &str) -> Result<UnitHandle> {
        let dir = self.channel_dir(channel);
        let path = self.unit_path(channel, ym);

        // Stage next to the target so the final rename stays on one filesystem.
        let mut staged = NamedTempFile::new_in(&dir)
            .with_context(|| format!("failed to stage unit in {}", dir.display()))?;
        staged
            .write_all(text.as_bytes())
            .with_context(|| format!("failed to write staged unit for {}", path.display()))?;
        staged
            .as_file()
            .sync_all()
            .with_context(|| format!("failed to sync staged unit for {}", path.display()))?;
        staged
            .persist_noclobber(&path)
            .map_err(|err| err.error)
            .with_context(|| format!("failed to create {}", path.display()))?;

        Ok(UnitHandle::File(path))
    }

    fn describe(&self) -> String {
        format!("local:{}", self.root.display())
    }
}

/// Months already archived in a channel directory, ascending.
pub fn archived_months(channel_dir: &Path) -> Result<Vec<YearMonth>> {
    let mut out = Vec::new();
    let read_dir = match fs::read_dir(channel_dir) {
        Ok(read_dir) => read_dir,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(out),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", channel_dir.display()));
        }
    };
    for entry in read_dir {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if let Some(ym) = name.to_str().and_then(YearMonth::parse) {
            out.push(ym);
        }
    }
    out.sort();
    Ok(out)
}
