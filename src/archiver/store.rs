use crate::archiver::model::Channel;
use crate::archiver::month::YearMonth;
use anyhow::Result;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitHandle {
    File(PathBuf),
    Drive { file_id: String, name: String },
}

impl fmt::Display for UnitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Drive { file_id, name } => write!(f, "drive:{file_id} ({name})"),
        }
    }
}

/// Persistence of write-once monthly archive units.
///
/// "Not found" is `Ok(false)`, never an error. More than one unit under the
/// same name means the archive tree was tampered with and is fatal.
pub trait ArchiveStore {
    fn prepare_channel(&mut self, channel: &Channel) -> Result<()>;

    fn exists(&self, channel: &Channel, ym: YearMonth) -> Result<bool>;

    fn persist(&mut self, channel: &Channel, ym: YearMonth, text: &str) -> Result<UnitHandle>;

    fn describe(&self) -> String;
}
