use crate::archiver::model::Channel;
use crate::archiver::month::YearMonth;
use crate::archiver::store::{ArchiveStore, UnitHandle};
use crate::drive::DriveApi;
use crate::drive::api::FOLDER_MIME;
use crate::error::ArchiveError;
use anyhow::{Context, Result};
use std::collections::HashMap;

pub struct DriveStore<D: DriveApi> {
    api: D,
    root_id: String,
    channel_folders: HashMap<String, String>,
}

impl<D: DriveApi> DriveStore<D> {
    pub fn open(api: D, root_id: &str, domain: &str) -> Result<Self> {
        let root = api
            .get(root_id)
            .with_context(|| format!("failed to look up drive root folder {root_id}"))?;
        if root.name != domain {
            return Err(ArchiveError::RootFolderMismatch {
                expected: domain.to_string(),
                actual: root.name,
            }
            .into());
        }
        Ok(Self {
            api,
            root_id: root_id.to_string(),
            channel_folders: HashMap::new(),
        })
    }

    #[cfg(test)]
    pub fn api(&self) -> &D {
        &self.api
    }

    fn folder_id(&self, channel: &Channel) -> Result<&str> {
        self.channel_folders
            .get(&channel.id)
            .map(String::as_str)
            .with_context(|| format!("channel folder for #{} was not prepared", channel.name))
    }
}

impl<D: DriveApi> ArchiveStore for DriveStore<D> {
    fn prepare_channel(&mut self, channel: &Channel) -> Result<()> {
        if self.channel_folders.contains_key(&channel.id) {
            return Ok(());
        }
        let mut found = self
            .api
            .find_children(&self.root_id, &channel.name, Some(FOLDER_MIME))
            .with_context(|| format!("failed to look up folder for #{}", channel.name))?;
        let folder = match found.len() {
            0 => self
                .api
                .create_folder(&self.root_id, &channel.name)
                .with_context(|| format!("failed to create folder for #{}", channel.name))?,
            1 => found.remove(0),
            count => {
                return Err(ArchiveError::AmbiguousFolder {
                    parent: self.root_id.clone(),
                    name: channel.name.clone(),
                    count,
                }
                .into());
            }
        };
        self.channel_folders.insert(channel.id.clone(), folder.id);
        Ok(())
    }

    fn exists(&self, channel: &Channel, ym: YearMonth) -> Result<bool> {
        let folder_id = self.folder_id(channel)?;
        let name = ym.file_name();
        let found = self
            .api
            .find_children(folder_id, &name, None)
            .with_context(|| format!("failed to look up {name} for #{}", channel.name))?;
        match found.len() {
            0 => Ok(false),
            1 => Ok(true),
            count => Err(ArchiveError::AmbiguousUnit {
                channel: channel.name.clone(),
                name,
                count,
            }
            .into()),
        }
    }

    fn persist(&mut self, channel: &Channel, ym: YearMonth, text: &str) -> Result<UnitHandle> {
        let folder_id = self.folder_id(channel)?.to_string();
        let name = ym.file_name();
        let file = self
            .api
            .create_text_file(&folder_id, &name, text)
            .with_context(|| format!("failed to upload {name} for #{}", channel.name))?;
        Ok(UnitHandle::Drive {
            file_id: file.id,
            name,
        })
    }

    fn describe(&self) -> String {
        format!("drive:{}", self.root_id)
    }
}
