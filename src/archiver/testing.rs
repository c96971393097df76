use crate::archiver::model::Channel;
use crate::archiver::month::YearMonth;
use crate::archiver::store::{ArchiveStore, UnitHandle};
use crate::drive::api::{FOLDER_MIME, TEXT_MIME};
use crate::drive::{DriveApi, DriveFile};
use crate::error::ArchiveError;
use crate::slack::{Page, SlackApi};
use crate::slack::types::{RawChannel, RawMessage, RawUser};
use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};

pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid date")
}

pub fn channel(id: &str, name: &str) -> Channel {
    Channel {
        id: id.to_string(),
        name: name.to_string(),
        is_member: true,
        is_archived: false,
        is_private: false,
        created_epoch_secs: 1_600_000_000,
    }
}

pub fn raw_msg(ts: &str, user: &str, text: &str) -> RawMessage {
    RawMessage {
        ts: ts.to_string(),
        user: Some(user.to_string()),
        text: text.to_string(),
        ..RawMessage::default()
    }
}

pub fn thread_msg(ts: &str, thread_ts: &str, user: &str, text: &str) -> RawMessage {
    RawMessage {
        thread_ts: Some(thread_ts.to_string()),
        ..raw_msg(ts, user, text)
    }
}

fn paged<T: Clone>(pages: &[Vec<T>], cursor: &str) -> Page<T> {
    let index = if cursor.is_empty() {
        0
    } else {
        cursor.parse::<usize>().expect("fake cursor")
    };
    let items = pages.get(index).cloned().unwrap_or_default();
    let next_cursor = if index + 1 < pages.len() {
        (index + 1).to_string()
    } else {
        String::new()
    };
    Page { items, next_cursor }
}

/// Pages are served in order; the cursor of page `n` is `"n"`.
#[derive(Default)]
pub struct FakeSlack {
    pub domain: String,
    pub user_pages: Vec<Vec<RawUser>>,
    pub channel_pages: Vec<Vec<RawChannel>>,
    pub history: HashMap<String, Vec<Vec<RawMessage>>>,
    pub replies: HashMap<(String, String), Vec<Vec<RawMessage>>>,
    pub files: HashMap<String, String>,
    pub fail_methods: HashSet<String>,
    /// Fail the n-th (zero-based) history request.
    pub fail_history_page: Option<usize>,
    calls: RefCell<Vec<String>>,
    latest: RefCell<Vec<Option<String>>>,
}

impl FakeSlack {
    fn record(&self, method: &str) -> Result<()> {
        self.calls.borrow_mut().push(method.to_string());
        if self.fail_methods.contains(method) {
            return Err(ArchiveError::SlackApi {
                method: method.to_string(),
                error: "ratelimited".to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|m| *m == method).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn latest_params(&self) -> Vec<Option<String>> {
        self.latest.borrow().clone()
    }
}

impl SlackApi for FakeSlack {
    fn team_domain(&self) -> Result<String> {
        self.record("team.info")?;
        Ok(self.domain.clone())
    }

    fn list_users(&self, cursor: &str) -> Result<Page<RawUser>> {
        self.record("users.list")?;
        Ok(paged(&self.user_pages, cursor))
    }

    fn list_channels(&self, cursor: &str) -> Result<Page<RawChannel>> {
        self.record("conversations.list")?;
        Ok(paged(&self.channel_pages, cursor))
    }

    fn history(
        &self,
        channel_id: &str,
        latest: Option<&str>,
        cursor: &str,
    ) -> Result<Page<RawMessage>> {
        let nth = self.calls_to("conversations.history");
        self.record("conversations.history")?;
        self.latest.borrow_mut().push(latest.map(str::to_string));
        if self.fail_history_page == Some(nth) {
            return Err(ArchiveError::SlackApi {
                method: "conversations.history".to_string(),
                error: "internal_error".to_string(),
            }
            .into());
        }
        let pages = self.history.get(channel_id).map(Vec::as_slice).unwrap_or(&[]);
        Ok(paged(pages, cursor))
    }

    fn replies(&self, channel_id: &str, thread_ts: &str, cursor: &str) -> Result<Page<RawMessage>> {
        self.record("conversations.replies")?;
        let key = (channel_id.to_string(), thread_ts.to_string());
        let pages = self.replies.get(&key).map(Vec::as_slice).unwrap_or(&[]);
        Ok(paged(pages, cursor))
    }

    fn file_name(&self, file_id: &str) -> Result<String> {
        self.record("files.info")?;
        self.files.get(file_id).cloned().ok_or_else(|| {
            ArchiveError::SlackApi {
                method: "files.info".to_string(),
                error: "file_not_found".to_string(),
            }
            .into()
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    units: BTreeMap<(String, YearMonth), String>,
    persist_calls: usize,
}

impl MemoryStore {
    pub fn insert(&mut self, channel: &str, ym: YearMonth, text: &str) {
        self.units.insert((channel.to_string(), ym), text.to_string());
    }

    pub fn unit(&self, channel: &str, ym: YearMonth) -> Option<String> {
        self.units.get(&(channel.to_string(), ym)).cloned()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn persist_calls(&self) -> usize {
        self.persist_calls
    }
}

impl ArchiveStore for MemoryStore {
    fn prepare_channel(&mut self, _channel: &Channel) -> Result<()> {
        Ok(())
    }

    fn exists(&self, channel: &Channel, ym: YearMonth) -> Result<bool> {
        Ok(self.units.contains_key(&(channel.name.clone(), ym)))
    }

    fn persist(&mut self, channel: &Channel, ym: YearMonth, text: &str) -> Result<UnitHandle> {
        self.persist_calls += 1;
        let key = (channel.name.clone(), ym);
        if self.units.contains_key(&key) {
            anyhow::bail!("unit {ym} for #{} already exists", channel.name);
        }
        self.units.insert(key, text.to_string());
        Ok(UnitHandle::File(
            format!("{}/{}", channel.name, ym.file_name()).into(),
        ))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[derive(Debug, Clone)]
struct FakeEntry {
    file: DriveFile,
    parent: String,
    content: Option<String>,
}

#[derive(Default)]
pub struct FakeDrive {
    entries: RefCell<Vec<FakeEntry>>,
    next_id: Cell<usize>,
}

impl FakeDrive {
    pub fn insert(&self, id: &str, parent: &str, name: &str, mime_type: &str) {
        self.entries.borrow_mut().push(FakeEntry {
            file: DriveFile {
                id: id.to_string(),
                name: name.to_string(),
                mime_type: mime_type.to_string(),
            },
            parent: parent.to_string(),
            content: None,
        });
    }

    pub fn children_named(&self, parent: &str, name: &str) -> Vec<DriveFile> {
        self.find_children(parent, name, None).expect("find")
    }

    pub fn content(&self, parent: &str, name: &str) -> Option<String> {
        self.entries
            .borrow()
            .iter()
            .find(|e| e.parent == parent && e.file.name == name)
            .and_then(|e| e.content.clone())
    }

    fn create(&self, parent: &str, name: &str, mime_type: &str, content: Option<&str>) -> DriveFile {
        let id = format!("gen-{}", self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        let file = DriveFile {
            id,
            name: name.to_string(),
            mime_type: mime_type.to_string(),
        };
        self.entries.borrow_mut().push(FakeEntry {
            file: file.clone(),
            parent: parent.to_string(),
            content: content.map(str::to_string),
        });
        file
    }
}

impl DriveApi for FakeDrive {
    fn get(&self, file_id: &str) -> Result<DriveFile> {
        self.entries
            .borrow()
            .iter()
            .find(|e| e.file.id == file_id)
            .map(|e| e.file.clone())
            .ok_or_else(|| anyhow::anyhow!("file {file_id} not found"))
    }

    fn find_children(
        &self,
        parent_id: &str,
        name: &str,
        mime_type: Option<&str>,
    ) -> Result<Vec<DriveFile>> {
        Ok(self
            .entries
            .borrow()
            .iter()
            .filter(|e| e.parent == parent_id && e.file.name == name)
            .filter(|e| mime_type.is_none_or(|mime| e.file.mime_type == mime))
            .map(|e| e.file.clone())
            .collect())
    }

    fn create_folder(&self, parent_id: &str, name: &str) -> Result<DriveFile> {
        Ok(self.create(parent_id, name, FOLDER_MIME, None))
    }

    fn create_text_file(&self, parent_id: &str, name: &str, content: &str) -> Result<DriveFile> {
        Ok(self.create(parent_id, name, TEXT_MIME, Some(content)))
    }
}
