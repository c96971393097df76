use crate::slack::types::RawChannel;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub is_member: bool,
    pub is_archived: bool,
    pub is_private: bool,
    pub created_epoch_secs: i64,
}

impl Channel {
    /// Channels the token's user never joined (and that are still open)
    /// cannot have their history read.
    pub fn is_readable(&self) -> bool {
        self.is_archived || self.is_member
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_epoch_secs, 0)
    }
}

impl From<RawChannel> for Channel {
    fn from(raw: RawChannel) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            is_member: raw.is_member,
            is_archived: raw.is_archived,
            is_private: raw.is_private,
            created_epoch_secs: raw.created,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub channel_id: String,
    /// `thread_ts` of the message; empty when it neither started nor joined a thread.
    pub thread_id: String,
    pub speaker: String,
    pub ts: String,
    pub at: DateTime<Utc>,
    pub text: String,
}

impl Message {
    pub fn is_thread_root(&self) -> bool {
        !self.thread_id.is_empty() && self.thread_id == self.ts
    }
}
