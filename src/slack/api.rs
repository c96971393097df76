use crate::slack::types::{RawChannel, RawMessage, RawUser};
use anyhow::Result;

/// One page of a cursor-paginated listing. An empty `next_cursor` means the
/// listing is exhausted.
#[derive(Debug, Clone, Default)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: String,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.next_cursor.is_empty()
    }
}

pub trait SlackApi {
    fn team_domain(&self) -> Result<String>;

    fn list_users(&self, cursor: &str) -> Result<Page<RawUser>>;

    fn list_channels(&self, cursor: &str) -> Result<Page<RawChannel>>;

    fn history(&self, channel_id: &str, latest: Option<&str>, cursor: &str)
    -> Result<Page<RawMessage>>;

    /// Replies of the thread rooted at `thread_ts`; the root itself comes back
    /// as the first entry of the first page.
    fn replies(&self, channel_id: &str, thread_ts: &str, cursor: &str) -> Result<Page<RawMessage>>;

    fn file_name(&self, file_id: &str) -> Result<String>;
}
