use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
pub const TEXT_MIME: &str = "text/plain";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

pub trait DriveApi {
    fn get(&self, file_id: &str) -> Result<DriveFile>;

    /// Non-trashed children of `parent_id` named exactly `name`, optionally
    /// restricted to one mime type. All result pages are drained.
    fn find_children(
        &self,
        parent_id: &str,
        name: &str,
        mime_type: Option<&str>,
    ) -> Result<Vec<DriveFile>>;

    fn create_folder(&self, parent_id: &str, name: &str) -> Result<DriveFile>;

    fn create_text_file(&self, parent_id: &str, name: &str, content: &str) -> Result<DriveFile>;
}

pub fn quote_query_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('\'');
    for ch in raw.chars() {
        if ch == '\\' || ch == '\'' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

pub fn children_query(parent_id: &str, name: &str, mime_type: Option<&str>) -> String {
    let mut q = format!(
        "{} in parents and name = {} and trashed = false",
        quote_query_value(parent_id),
        quote_query_value(name)
    );
    if let Some(mime) = mime_type {
        q.push_str(&format!(" and mimeType = {}", quote_query_value(mime)));
    }
    q
}
