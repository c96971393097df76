use crate::drive::api::{FOLDER_MIME, TEXT_MIME, children_query};
use crate::drive::{DriveApi, DriveFile};
use crate::error::ArchiveError;
use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const FILE_FIELDS: &str = "id,name,mimeType";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FileList {
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

pub struct DriveClient {
    http: Client,
    token: String,
}

impl DriveClient {
    pub fn new(token: &str, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build drive http client")?;
        Ok(Self {
            http,
            token: token.to_string(),
        })
    }
}

fn check(action: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(ArchiveError::DriveApi {
        action: action.to_string(),
        error: format!("http status {status}: {}", body.trim()),
    }
    .into())
}

/// Multipart boundary keyed on the payload hash.
fn multipart_boundary(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("slack-archive-{:x}", hasher.finalize())
}

fn multipart_related_body(boundary: &str, metadata: &str, content: &str) -> String {
    format!(
        "--{boundary}\r\n\
         Content-Type: application/json; charset=UTF-8\r\n\r\n\
         {metadata}\r\n\
         --{boundary}\r\n\
         Content-Type: {TEXT_MIME}; charset=UTF-8\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n"
    )
}

impl DriveApi for DriveClient {
    fn get(&self, file_id: &str) -> Result<DriveFile> {
        let url = format!("{DRIVE_FILES_URL}/{file_id}");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("fields", FILE_FIELDS), ("supportsAllDrives", "true")])
            .send()
            .with_context(|| format!("drive get {file_id} request failed"))?;
        let file = check("files.get", response)?
            .json::<DriveFile>()
            .context("drive files.get returned invalid json")?;
        Ok(file)
    }

    fn find_children(
        &self,
        parent_id: &str,
        name: &str,
        mime_type: Option<&str>,
    ) -> Result<Vec<DriveFile>> {
        let q = children_query(parent_id, name, mime_type);
        let fields = format!("nextPageToken,files({FILE_FIELDS})");
        let mut out = Vec::new();
        let mut page_token = String::new();
        loop {
            let mut params = vec![
                ("q", q.as_str()),
                ("fields", fields.as_str()),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ];
            if !page_token.is_empty() {
                params.push(("pageToken", page_token.as_str()));
            }
            let response = self
                .http
                .get(DRIVE_FILES_URL)
                .bearer_auth(&self.token)
                .query(&params)
                .send()
                .context("drive files.list request failed")?;
            let list = check("files.list", response)?
                .json::<FileList>()
                .context("drive files.list returned invalid json")?;
            out.extend(list.files);
            match list.next_page_token {
                Some(token) if !token.is_empty() => page_token = token,
                _ => break,
            }
        }
        Ok(out)
    }

    fn create_folder(&self, parent_id: &str, name: &str) -> Result<DriveFile> {
        let metadata = serde_json::json!({
            "name": name,
            "mimeType": FOLDER_MIME,
            "parents": [parent_id],
        });
        let response = self
            .http
            .post(DRIVE_FILES_URL)
            .bearer_auth(&self.token)
            .query(&[("fields", FILE_FIELDS), ("supportsAllDrives", "true")])
            .json(&metadata)
            .send()
            .with_context(|| format!("drive create folder {name} request failed"))?;
        check("files.create(folder)", response)?
            .json::<DriveFile>()
            .context("drive files.create returned invalid json")
    }

    fn create_text_file(&self, parent_id: &str, name: &str, content: &str) -> Result<DriveFile> {
        let metadata = serde_json::to_string(&serde_json::json!({
            "name": name,
            "mimeType": TEXT_MIME,
            "parents": [parent_id],
        }))?;
        let boundary = multipart_boundary(content);
        let body = multipart_related_body(&boundary, &metadata, content);
        let response = self
            .http
            .post(DRIVE_UPLOAD_URL)
            .bearer_auth(&self.token)
            .query(&[
                ("uploadType", "multipart"),
                ("fields", FILE_FIELDS),
                ("supportsAllDrives", "true"),
            ])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .with_context(|| format!("drive upload {name} request failed"))?;
        check("files.create(upload)", response)?
            .json::<DriveFile>()
            .context("drive upload returned invalid json")
    }
}
