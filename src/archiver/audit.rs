use crate::archiver::paths::ArchivePaths;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;

#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub at_epoch_secs: i64,
    pub phase: String,
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_sha256: Option<String>,
}

pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn append(paths: &ArchivePaths, event: &AuditEvent) -> Result<()> {
    fs::create_dir_all(&paths.logs_dir)
        .with_context(|| format!("failed to create {}", paths.logs_dir.display()))?;
    let line = format!("{}\n", serde_json::to_string(event)?);
    let path = paths.audit_log();
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

pub fn append_event(paths: &ArchivePaths, phase: &str, status: &str, message: &str) -> Result<()> {
    append(
        paths,
        &AuditEvent {
            at_epoch_secs: Utc::now().timestamp(),
            phase: phase.to_string(),
            status: status.to_string(),
            message: message.to_string(),
            content_sha256: None,
        },
    )
}

pub fn append_unit(paths: &ArchivePaths, location: &str, text: &str) -> Result<()> {
    append(
        paths,
        &AuditEvent {
            at_epoch_secs: Utc::now().timestamp(),
            phase: "persist".to_string(),
            status: "ok".to_string(),
            message: location.to_string(),
            content_sha256: Some(content_hash(text)),
        },
    )
}
