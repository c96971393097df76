use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::Path;

use crate::archiver::config::{StorageKind, load_config, resolve_config_path};
use crate::archiver::local_store::archived_months;
use crate::archiver::paths::resolve_paths;
use crate::commands::CommandReport;

fn is_set(var: &str) -> bool {
    matches!(env::var(var), Ok(v) if !v.trim().is_empty())
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    if !dir.is_dir() {
        return Ok(names);
    }
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_dir()
            && let Some(name) = entry.file_name().to_str()
        {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// One line per archived channel: `<domain>/<channel> months=N last=YYYY-MM`.
fn describe_local_archive(archive_dir: &Path, report: &mut CommandReport) -> Result<()> {
    for domain in sorted_subdirs(archive_dir)? {
        let domain_dir = archive_dir.join(&domain);
        for channel in sorted_subdirs(&domain_dir)? {
            let months = archived_months(&domain_dir.join(&channel))?;
            let last = months
                .last()
                .map(|ym| ym.to_string())
                .unwrap_or_else(|| "none".to_string());
            report.detail(format!(
                "archive={domain}/{channel} months={} last={last}",
                months.len()
            ));
        }
    }
    Ok(())
}

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let cfg = load_config(None)?;
    let mut report = CommandReport::new("status");

    match resolve_config_path() {
        Some(path) => report.detail(format!("config={}", path.display())),
        None => report.detail("config=none"),
    }
    report.detail(format!("home={}", paths.home.display()));
    report.detail(format!("archive_dir={}", paths.archive_dir.display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));
    report.detail(format!("audit_log={}", paths.audit_log().display()));
    report.detail(format!("storage={}", cfg.storage));
    report.detail(format!("timezone={}", cfg.timezone));
    report.detail(format!("include_non_member={}", cfg.include_non_member));
    report.detail(format!(
        "request_timeout_secs={}",
        cfg.request_timeout_secs
    ));

    if !is_set("SLACK_TOKEN") {
        report.issue("SLACK_TOKEN is not set");
    }
    if cfg.storage == StorageKind::Drive {
        report.detail(format!("drive.root_folder_id={}", cfg.drive.root_folder_id));
        if !is_set("SLACK_ARCHIVE_DRIVE_TOKEN") {
            report.issue("SLACK_ARCHIVE_DRIVE_TOKEN is not set");
        }
    } else {
        describe_local_archive(&paths.archive_dir, &mut report)?;
    }

    Ok(report)
}
