use anyhow::Result;

use crate::archiver::channels::list_channels;
use crate::archiver::config::load_config;
use crate::archiver::run::{slack_token, workspace_domain};
use crate::commands::CommandReport;
use crate::slack::SlackClient;

pub fn run() -> Result<CommandReport> {
    let cfg = load_config(None)?;
    let api = SlackClient::new(&slack_token()?, cfg.request_timeout_secs)?;
    let mut report = CommandReport::new("channels");

    report.detail(format!("domain={}", workspace_domain(&api)?));
    let channels = list_channels(&api)?;
    report.detail(format!("count={}", channels.len()));
    for channel in channels {
        let skipped = !cfg.include_non_member && !channel.is_readable();
        report.detail(format!(
            "#{} id={} member={} archived={} private={}{}",
            channel.name,
            channel.id,
            channel.is_member,
            channel.is_archived,
            channel.is_private,
            if skipped { " (skipped)" } else { "" }
        ));
    }
    Ok(report)
}
