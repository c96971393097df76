use anyhow::Result;

use crate::archiver::config::{StorageKind, load_config};
use crate::archiver::paths::resolve_paths;
use crate::archiver::run::{self, RunOutcome};
use crate::archiver::walker::StopReason;
use crate::commands::CommandReport;

#[derive(Debug, Clone, Default)]
pub struct ArchiveOptions {
    pub storage: Option<StorageKind>,
}

fn stop_label(stop: &StopReason) -> String {
    match stop {
        StopReason::AlreadyCollected => "already-collected".to_string(),
        StopReason::ReachedArchived(ym) => format!("reached-archived:{ym}"),
        StopReason::Exhausted => "history-exhausted".to_string(),
    }
}

fn summarize(outcome: &RunOutcome, report: &mut CommandReport) {
    report.detail(format!("domain={}", outcome.domain));
    report.detail(format!("store={}", outcome.store));
    report.detail(format!("users={}", outcome.users));
    report.detail(format!("channels.archived={}", outcome.channels.len()));
    report.detail(format!("channels.skipped={}", outcome.skipped.len()));
    report.detail(format!("units.persisted={}", outcome.persisted_units()));
    for channel in &outcome.channels {
        report.detail(format!(
            "channel=#{} units={} stop={}",
            channel.channel.name,
            channel.persisted.len(),
            stop_label(&channel.stop)
        ));
        for unit in &channel.persisted {
            report.detail(format!(
                "unit={} month={} messages={}",
                unit.handle, unit.month, unit.messages
            ));
        }
    }
    for channel in &outcome.skipped {
        report.detail(format!("skipped=#{} reason=not-a-member", channel.name));
    }
}

pub fn run(opts: &ArchiveOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let cfg = load_config(opts.storage)?;
    let mut report = CommandReport::new("archive");
    report.detail(format!("storage={}", cfg.storage));
    report.detail(format!("timezone={}", cfg.timezone));

    let outcome = run::run(&cfg, &paths)?;
    summarize(&outcome, &mut report);
    Ok(report)
}
