use crate::archiver::audit;
use crate::archiver::channels::list_channels;
use crate::archiver::config::{ArchiveConfig, StorageKind};
use crate::archiver::drive_store::DriveStore;
use crate::archiver::local_store::LocalStore;
use crate::archiver::lock::RunLock;
use crate::archiver::model::Channel;
use crate::archiver::month::start_of_month;
use crate::archiver::paths::ArchivePaths;
use crate::archiver::store::ArchiveStore;
use crate::archiver::users::UserDirectory;
use crate::archiver::walker::{
    ChannelOutcome, PersistedUnit, StopReason, WalkContext, archive_channel,
};
use crate::drive::DriveClient;
use crate::error::ArchiveError;
use crate::slack::{SlackApi, SlackClient};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::env;

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub domain: String,
    pub store: String,
    pub channels: Vec<ChannelOutcome>,
    pub skipped: Vec<Channel>,
    pub users: usize,
}

impl RunOutcome {
    pub fn persisted_units(&self) -> usize {
        self.channels.iter().map(|c| c.persisted.len()).sum()
    }
}

fn required_env(var: &str, missing: ArchiveError) -> Result<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(missing.into()),
    }
}

pub fn slack_token() -> Result<String> {
    required_env("SLACK_TOKEN", ArchiveError::MissingToken)
}

pub fn drive_token() -> Result<String> {
    required_env("SLACK_ARCHIVE_DRIVE_TOKEN", ArchiveError::MissingDriveToken)
}

pub fn workspace_domain(api: &impl SlackApi) -> Result<String> {
    let domain = api.team_domain().context("failed to look up workspace")?;
    Ok(format!("{domain}.slack.com"))
}

pub fn open_store(
    cfg: &ArchiveConfig,
    paths: &ArchivePaths,
    domain: &str,
    drive_token: Option<&str>,
) -> Result<Box<dyn ArchiveStore>> {
    match cfg.storage {
        StorageKind::Local => Ok(Box::new(LocalStore::open(&paths.archive_dir, domain)?)),
        StorageKind::Drive => {
            let token = drive_token.ok_or(ArchiveError::MissingDriveToken)?;
            let client = DriveClient::new(token, cfg.request_timeout_secs)?;
            Ok(Box::new(DriveStore::open(
                client,
                &cfg.drive.root_folder_id,
                domain,
            )?))
        }
    }
}

/// Archives `channels` one after another. The first error aborts the run.
pub fn archive_channels<A: SlackApi, S: ArchiveStore + ?Sized>(
    ctx: &WalkContext<'_, A>,
    store: &mut S,
    paths: &ArchivePaths,
    channels: &[Channel],
    include_non_member: bool,
    now: DateTime<Utc>,
) -> Result<(Vec<ChannelOutcome>, Vec<Channel>)> {
    let start = start_of_month(now, ctx.tz)?;
    let mut outcomes = Vec::new();
    let mut skipped = Vec::new();

    for channel in channels {
        if !include_non_member && !channel.is_readable() {
            println!(
                "Not a member: ID: {}, Name: {}, IsArchived: {}, Created: {}",
                channel.id, channel.name, channel.is_archived, channel.created_epoch_secs
            );
            audit::append_event(paths, "channel", "skipped", &format!("#{} not a member", channel.name))?;
            skipped.push(channel.clone());
            continue;
        }

        store
            .prepare_channel(channel)
            .with_context(|| format!("failed to prepare storage for #{}", channel.name))?;
        let mut audit_unit =
            |unit: &PersistedUnit| audit::append_unit(paths, &unit.handle.to_string(), &unit.text);
        let outcome = archive_channel(ctx, store, channel, start, &mut audit_unit)
            .with_context(|| format!("failed to archive #{} ({})", channel.name, channel.id))?;
        if outcome.stop == StopReason::AlreadyCollected {
            audit::append_event(paths, "channel", "up-to-date", &format!("#{}", channel.name))?;
        }
        outcomes.push(outcome);
    }

    Ok((outcomes, skipped))
}

/// One full archive run against the live Slack workspace.
pub fn run(cfg: &ArchiveConfig, paths: &ArchivePaths) -> Result<RunOutcome> {
    let token = slack_token()?;
    let drive_auth = match cfg.storage {
        StorageKind::Drive => Some(drive_token()?),
        StorageKind::Local => None,
    };
    let tz = cfg.tz()?;
    let lock = RunLock::acquire(&paths.lock_file())?;

    let api = SlackClient::new(&token, cfg.request_timeout_secs)?;
    let domain = workspace_domain(&api)?;
    println!("{domain}");

    let mut store = open_store(cfg, paths, &domain, drive_auth.as_deref())?;
    audit::append_event(
        paths,
        "run",
        "start",
        &format!(
            "domain={domain} store={} lock={}",
            store.describe(),
            lock.path().display()
        ),
    )?;

    let users = UserDirectory::load(&api)?;
    let channels = list_channels(&api)?;
    let ctx = WalkContext {
        api: &api,
        users: &users,
        tz,
    };
    let (outcomes, skipped) = archive_channels(
        &ctx,
        store.as_mut(),
        paths,
        &channels,
        cfg.include_non_member,
        Utc::now(),
    )?;

    let outcome = RunOutcome {
        domain,
        store: store.describe(),
        channels: outcomes,
        skipped,
        users: users.len(),
    };
    audit::append_event(
        paths,
        "run",
        "finish",
        &format!(
            "channels={} persisted={} skipped={}",
            outcome.channels.len(),
            outcome.persisted_units(),
            outcome.skipped.len()
        ),
    )?;
    Ok(outcome)
}
