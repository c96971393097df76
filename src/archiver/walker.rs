use crate::archiver::model::{Channel, Message};
use crate::archiver::month::{YearMonth, parse_ts};
use crate::archiver::render::{RenderedEntry, render_unit};
use crate::archiver::store::{ArchiveStore, UnitHandle};
use crate::archiver::thread::{expand, resolve_message};
use crate::archiver::users::UserDirectory;
use crate::slack::SlackApi;
use crate::slack::types::RawMessage;
use anyhow::{Context, Result};
use chrono::DateTime;
use chrono_tz::Tz;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    AlreadyCollected,
    ReachedArchived(YearMonth),
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct PersistedUnit {
    pub month: YearMonth,
    pub handle: UnitHandle,
    pub messages: usize,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ChannelOutcome {
    pub channel: Channel,
    pub persisted: Vec<PersistedUnit>,
    pub stop: StopReason,
}

pub struct WalkContext<'a, A: SlackApi> {
    pub api: &'a A,
    pub users: &'a UserDirectory,
    pub tz: Tz,
}

enum Bucket {
    Empty,
    Accumulating {
        key: YearMonth,
        messages: Vec<Message>,
    },
    Done(StopReason),
}

struct Walk<'w, 'a, A: SlackApi, S: ArchiveStore + ?Sized> {
    ctx: &'w WalkContext<'a, A>,
    store: &'w mut S,
    channel: &'w Channel,
    bucket: Bucket,
    persisted: Vec<PersistedUnit>,
    on_persist: &'w mut dyn FnMut(&PersistedUnit) -> Result<()>,
}

impl<A: SlackApi, S: ArchiveStore + ?Sized> Walk<'_, '_, A, S> {
    fn resolve(&self, raw: &RawMessage) -> Result<Message> {
        resolve_message(self.ctx.api, self.ctx.users, &self.channel.id, raw)
    }

    fn open_bucket(&mut self, key: YearMonth, first: &RawMessage) -> Result<()> {
        if self.store.exists(self.channel, key)? {
            self.bucket = Bucket::Done(StopReason::ReachedArchived(key));
            return Ok(());
        }
        self.bucket = Bucket::Accumulating {
            key,
            messages: vec![self.resolve(first)?],
        };
        Ok(())
    }

    fn push(&mut self, raw: &RawMessage) -> Result<()> {
        let key = YearMonth::of(&parse_ts(&raw.ts)?.with_timezone(&self.ctx.tz));
        match std::mem::replace(&mut self.bucket, Bucket::Empty) {
            Bucket::Done(reason) => {
                self.bucket = Bucket::Done(reason);
                Ok(())
            }
            Bucket::Empty => self.open_bucket(key, raw),
            Bucket::Accumulating {
                key: current,
                mut messages,
            } if current == key => {
                messages.push(self.resolve(raw)?);
                self.bucket = Bucket::Accumulating {
                    key: current,
                    messages,
                };
                Ok(())
            }
            Bucket::Accumulating {
                key: done,
                messages,
            } => {
                self.flush(done, messages)?;
                self.open_bucket(key, raw)
            }
        }
    }

    fn flush(&mut self, key: YearMonth, messages: Vec<Message>) -> Result<()> {
        let count = messages.len();
        let mut entries = Vec::with_capacity(count);
        for message in messages {
            let replies = if message.is_thread_root() {
                expand(self.ctx.api, self.ctx.users, &message).collect::<Result<Vec<_>>>()?
            } else {
                Vec::new()
            };
            entries.push(RenderedEntry { message, replies });
        }
        let text = render_unit(&entries, self.ctx.tz);
        let handle = self
            .store
            .persist(self.channel, key, &text)
            .with_context(|| format!("failed to persist {key} for #{}", self.channel.name))?;
        println!("    {handle}");
        let unit = PersistedUnit {
            month: key,
            handle,
            messages: count,
            text,
        };
        (self.on_persist)(&unit)?;
        self.persisted.push(unit);
        Ok(())
    }

    fn finish(mut self) -> Result<ChannelOutcome> {
        let stop = match std::mem::replace(&mut self.bucket, Bucket::Empty) {
            Bucket::Done(reason) => reason,
            Bucket::Accumulating { key, messages } => {
                self.flush(key, messages)?;
                StopReason::Exhausted
            }
            Bucket::Empty => StopReason::Exhausted,
        };
        Ok(ChannelOutcome {
            channel: self.channel.clone(),
            persisted: self.persisted,
            stop,
        })
    }
}

/// Archives every month of `channel` older than `start_of_month` that has not
/// been archived yet. The channel must already be prepared in `store`.
/// `on_persist` sees each unit as soon as it is stored.
pub fn archive_channel<A: SlackApi, S: ArchiveStore + ?Sized>(
    ctx: &WalkContext<'_, A>,
    store: &mut S,
    channel: &Channel,
    start_of_month: DateTime<Tz>,
    on_persist: &mut dyn FnMut(&PersistedUnit) -> Result<()>,
) -> Result<ChannelOutcome> {
    let created = channel
        .created_at()
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| channel.created_epoch_secs.to_string());
    println!(
        "ID: {}, Name: {}, IsArchived: {}, Created: {}",
        channel.id, channel.name, channel.is_archived, created
    );

    let resume_point = YearMonth::of(&start_of_month).previous();
    if store.exists(channel, resume_point)? {
        println!("    Already collected");
        return Ok(ChannelOutcome {
            channel: channel.clone(),
            persisted: Vec::new(),
            stop: StopReason::AlreadyCollected,
        });
    }

    let latest = start_of_month.timestamp().to_string();
    let mut walk = Walk {
        ctx,
        store,
        channel,
        bucket: Bucket::Empty,
        persisted: Vec::new(),
        on_persist,
    };
    let mut cursor = String::new();
    'pages: loop {
        let page = ctx
            .api
            .history(
                &channel.id,
                cursor.is_empty().then_some(latest.as_str()),
                &cursor,
            )
            .with_context(|| format!("failed to fetch history of #{}", channel.name))?;
        for raw in &page.items {
            walk.push(raw)?;
            if matches!(walk.bucket, Bucket::Done(_)) {
                break 'pages;
            }
        }
        if page.is_last() {
            break;
        }
        cursor = page.next_cursor;
    }

    walk.finish()
}
