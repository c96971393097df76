use crate::archiver::model::Message;
use crate::archiver::month::parse_ts;
use crate::archiver::text::extract_text;
use crate::archiver::users::UserDirectory;
use crate::slack::SlackApi;
use crate::slack::types::RawMessage;
use anyhow::{Context, Result};
use std::collections::VecDeque;

pub fn resolve_message(
    api: &impl SlackApi,
    users: &UserDirectory,
    channel_id: &str,
    raw: &RawMessage,
) -> Result<Message> {
    let at = parse_ts(&raw.ts)?;
    let speaker = users.display_name(raw.user.as_deref().unwrap_or_default());
    Ok(Message {
        channel_id: channel_id.to_string(),
        thread_id: raw.thread_ts.clone().unwrap_or_default(),
        speaker,
        ts: raw.ts.clone(),
        at,
        text: extract_text(api, channel_id, raw),
    })
}

/// Lazily pages through `conversations.replies` for one thread root.
///
/// Yields replies oldest-first, never the root itself. The first error ends
/// the sequence; the iterator cannot be restarted.
pub struct ThreadReplies<'a, A: SlackApi> {
    api: &'a A,
    users: &'a UserDirectory,
    channel_id: String,
    root_ts: String,
    cursor: String,
    buffered: VecDeque<RawMessage>,
    exhausted: bool,
}

pub fn expand<'a, A: SlackApi>(
    api: &'a A,
    users: &'a UserDirectory,
    root: &Message,
) -> ThreadReplies<'a, A> {
    ThreadReplies {
        api,
        users,
        channel_id: root.channel_id.clone(),
        root_ts: root.ts.clone(),
        cursor: String::new(),
        buffered: VecDeque::new(),
        exhausted: false,
    }
}

impl<A: SlackApi> ThreadReplies<'_, A> {
    fn fetch_page(&mut self) -> Result<()> {
        let page = self
            .api
            .replies(&self.channel_id, &self.root_ts, &self.cursor)
            .with_context(|| {
                format!(
                    "failed to fetch replies of {} in {}",
                    self.root_ts, self.channel_id
                )
            })?;
        self.exhausted = page.is_last();
        self.cursor = page.next_cursor;
        self.buffered.extend(
            page.items
                .into_iter()
                .filter(|reply| reply.ts != self.root_ts),
        );
        Ok(())
    }
}

impl<A: SlackApi> Iterator for ThreadReplies<'_, A> {
    type Item = Result<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(raw) = self.buffered.pop_front() {
                let resolved = resolve_message(self.api, self.users, &self.channel_id, &raw);
                if resolved.is_err() {
                    self.exhausted = true;
                    self.buffered.clear();
                }
                return Some(resolved);
            }
            if self.exhausted {
                return None;
            }
            if let Err(err) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(err));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archiver::testing::{FakeSlack, raw_msg, thread_msg};

    fn root(slack: &FakeSlack, users: &UserDirectory) -> Message {
        resolve_message(slack, users, "C1", &thread_msg("100.000000", "100.000000", "U1", "root"))
            .expect("root")
    }

    #[test]
    fn replies_skip_root_and_span_pages() {
        let mut slack = FakeSlack::default();
        slack.replies.insert(
            ("C1".into(), "100.000000".into()),
            vec![
                vec![
                    thread_msg("100.000000", "100.000000", "U1", "root"),
                    thread_msg("101.000000", "100.000000", "U2", "first"),
                ],
                vec![thread_msg("102.000000", "100.000000", "U1", "second")],
            ],
        );
        let users = UserDirectory::from_pairs([("U1", "Alice"), ("U2", "Bob")]);

        let replies = expand(&slack, &users, &root(&slack, &users))
            .collect::<Result<Vec<_>>>()
            .expect("replies");

        let summary = replies
            .iter()
            .map(|m| (m.speaker.as_str(), m.text.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(summary, vec![("Bob", "first"), ("Alice", "second")]);
        assert_eq!(slack.calls_to("conversations.replies"), 2);
    }

    #[test]
    fn nothing_is_fetched_until_polled() {
        let slack = FakeSlack::default();
        let users = UserDirectory::default();
        let replies = expand(&slack, &users, &root(&slack, &users));
        assert_eq!(slack.calls_to("conversations.replies"), 0);
        drop(replies);
    }

    #[test]
    fn fetch_error_ends_the_sequence() {
        let mut slack = FakeSlack::default();
        slack.fail_methods.insert("conversations.replies".into());
        let users = UserDirectory::default();

        let mut replies = expand(&slack, &users, &root(&slack, &users));
        assert!(replies.next().expect("item").is_err());
        assert!(replies.next().is_none());
        assert_eq!(slack.calls_to("conversations.replies"), 1);
    }

    #[test]
    fn bad_reply_timestamp_is_an_error() {
        let mut slack = FakeSlack::default();
        slack.replies.insert(
            ("C1".into(), "100.000000".into()),
            vec![vec![raw_msg("not-a-ts", "U2", "oops")]],
        );
        let users = UserDirectory::default();

        let got = expand(&slack, &users, &root(&slack, &users)).collect::<Result<Vec<_>>>();
        assert!(got.is_err());
    }
}
