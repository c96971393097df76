use crate::archiver::model::Channel;
use crate::slack::SlackApi;
use anyhow::{Context, Result};

/// All public and private channels visible to the token, sorted by name.
pub fn list_channels(api: &impl SlackApi) -> Result<Vec<Channel>> {
    let mut channels = Vec::new();
    let mut cursor = String::new();
    loop {
        let page = api
            .list_channels(&cursor)
            .context("failed to list channels")?;
        channels.extend(page.items.into_iter().map(Channel::from));
        if page.next_cursor.is_empty() {
            break;
        }
        cursor = page.next_cursor;
    }
    channels.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    Ok(channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archiver::testing::FakeSlack;
    use crate::slack::types::RawChannel;

    fn raw(id: &str, name: &str) -> RawChannel {
        RawChannel {
            id: id.into(),
            name: name.into(),
            ..RawChannel::default()
        }
    }

    #[test]
    fn pages_are_merged_and_sorted_by_name() {
        let mut slack = FakeSlack::default();
        slack.channel_pages = vec![
            vec![raw("C3", "random"), raw("C1", "general")],
            vec![raw("C2", "dev"), raw("C4", "announcements")],
        ];

        let names = list_channels(&slack)
            .expect("channels")
            .into_iter()
            .map(|c| c.name)
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["announcements", "dev", "general", "random"]);
        assert_eq!(slack.calls_to("conversations.list"), 2);
    }

    #[test]
    fn listing_error_propagates() {
        let mut slack = FakeSlack::default();
        slack.fail_methods.insert("conversations.list".into());
        assert!(list_channels(&slack).is_err());
    }
}
