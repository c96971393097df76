use crate::archiver::model::Message;
use crate::archiver::text::INDENT;
use chrono_tz::Tz;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A top-level message with its resolved thread replies (oldest-first).
#[derive(Debug, Clone)]
pub struct RenderedEntry {
    pub message: Message,
    pub replies: Vec<Message>,
}

fn header(message: &Message, tz: Tz) -> String {
    format!(
        "{} {}",
        message.speaker,
        message.at.with_timezone(&tz).format(TIMESTAMP_FORMAT)
    )
}

/// Renders one archive unit. `entries` arrive newest-first, as the history
/// walk received them; output runs oldest-first. Body text is emitted verbatim.
pub fn render_unit(entries: &[RenderedEntry], tz: Tz) -> String {
    let mut out = String::new();
    for entry in entries.iter().rev() {
        out.push_str(&header(&entry.message, tz));
        out.push('\n');
        out.push_str(&entry.message.text);
        out.push_str("\n\n");

        for reply in &entry.replies {
            out.push_str(INDENT);
            out.push_str(&header(reply, tz));
            out.push('\n');
            for line in reply.text.split('\n') {
                out.push_str(INDENT);
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archiver::month::parse_ts;

    fn msg(ts: &str, speaker: &str, text: &str) -> Message {
        Message {
            channel_id: "C1".into(),
            thread_id: String::new(),
            speaker: speaker.into(),
            ts: ts.into(),
            at: parse_ts(ts).expect("ts"),
            text: text.into(),
        }
    }

    #[test]
    fn renders_oldest_first_with_indented_replies() {
        let mut root = msg("1709251200.000000", "Alice", "release?");
        root.thread_id = root.ts.clone();
        let entries = vec![
            RenderedEntry {
                message: msg("1709254800.000000", "Carol", "later"),
                replies: vec![],
            },
            RenderedEntry {
                message: root,
                replies: vec![
                    msg("1709251260.000000", "Bob", "tomorrow"),
                    msg("1709251320.000000", "Alice", "ok\nthanks"),
                ],
            },
        ];

        let got = render_unit(&entries, chrono_tz::UTC);
        let want = "\
Alice 2024-03-01 00:00:00
release?

    Bob 2024-03-01 00:01:00
    tomorrow

    Alice 2024-03-01 00:02:00
    ok
    thanks

Carol 2024-03-01 01:00:00
later

";
        assert_eq!(got, want);
    }

    #[test]
    fn timestamps_use_the_archive_timezone() {
        let entries = vec![RenderedEntry {
            message: msg("1709251200.000000", "Alice", "hi"),
            replies: vec![],
        }];
        let got = render_unit(&entries, chrono_tz::Asia::Tokyo);
        assert!(got.starts_with("Alice 2024-03-01 09:00:00\nhi\n\n"));
    }

    #[test]
    fn empty_unit_renders_empty() {
        assert_eq!(render_unit(&[], chrono_tz::UTC), "");
    }
}
