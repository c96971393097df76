use crate::archiver::warn::{self, WarnEvent};
use crate::slack::SlackApi;
use crate::slack::types::RawMessage;

pub const INDENT: &str = "    ";

/// Renders the body of a raw message: its text, then every line of each
/// attachment fallback, then one line per attached file.
///
/// A failed file lookup is recorded inline and does not fail the message.
pub fn extract_text(api: &impl SlackApi, channel_id: &str, msg: &RawMessage) -> String {
    let mut out = String::with_capacity(msg.text.len());
    out.push_str(&msg.text);

    for attachment in &msg.attachments {
        let Some(fallback) = attachment.fallback.as_deref() else {
            continue;
        };
        if fallback.is_empty() {
            continue;
        }
        for line in fallback.split('\n') {
            out.push('\n');
            out.push_str(INDENT);
            out.push_str(line);
        }
    }

    for file in &msg.files {
        out.push('\n');
        out.push_str(INDENT);
        out.push_str("attachment: ");
        match api.file_name(&file.id) {
            Ok(name) => out.push_str(&name),
            Err(err) => {
                out.push_str("(error) ");
                out.push_str(&format!("{err:#}"));
                warn::emit(WarnEvent {
                    code: "FILE_LOOKUP_FAILED",
                    stage: "extract-text",
                    channel: channel_id,
                    unit: &msg.ts,
                    target: &file.id,
                    reason: "files-info-failed",
                    err: &format!("{err:#}"),
                });
            }
        }
    }

    out
}
