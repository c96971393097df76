use crate::error::ArchiveError;
use crate::slack::{Page, SlackApi};
use crate::slack::types::{
    ConversationsListResponse, Envelope, FileInfoResponse, MessagesResponse, RawChannel,
    RawMessage, RawUser, TeamInfoResponse, UsersListResponse,
};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const SLACK_API_BASE: &str = "https://slack.com/api";
const PAGE_LIMIT: &str = "200";

pub struct SlackClient {
    http: Client,
    token: String,
    base_url: String,
}

impl SlackClient {
    pub fn new(token: &str, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build slack http client")?;
        Ok(Self {
            http,
            token: token.to_string(),
            base_url: SLACK_API_BASE.to_string(),
        })
    }

    fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{method}", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(params)
            .send()
            .with_context(|| format!("slack api {method} request failed"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::SlackApi {
                method: method.to_string(),
                error: format!("http status {status}"),
            }
            .into());
        }

        let json: Value = response
            .json()
            .with_context(|| format!("slack api {method} returned invalid json"))?;
        let envelope: Envelope = serde_json::from_value(json.clone())?;
        if !envelope.ok {
            return Err(ArchiveError::SlackApi {
                method: method.to_string(),
                error: envelope.error.unwrap_or_else(|| "unknown_error".to_string()),
            }
            .into());
        }

        serde_json::from_value(json)
            .with_context(|| format!("slack api {method} returned an unexpected payload"))
    }
}

fn with_cursor<'a>(mut params: Vec<(&'a str, &'a str)>, cursor: &'a str) -> Vec<(&'a str, &'a str)> {
    if !cursor.is_empty() {
        params.push(("cursor", cursor));
    }
    params
}

impl SlackApi for SlackClient {
    fn team_domain(&self) -> Result<String> {
        let resp: TeamInfoResponse = self.call("team.info", &[])?;
        if resp.team.domain.trim().is_empty() {
            anyhow::bail!("team.info returned an empty domain");
        }
        Ok(resp.team.domain)
    }

    fn list_users(&self, cursor: &str) -> Result<Page<RawUser>> {
        let params = with_cursor(vec![("limit", PAGE_LIMIT)], cursor);
        let resp: UsersListResponse = self.call("users.list", &params)?;
        Ok(Page {
            items: resp.members,
            next_cursor: resp.response_metadata.next_cursor,
        })
    }

    fn list_channels(&self, cursor: &str) -> Result<Page<RawChannel>> {
        let params = with_cursor(
            vec![
                ("types", "public_channel,private_channel"),
                ("limit", PAGE_LIMIT),
            ],
            cursor,
        );
        let resp: ConversationsListResponse = self.call("conversations.list", &params)?;
        Ok(Page {
            items: resp.channels,
            next_cursor: resp.response_metadata.next_cursor,
        })
    }

    fn history(
        &self,
        channel_id: &str,
        latest: Option<&str>,
        cursor: &str,
    ) -> Result<Page<RawMessage>> {
        let mut params = vec![
            ("channel", channel_id),
            ("inclusive", "false"),
            ("limit", PAGE_LIMIT),
        ];
        if let Some(latest) = latest {
            params.push(("latest", latest));
        }
        let params = with_cursor(params, cursor);
        let resp: MessagesResponse = self.call("conversations.history", &params)?;
        Ok(Page {
            items: resp.messages,
            next_cursor: resp.response_metadata.next_cursor,
        })
    }

    fn replies(&self, channel_id: &str, thread_ts: &str, cursor: &str) -> Result<Page<RawMessage>> {
        let params = with_cursor(
            vec![
                ("channel", channel_id),
                ("ts", thread_ts),
                ("limit", PAGE_LIMIT),
            ],
            cursor,
        );
        let resp: MessagesResponse = self.call("conversations.replies", &params)?;
        Ok(Page {
            items: resp.messages,
            next_cursor: resp.response_metadata.next_cursor,
        })
    }

    fn file_name(&self, file_id: &str) -> Result<String> {
        let resp: FileInfoResponse = self.call("files.info", &[("file", file_id)])?;
        Ok(resp.file.name)
    }
}
