//! Delivery of [`SlackMessage`]s through the Slack Web API.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::{NotifyError, NotifyResult};
use crate::summary::SlackMessage;

/// Production `chat.postMessage` endpoint.
pub const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts summaries to one channel as a bot user.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: Client,
    endpoint: Url,
    token: String,
    channel: String,
}

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    attachments: [Attachment<'a>; 1],
}

#[derive(Serialize)]
struct Attachment<'a> {
    color: &'a str,
    text: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackNotifier {
    /// Notifier for `channel` (a leading `#` is added when missing).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: impl Into<String>, channel: &str) -> NotifyResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| NotifyError::Client { source })?;
        let endpoint = parse_url(SLACK_POST_MESSAGE_URL)?;
        Ok(Self {
            client,
            endpoint,
            token: token.into(),
            channel: normalise_channel(channel),
        })
    }

    /// Send to `endpoint` instead of the public Slack API.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not a valid URL.
    pub fn with_endpoint(mut self, endpoint: &str) -> NotifyResult<Self> {
        self.endpoint = parse_url(endpoint)?;
        Ok(self)
    }

    /// Channel messages are posted to.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Post `message` as a single coloured attachment.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails, Slack answers with a non-200 status,
    /// or the response reports `ok: false`.
    pub async fn send(&self, message: &SlackMessage) -> NotifyResult<()> {
        let payload = PostMessage {
            channel: &self.channel,
            attachments: [Attachment {
                color: message.color,
                text: &message.text,
                kind: "mrkdwn",
            }],
        };
        debug!(channel = %self.channel, endpoint = %self.endpoint, "posting slack summary");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|source| NotifyError::Transport { source })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| NotifyError::Transport { source })?;
        if status != StatusCode::OK {
            return Err(NotifyError::Status {
                status,
                body: String::from_utf8_lossy(&body).trim().to_string(),
            });
        }

        let reply: PostMessageResponse =
            serde_json::from_slice(&body).map_err(|source| NotifyError::Decode { source })?;
        if !reply.ok {
            return Err(NotifyError::Rejected {
                error: reply.error.unwrap_or_else(|| "unknown_error".to_string()),
            });
        }
        info!(channel = %self.channel, "slack summary delivered");
        Ok(())
    }
}

fn normalise_channel(channel: &str) -> String {
    format!("#{}", channel.trim().trim_start_matches('#'))
}

fn parse_url(value: &str) -> NotifyResult<Url> {
    Url::parse(value).map_err(|source| NotifyError::InvalidUrl {
        value: value.to_string(),
        source,
    })
}
