use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::constants::{self, NO_RESPONSE_PLACEHOLDER};
use crate::errors::SubmitError;

/// Bearer credential entered for one submission. Never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Fails with [`SubmitError::MissingCredential`] when absent or blank.
    pub fn parse(raw: Option<&str>) -> Result<Self, SubmitError> {
        match raw.map(str::trim) {
            Some(key) if !key.is_empty() => Ok(ApiKey(key.to_string())),
            _ => Err(SubmitError::MissingCredential),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

// Chat-completions wire types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatRequest {
    /// A single user message. Plain text unless there are images to attach.
    pub fn user(model: impl Into<String>, prompt: impl Into<String>, image_urls: &[String]) -> Self {
        let prompt = prompt.into();
        let content = if image_urls.is_empty() {
            MessageContent::Text(prompt)
        } else {
            let mut parts = Vec::with_capacity(image_urls.len() + 1);
            parts.push(ContentPart::Text { text: prompt });
            parts.extend(image_urls.iter().map(|url| ContentPart::ImageUrl {
                image_url: ImageUrl { url: url.clone() },
            }));
            MessageContent::Parts(parts)
        };
        ChatRequest {
            model: model.into(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content,
            }],
        }
    }

    pub fn image_part_count(&self) -> usize {
        self.messages
            .iter()
            .map(|message| match &message.content {
                MessageContent::Text(_) => 0,
                MessageContent::Parts(parts) => parts
                    .iter()
                    .filter(|part| matches!(part, ContentPart::ImageUrl { .. }))
                    .count(),
            })
            .sum()
    }
}

/// Successful body: parsed JSON when possible, otherwise the text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    /// `choices[0].message.content`, or the placeholder.
    pub content: String,
    pub body: ResponseBody,
    /// True when the expected content path was missing.
    pub degraded: bool,
}

impl ChatOutcome {
    pub fn from_body(raw: String) -> Self {
        let body = match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(raw),
        };
        let content = match &body {
            ResponseBody::Json(value) => value
                .pointer("/choices/0/message/content")
                .and_then(|content| content.as_str())
                .map(str::to_string),
            ResponseBody::Text(_) => None,
        };
        match content {
            Some(content) => ChatOutcome {
                content,
                body,
                degraded: false,
            },
            None => ChatOutcome {
                content: NO_RESPONSE_PLACEHOLDER.to_string(),
                body,
                degraded: true,
            },
        }
    }
}

/// Sends one chat-completion request per call. No retries.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    url: String,
    model: String,
    timeout: Duration,
}

impl ChatClient {
    pub fn new(url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        ChatClient {
            http: Client::new(),
            url: url.into(),
            model: model.into(),
            timeout,
        }
    }

    /// Endpoint, model and timeout from the environment.
    pub fn from_env() -> Self {
        Self::new(
            constants::CHAT_COMPLETIONS_URL.clone(),
            constants::CHAT_MODEL.clone(),
            Duration::from_secs(*constants::REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[instrument(skip(self, api_key, request), fields(url = %self.url, model = %request.model))]
    pub async fn complete(
        &self,
        api_key: &ApiKey,
        request: &ChatRequest,
    ) -> Result<ChatOutcome, SubmitError> {
        info!(images = request.image_part_count(), "Sending chat completion request");

        let response = self
            .http
            .post(&self.url)
            .timeout(self.timeout)
            .header("Content-Type", "application/json")
            .header("Authorization", api_key.bearer())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Chat completion request failed");
                SubmitError::Network(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(%status, %body, "Chat completion API returned an error");
            return Err(SubmitError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let outcome = ChatOutcome::from_body(body);
        if outcome.degraded {
            warn!("Response had no choices[0].message.content; using placeholder");
        } else {
            debug!(content_len = outcome.content.len(), "Received chat completion");
        }
        Ok(outcome)
    }
}
