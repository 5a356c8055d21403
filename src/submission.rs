//! One press of "Submit": everything it needs, and everything it shows.

use serde::Serialize;
use tracing::{info, instrument};

use crate::constants::NOT_AVAILABLE;
use crate::errors::SubmitError;
use crate::form::{FormField, FormInput};
use crate::images::UploadedImage;
use crate::openai::{ApiKey, ChatClient, ChatOutcome, ChatRequest, ContentPart, MessageContent, ResponseBody};
use crate::prompt::{assemble, ImageMode};
use crate::response::SplitResponse;
use crate::template::PromptTemplate;

pub const TIMEFRAME_NOTE: &str = "Extracted from input or N/A";

/// Request-scoped inputs. Nothing here outlives the submission.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub form: FormInput,
    pub images: Vec<UploadedImage>,
    pub template: PromptTemplate,
    pub api_key: Option<String>,
    pub image_mode: ImageMode,
}

/// The request that will be sent, plus the facts shown next to the reply.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub request: ChatRequest,
    pub key_facts: KeyFacts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyFacts {
    pub timeframe: &'static str,
    pub budget: String,
    pub style: &'static str,
}

/// What the result column renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Brief {
    pub key_facts: KeyFacts,
    pub response: SplitResponse,
}

impl Brief {
    /// Plain-text rendering for the terminal.
    pub fn render_text(&self) -> String {
        match &self.response {
            SplitResponse::Sections { key_elements, summary } => {
                let mut out = String::from("Key Elements Summary\n");
                out.push_str(&format!("Timeframe: {}\n", self.key_facts.timeframe));
                out.push_str(&format!("Budget: {}\n", self.key_facts.budget));
                out.push_str(&format!("Style: {}\n", self.key_facts.style));
                let key_elements = key_elements.trim();
                if !key_elements.is_empty() {
                    out.push('\n');
                    out.push_str(key_elements);
                    out.push('\n');
                }
                out.push_str("\nResponse\n");
                out.push_str(summary.trim());
                out
            }
            SplitResponse::Raw { text } => text.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReport {
    pub brief: Brief,
    /// Request as sent, with inline image data shortened.
    pub request: serde_json::Value,
    pub response: ResponseBody,
    pub degraded: bool,
}

impl Submission {
    /// Assembles the prompt and builds the chat request. No network.
    pub fn prepare(&self, model: &str) -> Result<PreparedRequest, SubmitError> {
        let assembled = assemble(&self.template, &self.form, &self.images, self.image_mode)?;
        let request = ChatRequest::user(model, assembled.prompt, &assembled.image_urls);
        Ok(PreparedRequest {
            request,
            key_facts: KeyFacts {
                timeframe: TIMEFRAME_NOTE,
                budget: self.form.value_or_na(FormField::Budget).to_string(),
                style: assembled.style_summary,
            },
        })
    }

    /// Checks the credential, then prepares and sends exactly one request.
    /// The attempt keeps the request JSON even when sending fails.
    #[instrument(skip_all, fields(images = self.images.len(), mode = ?self.image_mode))]
    pub async fn attempt(&self, client: &ChatClient) -> SubmissionAttempt {
        let api_key = match ApiKey::parse(self.api_key.as_deref()) {
            Ok(api_key) => api_key,
            Err(e) => return SubmissionAttempt::unsent(e),
        };
        let prepared = match self.prepare(client.model()) {
            Ok(prepared) => prepared,
            Err(e) => return SubmissionAttempt::unsent(e),
        };
        let request = prepared.debug_json();

        let result = client
            .complete(&api_key, &prepared.request)
            .await
            .map(|outcome| {
                info!(degraded = outcome.degraded, "Submission completed");
                prepared.into_report(outcome)
            });
        SubmissionAttempt {
            request: Some(request),
            result,
        }
    }

    pub async fn submit(&self, client: &ChatClient) -> Result<SubmissionReport, SubmitError> {
        self.attempt(client).await.result
    }
}

/// Outcome of [`Submission::attempt`].
#[derive(Debug)]
pub struct SubmissionAttempt {
    /// Request as sent, when one was built.
    pub request: Option<serde_json::Value>,
    pub result: Result<SubmissionReport, SubmitError>,
}

impl SubmissionAttempt {
    fn unsent(e: SubmitError) -> Self {
        SubmissionAttempt {
            request: None,
            result: Err(e),
        }
    }

    /// Raw body to show when the request failed upstream.
    pub fn error_body(&self) -> Option<&str> {
        match &self.result {
            Err(SubmitError::Upstream { body, .. }) => Some(body),
            _ => None,
        }
    }
}

impl PreparedRequest {
    /// JSON for the debugging panel.
    pub fn debug_json(&self) -> serde_json::Value {
        let mut request = self.request.clone();
        for message in &mut request.messages {
            if let MessageContent::Parts(parts) = &mut message.content {
                for part in parts {
                    if let ContentPart::ImageUrl { image_url } = part {
                        image_url.url = shorten_data_url(&image_url.url);
                    }
                }
            }
        }
        serde_json::to_value(&request).unwrap_or(serde_json::Value::Null)
    }

    pub fn into_report(self, outcome: ChatOutcome) -> SubmissionReport {
        let request = self.debug_json();
        SubmissionReport {
            brief: Brief {
                key_facts: self.key_facts,
                response: SplitResponse::split(&outcome.content),
            },
            request,
            response: outcome.body,
            degraded: outcome.degraded,
        }
    }
}

fn shorten_data_url(url: &str) -> String {
    match url.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => {
            format!("{};base64,<{} base64 chars>", prefix, data.len())
        }
        _ => url.to_string(),
    }
}

impl Default for KeyFacts {
    fn default() -> Self {
        KeyFacts {
            timeframe: TIMEFRAME_NOTE,
            budget: NOT_AVAILABLE.to_string(),
            style: NOT_AVAILABLE,
        }
    }
}
