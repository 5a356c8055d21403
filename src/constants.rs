// Endpoint settings, loaded from the environment (or .env) with defaults.

use std::env;

/// Marker the model is asked to put in front of the customer-facing summary.
pub const SUMMARY_MARKER: &str = "Human-Like Summary for Customer:";

/// Literal substituted for any blank answer.
pub const NOT_AVAILABLE: &str = "N/A";

/// Shown when the upstream body has no `choices[0].message.content`.
pub const NO_RESPONSE_PLACEHOLDER: &str = "No response from API.";

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Upper bound for a whole form post, images included.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

lazy_static::lazy_static! {
    pub static ref CHAT_COMPLETIONS_URL: String = env::var("DESIGN_BRIEF_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    pub static ref CHAT_MODEL: String = env::var("DESIGN_BRIEF_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    pub static ref REQUEST_TIMEOUT_SECS: u64 = env::var("DESIGN_BRIEF_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
}
