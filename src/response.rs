use serde::Serialize;

use crate::constants::SUMMARY_MARKER;

/// Model output, split for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitResponse {
    /// Text around the first marker, both parts verbatim.
    Sections { key_elements: String, summary: String },
    /// No marker; shown as-is.
    Raw { text: String },
}

impl SplitResponse {
    pub fn split(text: &str) -> Self {
        match text.split_once(SUMMARY_MARKER) {
            Some((key_elements, summary)) => SplitResponse::Sections {
                key_elements: key_elements.to_string(),
                summary: summary.to_string(),
            },
            None => SplitResponse::Raw {
                text: text.to_string(),
            },
        }
    }

    /// Summary as displayed: trimmed.
    pub fn display_summary(&self) -> Option<&str> {
        match self {
            SplitResponse::Sections { summary, .. } => Some(summary.trim()),
            SplitResponse::Raw { .. } => None,
        }
    }

    /// Inverse of [`SplitResponse::split`].
    pub fn rejoin(&self) -> String {
        match self {
            SplitResponse::Sections {
                key_elements,
                summary,
            } => format!("{}{}{}", key_elements, SUMMARY_MARKER, summary),
            SplitResponse::Raw { text } => text.clone(),
        }
    }
}
