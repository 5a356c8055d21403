use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown placeholder '{{{name}}}' in message template")]
    UnknownPlaceholder { name: String },
    #[error("unbalanced '{brace}' at byte {position} in message template")]
    UnbalancedBrace { brace: char, position: usize },
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Please provide your API key to proceed.")]
    MissingCredential,
    #[error("An error occurred: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Error: {status}, {body}")]
    Upstream { status: u16, body: String },
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
    #[error("Unsupported image '{name}': only jpg, jpeg and png uploads are accepted")]
    UnsupportedImage { name: String },
}

impl SubmitError {
    /// Missing credentials are reported as a warning, not a failure.
    pub fn is_warning(&self) -> bool {
        matches!(self, SubmitError::MissingCredential)
    }
}
