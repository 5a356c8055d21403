pub mod constants;
pub mod errors;
pub mod form;
pub mod images;
pub mod interview;
pub mod openai;
pub mod prompt;
pub mod response;
pub mod submission;
pub mod template;
pub mod web_server;

pub use errors::{SubmitError, TemplateError};
pub use form::{FormField, FormInput};
pub use images::UploadedImage;
pub use openai::ChatClient;
pub use prompt::ImageMode;
pub use response::SplitResponse;
pub use submission::{Submission, SubmissionAttempt, SubmissionReport};
pub use template::PromptTemplate;
