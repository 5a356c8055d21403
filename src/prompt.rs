//! Turns answers, images and templates into the final prompt.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::NOT_AVAILABLE;
use crate::errors::TemplateError;
use crate::form::{FormField, FormInput};
use crate::images::UploadedImage;
use crate::template::{fill, PromptTemplate};

pub const UPLOADED_IMAGES: &str = "uploaded_images";
pub const IMAGE_SUMMARY: &str = "image_summary";

pub const NO_IMAGES_UPLOADED: &str = "No images uploaded";
pub const IMAGES_SUMMARY_SENTENCE: &str = "The uploaded images suggest a preference for certain colors, textures, or styles that have been incorporated into the design recommendations.";
pub const STYLE_FROM_IMAGES: &str = "See uploaded images (style is not analysed locally)";

/// Whether uploaded images travel to the model or only change the wording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageMode {
    /// Images only switch the summary sentence; nothing is sent.
    #[default]
    Describe,
    /// Every image is sent inline after the text.
    Forward,
}

impl ImageMode {
    fn no_images_text(self) -> &'static str {
        match self {
            ImageMode::Describe => NO_IMAGES_UPLOADED,
            ImageMode::Forward => NOT_AVAILABLE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub prompt: String,
    /// `data:` URLs in upload order. Empty in [`ImageMode::Describe`].
    pub image_urls: Vec<String>,
    /// What the `uploaded_images` placeholder resolved to.
    pub image_summary: &'static str,
    /// Style line for the key-elements display.
    pub style_summary: &'static str,
}

/// Text the `uploaded_images` placeholder resolves to.
pub fn summarize_images(images: &[UploadedImage], mode: ImageMode) -> &'static str {
    if images.is_empty() {
        mode.no_images_text()
    } else {
        IMAGES_SUMMARY_SENTENCE
    }
}

pub fn style_summary(images: &[UploadedImage]) -> &'static str {
    if images.is_empty() {
        NOT_AVAILABLE
    } else {
        STYLE_FROM_IMAGES
    }
}

/// Fills the message template. Blank answers become `N/A`.
pub fn fill_message(
    message: &str,
    form: &FormInput,
    image_summary: &str,
) -> Result<String, TemplateError> {
    let mut values: HashMap<&str, &str> = FormField::ALL
        .into_iter()
        .map(|field| (field.key(), form.value_or_na(field)))
        .collect();
    values.insert(UPLOADED_IMAGES, image_summary);
    values.insert(IMAGE_SUMMARY, image_summary);
    fill(message, &values)
}

pub fn assemble(
    template: &PromptTemplate,
    form: &FormInput,
    images: &[UploadedImage],
    mode: ImageMode,
) -> Result<AssembledPrompt, TemplateError> {
    let image_summary = summarize_images(images, mode);
    let message = fill_message(&template.message, form, image_summary)?;
    let prompt = format!("{}\n\n{}", template.context, message);

    let image_urls = match mode {
        ImageMode::Describe => Vec::new(),
        ImageMode::Forward => images.iter().map(UploadedImage::to_data_url).collect(),
    };

    debug!(
        prompt_len = prompt.len(),
        images = images.len(),
        forwarded = image_urls.len(),
        ?mode,
        "Assembled prompt"
    );

    Ok(AssembledPrompt {
        prompt,
        image_urls,
        image_summary,
        style_summary: style_summary(images),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::DEFAULT_MESSAGE;

    fn image(name: &str) -> UploadedImage {
        UploadedImage::from_upload(name, vec![1, 2, 3]).unwrap()
    }

    #[test]
    fn test_blank_form_fills_every_position_with_na() {
        let message: String = FormField::ALL
            .iter()
            .map(|f| format!("[{{{}}}]", f.key()))
            .collect();
        let filled = fill_message(&message, &FormInput::new(), "N/A").unwrap();
        assert_eq!(filled, "[N/A]".repeat(8));
    }

    #[test]
    fn test_default_message_with_blank_form() {
        let filled = fill_message(DEFAULT_MESSAGE, &FormInput::new(), NO_IMAGES_UPLOADED).unwrap();
        assert!(filled.contains("General Overview: \"N/A\""));
        assert!(filled.contains("Budget: \"N/A\""));
        assert!(filled.contains("Uploaded Images: No images uploaded"));
        assert!(!filled.contains('{'));
    }

    #[test]
    fn test_prompt_is_context_blank_line_message() {
        let template = PromptTemplate {
            context: "CTX".to_string(),
            message: "Budget={budget}".to_string(),
        };
        let form = FormInput::new().with(FormField::Budget, "$5k");
        let assembled = assemble(&template, &form, &[], ImageMode::Describe).unwrap();
        assert_eq!(assembled.prompt, "CTX\n\nBudget=$5k");
        assert_eq!(assembled.style_summary, "N/A");
    }

    #[test]
    fn test_image_summary_depends_on_mode() {
        assert_eq!(summarize_images(&[], ImageMode::Describe), "No images uploaded");
        assert_eq!(summarize_images(&[], ImageMode::Forward), "N/A");
        assert_eq!(
            summarize_images(&[image("a.png")], ImageMode::Describe),
            IMAGES_SUMMARY_SENTENCE
        );
    }

    #[test]
    fn test_image_summary_alias() {
        let template = PromptTemplate {
            context: String::new(),
            message: "{uploaded_images}|{image_summary}".to_string(),
        };
        let assembled =
            assemble(&template, &FormInput::new(), &[image("a.jpg")], ImageMode::Describe).unwrap();
        assert_eq!(
            assembled.prompt,
            format!("\n\n{0}|{0}", IMAGES_SUMMARY_SENTENCE)
        );
    }

    #[test]
    fn test_forwarded_image_count() {
        let template = PromptTemplate::default();
        for n in [0usize, 1, 3] {
            let images: Vec<_> = (0..n).map(|i| image(&format!("{}.png", i))).collect();
            let forward = assemble(&template, &FormInput::new(), &images, ImageMode::Forward).unwrap();
            assert_eq!(forward.image_urls.len(), n);
            let describe =
                assemble(&template, &FormInput::new(), &images, ImageMode::Describe).unwrap();
            assert!(describe.image_urls.is_empty());
        }
    }

    #[test]
    fn test_unknown_placeholder_propagates() {
        let template = PromptTemplate {
            context: String::new(),
            message: "{style_summary}".to_string(),
        };
        let err = assemble(&template, &FormInput::new(), &[], ImageMode::Describe).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownPlaceholder { ref name } if name == "style_summary"));
    }
}
