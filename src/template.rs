//! User-editable prompt templates and `{name}` placeholder substitution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::TemplateError;

pub const DEFAULT_CONTEXT: &str = "You’re helping to interpret responses from a customer about their upcoming design project. Extract key details from their answers to display them as clear project specifications. All details are optional, so if any information is not provided, leave it blank or state \"N/A\" for that item. Highlight details such as the timeframe, budget, and any uploaded images that provide a sense of the style or vibe desired.

Additionally, provide three outputs:
1. Extract key elements from the customer's input (timeline, budget, and the style you extract from the image they provide if any), displayed separately at the top for quick reference in a structured format.
2. A friendly, human-like response that acknowledges the customer's design inputs and summarizes them concisely.
3. A very short summary of the uploaded image(s) and how they influenced the design suggestions.

The customer is providing details about their design project. Your role is to extract key information, provide a friendly summary, and - in a separate section - make a very brief helpful comment / suggest additional considerations to ensure a successful collaboration between the customer and the interior designer (keep it short). The customer's preferences and requirements are fully optional, and your summary should be helpful for both the customer and the designer to move forward with the project confidently. Be concise.";

pub const DEFAULT_MESSAGE: &str = "Here’s the customer’s input:

General Overview: \"{vision_goals}\"

Room Use & Function:

Primary Function: \"{primary_function}\"

Traffic Level: \"{traffic}\"

Kids: \"{children_use}\"

Personal or Shared: \"{personal_shared}\"

Emotions: \"{atmosphere}\"

Budget: \"{budget}\"

Existing Furniture/Items: \"{existing_pieces}\"

Uploaded Images: {uploaded_images}

Using this information, please extract and summarize the following project specs. If any information is missing or not mentioned, simply note it as \"Unknown\"

Timeframe:

Budget:

Style:

Expected Output Example:

Timeframe: N/A (Customer hasn’t provided a specific deadline)

Budget: {budget}

Style: Extracted from uploaded images

Summary of Project:

Short Summary of Uploaded Images:
\"{uploaded_images}\"";

/// The two text areas a user can edit before submitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub context: String,
    pub message: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            context: DEFAULT_CONTEXT.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
        }
    }
}

/// Replaces every `{name}` in `template` with `values[name]`.
///
/// `{{` and `}}` produce literal braces. Anything after `!` or `:` inside a
/// placeholder is ignored. A name missing from `values` is an error rather
/// than being passed through.
pub fn fill(template: &str, values: &HashMap<&str, &str>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut offset = 0;

    while let Some(found) = template[offset..].find(|c: char| c == '{' || c == '}') {
        let at = offset + found;
        out.push_str(&template[offset..at]);
        let after = &template[at + 1..];

        if template[at..].starts_with('}') {
            if !after.starts_with('}') {
                return Err(TemplateError::UnbalancedBrace {
                    brace: '}',
                    position: at,
                });
            }
            out.push('}');
            offset = at + 2;
            continue;
        }

        if after.starts_with('{') {
            out.push('{');
            offset = at + 2;
            continue;
        }

        let close = after.find('}').ok_or(TemplateError::UnbalancedBrace {
            brace: '{',
            position: at,
        })?;
        let field = &after[..close];
        if field.contains('{') {
            return Err(TemplateError::UnbalancedBrace {
                brace: '{',
                position: at,
            });
        }

        let name = field.split(|c: char| c == '!' || c == ':').next().unwrap_or(field);
        let value = values
            .get(name)
            .ok_or_else(|| TemplateError::UnknownPlaceholder {
                name: name.to_string(),
            })?;
        out.push_str(value);
        offset = at + 1 + close + 1;
    }

    out.push_str(&template[offset..]);
    Ok(out)
}
