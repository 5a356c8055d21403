//! The questionnaire: eight free-text answers about a design project.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::NOT_AVAILABLE;

/// One question on the form. The serialized name is the template placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    VisionGoals,
    PrimaryFunction,
    Traffic,
    ChildrenUse,
    PersonalShared,
    Atmosphere,
    Budget,
    ExistingPieces,
}

impl FormField {
    /// All fields, in the order the form shows them.
    pub const ALL: [FormField; 8] = [
        FormField::VisionGoals,
        FormField::PrimaryFunction,
        FormField::Traffic,
        FormField::ChildrenUse,
        FormField::PersonalShared,
        FormField::Atmosphere,
        FormField::Budget,
        FormField::ExistingPieces,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FormField::VisionGoals => "vision_goals",
            FormField::PrimaryFunction => "primary_function",
            FormField::Traffic => "traffic",
            FormField::ChildrenUse => "children_use",
            FormField::PersonalShared => "personal_shared",
            FormField::Atmosphere => "atmosphere",
            FormField::Budget => "budget",
            FormField::ExistingPieces => "existing_pieces",
        }
    }

    pub fn from_key(key: &str) -> Option<FormField> {
        FormField::ALL.into_iter().find(|field| field.key() == key)
    }

    /// Heading of the form section the question sits under.
    pub fn section(self) -> &'static str {
        match self {
            FormField::VisionGoals => "General Overview",
            FormField::PrimaryFunction
            | FormField::Traffic
            | FormField::ChildrenUse
            | FormField::PersonalShared => "Room Use & Function",
            FormField::Atmosphere => "Emotions",
            FormField::Budget => "Budget",
            FormField::ExistingPieces => "Existing Furniture/Items",
        }
    }

    pub fn question(self) -> &'static str {
        match self {
            FormField::VisionGoals => "Can you describe your vision or goals for this project?",
            FormField::PrimaryFunction => "What is the primary function of this space?",
            FormField::Traffic => "How much daily traffic does this room get?",
            FormField::ChildrenUse => {
                "Will children use this room? If so, what should be considered for them?"
            }
            FormField::PersonalShared => "Will this space be primarily for personal use, or shared?",
            FormField::Atmosphere => "What feeling or atmosphere do you want this space to create?",
            FormField::Budget => "Do you have a budget in mind for this project?",
            FormField::ExistingPieces => {
                "Are there any existing pieces or elements you’d like to incorporate into the design?"
            }
        }
    }

    /// Long answers get a text area instead of a single-line input.
    pub fn is_long_text(self) -> bool {
        matches!(self, FormField::VisionGoals | FormField::ExistingPieces)
    }

    /// Sample answer, used both as input placeholder and by autofill.
    pub fn sample_answer(self) -> &'static str {
        match self {
            FormField::VisionGoals => {
                "I’m aiming for a fresh, functional design that suits my lifestyle and personal taste."
            }
            FormField::PrimaryFunction => {
                "This will be a multi-purpose room used for both work and relaxation."
            }
            FormField::Traffic => "It will have moderate traffic throughout the day.",
            FormField::ChildrenUse => "Yes, this space needs to be kid-friendly and safe.",
            FormField::PersonalShared => {
                "This room will be shared with family and occasional guests."
            }
            FormField::Atmosphere => "I’d like it to feel serene and inviting, but also energizing.",
            FormField::Budget => {
                "I’m looking to stay within a mid-range budget, but open to flexibility."
            }
            FormField::ExistingPieces => {
                "I’d like to keep a few key pieces of furniture and some family heirlooms."
            }
        }
    }
}

/// Answers for one submission. Missing and blank answers are equivalent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormInput {
    answers: BTreeMap<FormField, String>,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form filled with every sample answer.
    pub fn autofill() -> Self {
        let mut form = Self::new();
        form.apply_autofill();
        form
    }

    /// Overwrites every answer with its sample. Replaces, never merges.
    pub fn apply_autofill(&mut self) {
        self.answers = FormField::ALL
            .into_iter()
            .map(|field| (field, field.sample_answer().to_string()))
            .collect();
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        self.answers.insert(field, value.into());
    }

    pub fn with(mut self, field: FormField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// The raw answer, if one was given (may still be blank).
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.answers.get(&field).map(String::as_str)
    }

    /// The answer, or `N/A` when missing or blank.
    pub fn value_or_na(&self, field: FormField) -> &str {
        match self.get(field) {
            Some(value) if !value.trim().is_empty() => value,
            _ => NOT_AVAILABLE,
        }
    }

    pub fn is_blank(&self) -> bool {
        FormField::ALL
            .into_iter()
            .all(|field| self.value_or_na(field) == NOT_AVAILABLE)
    }
}
