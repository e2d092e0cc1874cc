//! Submission payload parsing and normalization
//!
//! Bodies arrive as loosely-typed JSON from a public form. Every field is
//! captured as an optional raw value and checked here, so nothing past this
//! module has to care what shape the browser actually sent.

use bson::Document;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::types::{IntakeError, Result};

pub const MISSING_TOKEN: &str = "missing token";
pub const MISSING_SCORES: &str = "missing questionnaire scores";

/// Raw submit body; every field optional and untyped
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    #[serde(default)]
    pub token: Option<Value>,
    #[serde(default)]
    pub teacher_id: Option<Value>,
    #[serde(default)]
    pub teacher_name: Option<Value>,
    #[serde(default)]
    pub item_scores: Option<Value>,
    #[serde(default)]
    pub item_notes: Option<Value>,
    #[serde(default)]
    pub motivation_styles: Option<Value>,
    #[serde(default)]
    pub roles: Option<Value>,
    #[serde(default)]
    pub engagement_note: Option<Value>,
}

/// How the submitter identified the teacher being described
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeacherChoice {
    /// An existing record picked from the list
    Existing(String),
    /// A name typed by the submitter; a record is created for it
    SelfIdentified(String),
    /// Neither given
    Unspecified,
}

/// A submission whose required fields passed shape checks
#[derive(Debug, Clone)]
pub struct Submission {
    pub token: String,
    pub teacher: TeacherChoice,
    pub item_scores: Map<String, Value>,
    pub item_notes: Document,
    pub motivation_styles: Vec<String>,
    pub roles: Vec<String>,
    pub engagement_note: Option<String>,
}

impl SubmissionPayload {
    /// Check required fields and normalize the optional ones
    pub fn validate(self) -> Result<Submission> {
        let token = match self.token {
            Some(Value::String(token)) if !token.is_empty() => token,
            _ => return Err(IntakeError::BadRequest(MISSING_TOKEN.to_string())),
        };

        let item_scores = match self.item_scores {
            Some(Value::Object(scores)) => scores,
            _ => return Err(IntakeError::BadRequest(MISSING_SCORES.to_string())),
        };

        Ok(Submission {
            token,
            teacher: teacher_choice(self.teacher_id.as_ref(), self.teacher_name.as_ref()),
            item_scores,
            item_notes: normalize_item_notes(self.item_notes),
            motivation_styles: normalize_motivation_styles(self.motivation_styles),
            roles: normalize_roles(self.roles),
            engagement_note: normalize_note(self.engagement_note),
        })
    }
}

fn non_empty_trimmed(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}

/// An explicit ID wins over a typed name
pub fn teacher_choice(teacher_id: Option<&Value>, teacher_name: Option<&Value>) -> TeacherChoice {
    if let Some(id) = non_empty_trimmed(teacher_id) {
        TeacherChoice::Existing(id)
    } else if let Some(name) = non_empty_trimmed(teacher_name) {
        TeacherChoice::SelfIdentified(name)
    } else {
        TeacherChoice::Unspecified
    }
}

/// Notes are kept as sent when they form an object, otherwise dropped
pub fn normalize_item_notes(value: Option<Value>) -> Document {
    match value {
        Some(Value::Object(notes)) => bson::to_document(&notes).unwrap_or_else(|e| {
            debug!("Discarding item notes that do not convert to BSON: {}", e);
            Document::new()
        }),
        _ => Document::new(),
    }
}

/// String entries of an array, in order; anything else yields an empty list
pub fn normalize_motivation_styles(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Roles from an array or a comma-separated string, trimmed, empties dropped
pub fn normalize_roles(value: Option<Value>) -> Vec<String> {
    let clean = |s: &str| {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };

    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(clean)
            .collect(),
        Some(Value::String(s)) => s.split(',').filter_map(clean).collect(),
        _ => Vec::new(),
    }
}

/// Trimmed note, or `None` when missing, blank, or not a string
pub fn normalize_note(value: Option<Value>) -> Option<String> {
    non_empty_trimmed(value.as_ref())
}
