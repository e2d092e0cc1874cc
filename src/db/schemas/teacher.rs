//! Teacher document schema
//!
//! A teacher record is the unit of mutation for questionnaire submissions.
//! Engagement fields are always written together and replace whatever the
//! previous submission stored.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::scoring::{DomainScores, ItemScores};
use crate::types::Result;

/// Collection name for teachers
pub const TEACHER_COLLECTION: &str = "teachers";

/// Starting value for every 1-6 rating on a new record
pub const DEFAULT_RATING: i32 = 3;

/// Starting workload on a new record
pub const DEFAULT_WORKLOAD_PERCENT: i32 = 86;

/// Follow-up status tracked by school staff
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TeacherStatus {
    /// Nothing flagged
    #[default]
    #[serde(rename = "none")]
    NoConcern,
    Watch,
    Concern,
}

/// Teacher document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TeacherDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at doubles as the record's creation time)
    #[serde(default)]
    pub metadata: Metadata,

    /// Owning school identifier
    pub school_id: String,

    /// Display name
    pub name: String,

    /// Personal questionnaire token (teacher-scoped tokens only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_token: Option<String>,

    #[serde(default = "default_rating")]
    pub engagement_level: i32,

    #[serde(default = "default_rating")]
    pub satisfaction_level: i32,

    #[serde(default = "default_rating")]
    pub collaboration_level: i32,

    #[serde(default = "default_rating")]
    pub wellbeing_level: i32,

    #[serde(default = "default_workload_percent")]
    pub workload_percent: i32,

    #[serde(default)]
    pub absence_count: i32,

    #[serde(default)]
    pub meeting_count: i32,

    #[serde(default)]
    pub followup_count: i32,

    #[serde(default)]
    pub subjects: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(default)]
    pub motivation_styles: Vec<String>,

    #[serde(default)]
    pub status: TeacherStatus,

    #[serde(default)]
    pub engagement_item_scores: ItemScores,

    #[serde(default)]
    pub engagement_item_notes: Document,

    #[serde(default)]
    pub engagement_domain_scores: DomainScores,

    #[serde(default)]
    pub engagement_note: Option<String>,
}

fn default_rating() -> i32 {
    DEFAULT_RATING
}

fn default_workload_percent() -> i32 {
    DEFAULT_WORKLOAD_PERCENT
}

impl Default for TeacherDoc {
    fn default() -> Self {
        Self {
            _id: None,
            metadata: Metadata::default(),
            school_id: String::new(),
            name: String::new(),
            form_token: None,
            engagement_level: DEFAULT_RATING,
            satisfaction_level: DEFAULT_RATING,
            collaboration_level: DEFAULT_RATING,
            wellbeing_level: DEFAULT_RATING,
            workload_percent: DEFAULT_WORKLOAD_PERCENT,
            absence_count: 0,
            meeting_count: 0,
            followup_count: 0,
            subjects: Vec::new(),
            tags: Vec::new(),
            roles: Vec::new(),
            motivation_styles: Vec::new(),
            status: TeacherStatus::NoConcern,
            engagement_item_scores: ItemScores::new(),
            engagement_item_notes: Document::new(),
            engagement_domain_scores: DomainScores::new(),
            engagement_note: None,
        }
    }
}

impl TeacherDoc {
    /// Create a record for a teacher who named themselves on the form
    pub fn new(school_id: String, name: String, created_at: DateTime) -> Self {
        Self {
            metadata: Metadata::at(created_at),
            school_id,
            name,
            ..Self::default()
        }
    }

    /// Hex form of the document ID, if assigned
    pub fn id(&self) -> Option<String> {
        self._id.map(|oid| oid.to_hex())
    }

    /// Overwrite every engagement field with a submission's values
    pub fn apply_engagement(&mut self, update: &EngagementUpdate) {
        self.engagement_item_scores = update.item_scores.clone();
        self.engagement_item_notes = update.item_notes.clone();
        self.engagement_domain_scores = update.domain_scores.clone();
        self.motivation_styles = update.motivation_styles.clone();
        self.roles = update.roles.clone();
        self.engagement_note = update.engagement_note.clone();
        self.metadata.updated_at = Some(DateTime::now());
    }
}

impl IntoIndexes for TeacherDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Listing a school's teachers in creation order
            (
                doc! { "school_id": 1, "metadata.created_at": 1 },
                Some(
                    IndexOptions::builder()
                        .name("school_created_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "form_token": 1 },
                Some(
                    IndexOptions::builder()
                        .sparse(true)
                        .name("form_token_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for TeacherDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

/// Engagement fields written by one questionnaire submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngagementUpdate {
    pub item_scores: ItemScores,
    pub item_notes: Document,
    pub domain_scores: DomainScores,
    pub motivation_styles: Vec<String>,
    pub roles: Vec<String>,
    pub engagement_note: Option<String>,
}

impl EngagementUpdate {
    /// `$set` modifications replacing each engagement field wholesale
    pub fn to_set_document(&self) -> Result<Document> {
        Ok(doc! {
            "$set": {
                "engagement_item_scores": bson::to_bson(&self.item_scores)?,
                "engagement_item_notes": self.item_notes.clone(),
                "engagement_domain_scores": bson::to_bson(&self.domain_scores)?,
                "motivation_styles": bson::to_bson(&self.motivation_styles)?,
                "roles": bson::to_bson(&self.roles)?,
                "engagement_note": bson::to_bson(&self.engagement_note)?,
                "metadata.updated_at": DateTime::now(),
            }
        })
    }
}
