//! School settings document schema
//!
//! One document per school. Holds the school-wide form token that lets
//! staff submit questionnaires without an account.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for school settings
pub const SCHOOL_SETTINGS_COLLECTION: &str = "school_settings";

/// School settings document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SchoolSettingsDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Owning school identifier
    pub school_id: String,

    /// Display name of the school
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_name: Option<String>,

    /// Shared questionnaire token for this school
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_token: Option<String>,
}

impl SchoolSettingsDoc {
    /// Create a settings document for a school
    pub fn new(school_id: String, form_token: Option<String>) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            school_id,
            school_name: None,
            form_token,
        }
    }
}

impl IntoIndexes for SchoolSettingsDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "school_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("school_id_unique".to_string())
                        .build(),
                ),
            ),
            // Token lookups; uniqueness is not enforced here
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

impl MutMetadata for SchoolSettingsDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
