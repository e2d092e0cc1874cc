//! MongoDB implementation of [`EngagementStore`]

use bson::{doc, oid::ObjectId, DateTime, Document};
use tracing::debug;

use super::{EngagementStore, TeacherRef, TOKEN_MATCH_LIMIT};
use crate::db::schemas::{
    EngagementUpdate, SchoolSettingsDoc, TeacherDoc, SCHOOL_SETTINGS_COLLECTION,
    TEACHER_COLLECTION,
};
use crate::db::{MongoClient, MongoCollection};
use crate::types::Result;

/// MongoDB-backed store
pub struct MongoEngagementStore {
    settings: MongoCollection<SchoolSettingsDoc>,
    teachers: MongoCollection<TeacherDoc>,
}

impl MongoEngagementStore {
    /// Open both collections, creating indexes as needed
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        let settings = mongo
            .collection::<SchoolSettingsDoc>(SCHOOL_SETTINGS_COLLECTION)
            .await?;
        let teachers = mongo.collection::<TeacherDoc>(TEACHER_COLLECTION).await?;
        debug!(db = mongo.db_name(), "Engagement collections ready");
        Ok(Self { settings, teachers })
    }
}

/// Filter for a teacher by ID within a school.
///
/// An ID that is not a valid ObjectId can never match, so it yields `None`.
fn teacher_filter(school_id: &str, teacher_id: &str) -> Option<Document> {
    let oid = ObjectId::parse_str(teacher_id).ok()?;
    Some(doc! { "_id": oid, "school_id": school_id })
}

fn insertion_order() -> Document {
    doc! { "_id": 1 }
}

#[async_trait::async_trait]
impl EngagementStore for MongoEngagementStore {
    async fn find_schools_by_token(&self, token: &str) -> Result<Vec<String>> {
        let docs = self
            .settings
            .find_sorted(
                doc! { "form_token": token },
                insertion_order(),
                Some(TOKEN_MATCH_LIMIT as i64),
            )
            .await?;

        Ok(docs.into_iter().map(|d| d.school_id).collect())
    }

    async fn find_teachers_by_token(&self, token: &str) -> Result<Vec<TeacherRef>> {
        let docs = self
            .teachers
            .find_sorted(
                doc! { "form_token": token },
                insertion_order(),
                Some(TOKEN_MATCH_LIMIT as i64),
            )
            .await?;

        Ok(docs
            .into_iter()
            .filter_map(|d| {
                let teacher_id = d.id()?;
                Some(TeacherRef {
                    school_id: d.school_id,
                    teacher_id,
                })
            })
            .collect())
    }

    async fn create_teacher(
        &self,
        school_id: &str,
        name: &str,
        created_at: DateTime,
    ) -> Result<String> {
        let teacher = TeacherDoc::new(school_id.to_string(), name.to_string(), created_at);
        let oid = self.teachers.insert_one(teacher).await?;
        Ok(oid.to_hex())
    }

    async fn get_teacher(&self, school_id: &str, teacher_id: &str) -> Result<Option<TeacherDoc>> {
        match teacher_filter(school_id, teacher_id) {
            Some(filter) => self.teachers.find_one(filter).await,
            None => Ok(None),
        }
    }

    async fn update_engagement(
        &self,
        school_id: &str,
        teacher_id: &str,
        update: &EngagementUpdate,
    ) -> Result<bool> {
        let Some(filter) = teacher_filter(school_id, teacher_id) else {
            return Ok(false);
        };

        let result = self
            .teachers
            .update_one(filter, update.to_set_document()?)
            .await?;

        Ok(result.matched_count > 0)
    }

    async fn list_teachers(&self, school_id: &str) -> Result<Vec<TeacherDoc>> {
        self.teachers
            .find_sorted(
                doc! { "school_id": school_id },
                doc! { "metadata.created_at": 1, "_id": 1 },
                None,
            )
            .await
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}
