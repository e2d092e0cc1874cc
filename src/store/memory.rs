//! In-memory implementation of [`EngagementStore`]
//!
//! Used in dev mode when MongoDB is unreachable and throughout the tests.
//! Insertion order stands in for `_id` order.

use bson::{oid::ObjectId, DateTime};
use serde::Deserialize;
use std::path::Path;
use tokio::sync::RwLock;

use super::{EngagementStore, TeacherRef, TOKEN_MATCH_LIMIT};
use crate::db::schemas::{EngagementUpdate, Metadata, SchoolSettingsDoc, TeacherDoc};
use crate::types::{IntakeError, Result};

/// Seed file contents for dev mode
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedData {
    #[serde(default)]
    pub schools: Vec<SeedSchool>,
    #[serde(default)]
    pub teachers: Vec<SeedTeacher>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSchool {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub form_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedTeacher {
    /// 24-hex ObjectId; generated when absent
    #[serde(default)]
    pub id: Option<String>,
    pub school_id: String,
    pub name: String,
    #[serde(default)]
    pub form_token: Option<String>,
}

impl SeedData {
    /// Load a seed file
    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&raw).map_err(|e| {
            IntakeError::Config(format!("Invalid seed file {}: {}", path.display(), e))
        })
    }
}

#[derive(Default)]
struct MemoryState {
    schools: Vec<SchoolSettingsDoc>,
    teachers: Vec<TeacherDoc>,
}

/// Process-local store
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated from seed data
    pub async fn with_seed(seed: SeedData) -> Result<Self> {
        let store = Self::new();

        for school in seed.schools {
            let mut settings = SchoolSettingsDoc::new(school.id, school.form_token);
            settings.school_name = school.name;
            store.insert_school(settings).await;
        }

        for teacher in seed.teachers {
            let id = match teacher.id.as_deref() {
                Some(hex) => Some(ObjectId::parse_str(hex).map_err(|e| {
                    IntakeError::Config(format!("Invalid seed teacher id {}: {}", hex, e))
                })?),
                None => None,
            };
            let mut doc = TeacherDoc::new(teacher.school_id, teacher.name, DateTime::now());
            doc._id = id;
            doc.form_token = teacher.form_token;
            store.insert_teacher(doc).await;
        }

        Ok(store)
    }

    /// Add a school settings record
    pub async fn insert_school(&self, mut settings: SchoolSettingsDoc) {
        settings._id.get_or_insert_with(ObjectId::new);
        self.state.write().await.schools.push(settings);
    }

    /// Add a teacher record, assigning an ID if missing; returns the ID
    pub async fn insert_teacher(&self, mut teacher: TeacherDoc) -> String {
        let oid = *teacher._id.get_or_insert_with(ObjectId::new);
        if teacher.metadata.created_at.is_none() {
            teacher.metadata = Metadata::new();
        }
        self.state.write().await.teachers.push(teacher);
        oid.to_hex()
    }

    /// Snapshot of a teacher by ID, regardless of school
    pub async fn teacher(&self, teacher_id: &str) -> Option<TeacherDoc> {
        let state = self.state.read().await;
        state
            .teachers
            .iter()
            .find(|t| t.id().as_deref() == Some(teacher_id))
            .cloned()
    }

    /// Number of live teacher records
    pub async fn teacher_count(&self) -> usize {
        let state = self.state.read().await;
        state.teachers.iter().filter(|t| !t.metadata.is_deleted).count()
    }
}

fn matches_teacher(teacher: &TeacherDoc, school_id: &str, teacher_id: &str) -> bool {
    !teacher.metadata.is_deleted
        && teacher.school_id == school_id
        && teacher.id().as_deref() == Some(teacher_id)
}

#[async_trait::async_trait]
impl EngagementStore for MemoryStore {
    async fn find_schools_by_token(&self, token: &str) -> Result<Vec<String>> {
        let state = self.state.read().await;
        Ok(state
            .schools
            .iter()
            .filter(|s| !s.metadata.is_deleted && s.form_token.as_deref() == Some(token))
            .take(TOKEN_MATCH_LIMIT)
            .map(|s| s.school_id.clone())
            .collect())
    }

    async fn find_teachers_by_token(&self, token: &str) -> Result<Vec<TeacherRef>> {
        let state = self.state.read().await;
        Ok(state
            .teachers
            .iter()
            .filter(|t| !t.metadata.is_deleted && t.form_token.as_deref() == Some(token))
            .take(TOKEN_MATCH_LIMIT)
            .filter_map(|t| {
                Some(TeacherRef {
                    school_id: t.school_id.clone(),
                    teacher_id: t.id()?,
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
        Ok(self.insert_teacher(teacher).await)
    }

    async fn get_teacher(&self, school_id: &str, teacher_id: &str) -> Result<Option<TeacherDoc>> {
        let state = self.state.read().await;
        Ok(state
            .teachers
            .iter()
            .find(|t| matches_teacher(t, school_id, teacher_id))
            .cloned())
    }

    async fn update_engagement(
        &self,
        school_id: &str,
        teacher_id: &str,
        update: &EngagementUpdate,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        match state
            .teachers
            .iter_mut()
            .find(|t| matches_teacher(t, school_id, teacher_id))
        {
            Some(teacher) => {
                teacher.apply_engagement(update);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_teachers(&self, school_id: &str) -> Result<Vec<TeacherDoc>> {
        let state = self.state.read().await;
        let mut teachers: Vec<TeacherDoc> = state
            .teachers
            .iter()
            .filter(|t| !t.metadata.is_deleted && t.school_id == school_id)
            .cloned()
            .collect();
        // Stable: equal timestamps keep insertion order
        teachers.sort_by_key(|t| t.metadata.created_at);
        Ok(teachers)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
