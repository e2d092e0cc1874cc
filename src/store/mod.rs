//! Persistence seam for questionnaire intake
//!
//! The resolver and the submission service only talk to storage through
//! [`EngagementStore`]. Production uses [`MongoEngagementStore`]; dev mode
//! and tests use [`MemoryStore`].

pub mod memory;
pub mod mongo;

pub use memory::{MemoryStore, SeedData};
pub use mongo::MongoEngagementStore;

use bson::DateTime;

use crate::db::schemas::{EngagementUpdate, TeacherDoc};
use crate::types::Result;

/// Upper bound on token matches fetched per lookup.
///
/// Two is enough to notice a duplicated token without scanning further.
pub const TOKEN_MATCH_LIMIT: usize = 2;

/// A teacher record matched by its personal token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherRef {
    pub school_id: String,
    pub teacher_id: String,
}

/// Storage operations needed by the intake pipeline
#[async_trait::async_trait]
pub trait EngagementStore: Send + Sync {
    /// Schools whose settings token equals `token`, oldest first, at most
    /// [`TOKEN_MATCH_LIMIT`]
    async fn find_schools_by_token(&self, token: &str) -> Result<Vec<String>>;

    /// Teachers whose personal token equals `token`, oldest first, at most
    /// [`TOKEN_MATCH_LIMIT`]
    async fn find_teachers_by_token(&self, token: &str) -> Result<Vec<TeacherRef>>;

    /// Insert a new teacher for `school_id`; returns the new record ID
    async fn create_teacher(&self, school_id: &str, name: &str, created_at: DateTime)
        -> Result<String>;

    /// Fetch a teacher that belongs to `school_id`
    async fn get_teacher(&self, school_id: &str, teacher_id: &str) -> Result<Option<TeacherDoc>>;

    /// Replace the engagement fields of a teacher. Returns false if no
    /// matching record exists.
    async fn update_engagement(
        &self,
        school_id: &str,
        teacher_id: &str,
        update: &EngagementUpdate,
    ) -> Result<bool>;

    /// All teachers of a school in creation order
    async fn list_teachers(&self, school_id: &str) -> Result<Vec<TeacherDoc>>;

    /// Short backend name for health output
    fn backend(&self) -> &'static str;
}
