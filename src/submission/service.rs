//! Questionnaire submission pipeline
//!
//! validate → resolve token → pick or create the teacher → aggregate →
//! overwrite engagement fields. All checks run before the first write; the
//! only write preceding the engagement update is the optional creation of a
//! self-identified teacher.

use bson::DateTime;
use std::sync::Arc;
use tracing::{debug, info};

use super::payload::{Submission, SubmissionPayload, TeacherChoice};
use crate::config::TokenMode;
use crate::db::schemas::EngagementUpdate;
use crate::resolver::{FormScope, TokenResolver};
use crate::scoring;
use crate::store::EngagementStore;
use crate::types::{IntakeError, Result};

pub const TEACHER_REQUIRED: &str = "choose a teacher or enter your name";
pub const TEACHER_NOT_FOUND: &str = "teacher not found";

/// Generic message for submission failures that are not the caller's fault
pub const SAVE_FAILED: &str = "failed to save questionnaire";

/// Outcome of a stored submission, for logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub school_id: String,
    pub teacher_id: String,
    /// Whether the teacher record was created by this submission
    pub created_teacher: bool,
    pub answered_items: usize,
    pub scored_domains: usize,
}

/// Runs the submission pipeline against a store
#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<dyn EngagementStore>,
    resolver: TokenResolver,
}

impl SubmissionService {
    pub fn new(store: Arc<dyn EngagementStore>, mode: TokenMode) -> Self {
        let resolver = TokenResolver::new(Arc::clone(&store), mode);
        Self { store, resolver }
    }

    pub fn resolver(&self) -> &TokenResolver {
        &self.resolver
    }

    pub fn store(&self) -> &Arc<dyn EngagementStore> {
        &self.store
    }

    /// Validate, score, and store one questionnaire
    pub async fn submit(&self, payload: SubmissionPayload) -> Result<SubmissionReceipt> {
        let submission = payload.validate()?;
        let scope = self.resolver.resolve(&submission.token).await?;
        let (teacher_id, created_teacher) = self.target_teacher(&scope, &submission).await?;
        let school_id = scope.school_id();

        if self.store.get_teacher(school_id, &teacher_id).await?.is_none() {
            return Err(IntakeError::NotFound(TEACHER_NOT_FOUND.to_string()));
        }

        let scores = scoring::aggregate(&submission.item_scores);
        let answered_items = scores.item_scores.len();
        let scored_domains = scores.domain_scores.len();

        let update = EngagementUpdate {
            item_scores: scores.item_scores,
            item_notes: submission.item_notes,
            domain_scores: scores.domain_scores,
            motivation_styles: submission.motivation_styles,
            roles: submission.roles,
            engagement_note: submission.engagement_note,
        };

        // The record can vanish between the read and the write
        if !self
            .store
            .update_engagement(school_id, &teacher_id, &update)
            .await?
        {
            return Err(IntakeError::NotFound(TEACHER_NOT_FOUND.to_string()));
        }

        info!(
            school_id,
            teacher_id = %teacher_id,
            created_teacher,
            answered_items,
            scored_domains,
            "Engagement questionnaire stored"
        );

        Ok(SubmissionReceipt {
            school_id: school_id.to_string(),
            teacher_id,
            created_teacher,
            answered_items,
            scored_domains,
        })
    }

    /// Teacher the submission writes to, and whether it was just created
    async fn target_teacher(
        &self,
        scope: &FormScope,
        submission: &Submission,
    ) -> Result<(String, bool)> {
        let school_id = match scope {
            FormScope::Teacher { teacher_id, .. } => return Ok((teacher_id.clone(), false)),
            FormScope::School { school_id } => school_id,
        };

        match &submission.teacher {
            TeacherChoice::Existing(id) => Ok((id.clone(), false)),
            TeacherChoice::SelfIdentified(name) => {
                let id = self
                    .store
                    .create_teacher(school_id, name, DateTime::now())
                    .await?;
                debug!(school_id = %school_id, teacher_id = %id, "Created self-identified teacher");
                Ok((id, true))
            }
            TeacherChoice::Unspecified => {
                Err(IntakeError::BadRequest(TEACHER_REQUIRED.to_string()))
            }
        }
    }
}
