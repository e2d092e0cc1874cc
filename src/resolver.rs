//! Token resolution
//!
//! Maps an opaque questionnaire token onto the scope it grants write access
//! to. A token that matches nothing is an expected outcome (stale links are
//! common) and surfaces as `NotFound`, never as a fault.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::TokenMode;
use crate::store::EngagementStore;
use crate::types::{IntakeError, Result};

/// Message for tokens that match nothing
pub const INVALID_LINK: &str = "invalid or expired link";

/// What a resolved token grants access to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormScope {
    /// A whole school; the submitter chooses or names the teacher
    School { school_id: String },
    /// Exactly one teacher record
    Teacher { school_id: String, teacher_id: String },
}

impl FormScope {
    pub fn school_id(&self) -> &str {
        match self {
            Self::School { school_id } | Self::Teacher { school_id, .. } => school_id,
        }
    }
}

/// Resolves tokens against storage according to the configured mode
#[derive(Clone)]
pub struct TokenResolver {
    store: Arc<dyn EngagementStore>,
    mode: TokenMode,
}

impl TokenResolver {
    pub fn new(store: Arc<dyn EngagementStore>, mode: TokenMode) -> Self {
        Self { store, mode }
    }

    pub fn mode(&self) -> TokenMode {
        self.mode
    }

    /// Resolve a raw token, trimming surrounding whitespace first.
    ///
    /// When several records share the token the oldest one wins.
    pub async fn resolve(&self, raw_token: &str) -> Result<FormScope> {
        let token = raw_token.trim();
        if token.is_empty() {
            return Err(IntakeError::NotFound(INVALID_LINK.to_string()));
        }

        let scope = match self.mode {
            TokenMode::School => {
                let matches = self.store.find_schools_by_token(token).await?;
                if matches.len() > 1 {
                    warn!(
                        matches = matches.len(),
                        school_id = %matches[0],
                        "Form token shared by several schools, using the oldest"
                    );
                }
                matches
                    .into_iter()
                    .next()
                    .map(|school_id| FormScope::School { school_id })
            }
            TokenMode::Teacher => {
                let matches = self.store.find_teachers_by_token(token).await?;
                if matches.len() > 1 {
                    warn!(
                        matches = matches.len(),
                        teacher_id = %matches[0].teacher_id,
                        "Form token shared by several teachers, using the oldest"
                    );
                }
                matches.into_iter().next().map(|r| FormScope::Teacher {
                    school_id: r.school_id,
                    teacher_id: r.teacher_id,
                })
            }
        };

        match scope {
            Some(scope) => {
                debug!(school_id = scope.school_id(), mode = self.mode.as_str(), "Token resolved");
                Ok(scope)
            }
            None => Err(IntakeError::NotFound(INVALID_LINK.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{SchoolSettingsDoc, TeacherDoc};
    use crate::store::MemoryStore;
    use bson::DateTime;

    async fn school_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_school(SchoolSettingsDoc::new("school-a".into(), Some("abc".into())))
            .await;
        store
    }

    #[tokio::test]
    async fn test_trimmed_token_resolves() {
        let resolver = TokenResolver::new(school_store().await, TokenMode::School);
        let expected = FormScope::School {
            school_id: "school-a".into(),
        };
        assert_eq!(resolver.resolve("abc").await.unwrap(), expected);
        assert_eq!(resolver.resolve(" abc ").await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_prefix_and_case_do_not_match() {
        let resolver = TokenResolver::new(school_store().await, TokenMode::School);
        for token in ["abcd", "ab", "ABC"] {
            let err = resolver.resolve(token).await.unwrap_err();
            assert!(matches!(err, IntakeError::NotFound(ref m) if m == INVALID_LINK));
        }
    }

    #[tokio::test]
    async fn test_blank_token_not_found() {
        let resolver = TokenResolver::new(school_store().await, TokenMode::School);
        assert!(matches!(
            resolver.resolve("   ").await,
            Err(IntakeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_teacher_mode_resolves_record() {
        let store = Arc::new(MemoryStore::new());
        let mut teacher = TeacherDoc::new("school-b".into(), "Rina".into(), DateTime::now());
        teacher.form_token = Some("t-123".into());
        let id = store.insert_teacher(teacher).await;

        let resolver = TokenResolver::new(store, TokenMode::Teacher);
        assert_eq!(
            resolver.resolve("t-123").await.unwrap(),
            FormScope::Teacher {
                school_id: "school-b".into(),
                teacher_id: id,
            }
        );
    }

    #[tokio::test]
    async fn test_school_token_ignored_in_teacher_mode() {
        let resolver = TokenResolver::new(school_store().await, TokenMode::Teacher);
        assert!(resolver.resolve("abc").await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_token_uses_oldest() {
        let store = school_store().await;
        store
            .insert_school(SchoolSettingsDoc::new("school-z".into(), Some("abc".into())))
            .await;
        let resolver = TokenResolver::new(store, TokenMode::School);
        assert_eq!(resolver.resolve("abc").await.unwrap().school_id(), "school-a");
    }
}
