//! Teacher roster for the questionnaire's teacher picker

use serde::Serialize;

use crate::resolver::FormScope;
use crate::submission::SubmissionService;
use crate::types::Result;

/// Generic message for roster failures that are not the caller's fault
pub const LOAD_FAILED: &str = "failed to load teachers";

/// Entry in the teacher picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherSummary {
    pub id: String,
    pub name: String,
}

/// Teachers selectable for a token, oldest first.
///
/// A school token lists the whole school; a teacher token lists only its
/// own record. Unnamed records are skipped.
pub async fn list_form_teachers(service: &SubmissionService, token: &str) -> Result<Vec<TeacherSummary>> {
    let scope = service.resolver().resolve(token).await?;
    let store = service.store();

    let teachers = match &scope {
        FormScope::School { school_id } => store.list_teachers(school_id).await?,
        FormScope::Teacher {
            school_id,
            teacher_id,
        } => store
            .get_teacher(school_id, teacher_id)
            .await?
            .into_iter()
            .collect(),
    };

    Ok(teachers
        .into_iter()
        .filter(|t| !t.name.trim().is_empty())
        .filter_map(|t| {
            Some(TeacherSummary {
                id: t.id()?,
                name: t.name,
            })
        })
        .collect())
}
