//! Questionnaire submission: payload checks and the write pipeline

pub mod payload;
pub mod service;

pub use payload::{Submission, SubmissionPayload, TeacherChoice, MISSING_SCORES, MISSING_TOKEN};
pub use service::{SubmissionReceipt, SubmissionService, SAVE_FAILED};
