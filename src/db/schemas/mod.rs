//! Database schemas for the intake service
//!
//! Defines MongoDB document structures for school settings and teachers.

mod metadata;
mod school_settings;
mod teacher;

pub use metadata::Metadata;
pub use school_settings::{SchoolSettingsDoc, SCHOOL_SETTINGS_COLLECTION};
pub use teacher::{
    EngagementUpdate, TeacherDoc, TeacherStatus, DEFAULT_RATING, DEFAULT_WORKLOAD_PERCENT,
    TEACHER_COLLECTION,
};
