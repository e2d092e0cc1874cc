//! Engagement intake - teacher engagement questionnaire service
//!
//! Accepts questionnaire submissions through a token-gated public link,
//! aggregates the twelve item scores into four domain scores, and stores the
//! result on the teacher's record in MongoDB.
//!
//! ## Components
//!
//! - **Resolver**: maps a form token to a school or a single teacher
//! - **Scoring**: validates item scores and rounds domain means
//! - **Submission**: validates payloads and writes engagement fields
//! - **Roster**: lists the teachers selectable on a school form

pub mod config;
pub mod db;
pub mod resolver;
pub mod roster;
pub mod routes;
pub mod scoring;
pub mod server;
pub mod store;
pub mod submission;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{IntakeError, Result};
