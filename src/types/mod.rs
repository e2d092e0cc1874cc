//! Shared types for the intake service

mod error;

pub use error::{IntakeError, Result};
