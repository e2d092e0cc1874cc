//! HTTP server for the intake service

pub mod http;

pub use http::{run, AppState};
