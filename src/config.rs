//! Configuration for the intake service
//!
//! CLI arguments and environment variable handling using clap.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// How a submission token maps onto stored records
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenMode {
    /// One token per school; the submitter picks or names a teacher
    School,
    /// One token per teacher; the token alone identifies the record
    Teacher,
}

impl TokenMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::School => "school",
            Self::Teacher => "teacher",
        }
    }
}

/// Log output format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Engagement intake - teacher questionnaire submission service
#[derive(Parser, Debug, Clone)]
#[command(name = "engagement-intake")]
#[command(about = "Accepts teacher engagement questionnaires and stores aggregated scores")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "engagement")]
    pub mongodb_db: String,

    /// Whether tokens identify a school or a single teacher
    #[arg(long, env = "TOKEN_MODE", value_enum, default_value = "school")]
    pub token_mode: TokenMode,

    /// Enable development mode (in-memory store when MongoDB is unreachable)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// JSON seed file for the in-memory store (dev mode only)
    #[arg(long, env = "SEED_FILE")]
    pub seed_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Maximum accepted request body size in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value = "65536")]
    pub max_body_bytes: usize,

    /// Value of the Access-Control-Allow-Origin header
    #[arg(long, env = "CORS_ALLOW_ORIGIN", default_value = "*")]
    pub cors_allow_origin: String,
}

impl Args {
    /// Request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Default tracing filter when RUST_LOG is not set
    pub fn default_log_filter(&self) -> String {
        format!("engagement_intake={},info", self.log_level)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }

        if self.max_body_bytes == 0 {
            return Err("MAX_BODY_BYTES must be greater than zero".to_string());
        }

        if self.seed_file.is_some() && !self.dev_mode {
            return Err("SEED_FILE is only allowed in development mode".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["engagement-intake"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.token_mode, TokenMode::School);
        assert_eq!(args.mongodb_db, "engagement");
        assert_eq!(args.request_timeout(), Duration::from_secs(30));
        assert_eq!(args.cors_allow_origin, "*");
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_teacher_mode_flag() {
        let args = parse(&["--token-mode", "teacher"]);
        assert_eq!(args.token_mode, TokenMode::Teacher);
        assert_eq!(args.token_mode.as_str(), "teacher");
    }

    #[test]
    fn test_seed_file_requires_dev_mode() {
        let args = parse(&["--seed-file", "seed.json"]);
        assert!(args.validate().is_err());

        let args = parse(&["--seed-file", "seed.json", "--dev-mode"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let args = parse(&["--request-timeout-ms", "0"]);
        assert!(args.validate().is_err());
    }
}
