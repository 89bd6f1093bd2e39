//! Errors for the fallible edges of the crate (config, fetch, strict dates).
//!
//! Normalizers and formatters never return these; they degrade to defaults.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to read config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid base url '{0}'")]
    InvalidBaseUrl(String),

    #[error("invalid date range {start}..{end}: {reason}")]
    InvalidDateRange {
        start: String,
        end: String,
        reason: String,
    },

    #[error("unknown report section '{0}'")]
    UnknownSection(String),

    #[error("request for {section} failed: {source}")]
    Http {
        section: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{section} returned HTTP {status}")]
    Status { section: String, status: u16 },

    #[error("{section} timed out after {secs}s")]
    Timeout { section: String, secs: u64 },

    #[error("payload file for {section} not found at {path:?}")]
    MissingPayload { section: String, path: PathBuf },

    #[error("failed to read payload {path:?}: {source}")]
    PayloadRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode JSON for {section}: {source}")]
    Decode {
        section: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ReportError>;
