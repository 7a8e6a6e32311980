//! Error taxonomy shared by every hostmap crate.
//!
//! Transient network failures are never represented here; they surface as
//! absent results. Everything in [`Error`] is either a configuration fault
//! (fatal before a pipeline starts) or a programming error.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A task was scheduled after the pool began shutting down.
    #[error("worker pool is closed")]
    PoolClosed,

    #[error("unknown port list name: {0}")]
    UnknownPortList(String),

    #[error("invalid TCP port: {0}")]
    InvalidPort(String),

    #[error("invalid domain name: {0}")]
    InvalidDomain(String),

    #[error("invalid nameserver address: {0}")]
    InvalidNameserver(String),

    /// A result file from an earlier pipeline is missing.
    #[error("{} does not contain {file}; did you run `{hint}` first?", .dir.display())]
    MissingPrerequisite {
        dir: PathBuf,
        file: &'static str,
        hint: &'static str,
    },

    /// A result file exists but one of its lines cannot be parsed.
    #[error("{file}:{line}: malformed entry `{content}`")]
    MalformedResult {
        file: &'static str,
        line: usize,
        content: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
