// src/error.rs
//
// Boundary-layer errors only. The pipeline stages (S1-S7) never fail on
// well-formed input and never surface a `Result` — see §7 of the spec.
// This enum is for the I/O boundary: loading a registry snapshot file,
// parsing a corpus JSONL line in the CLI harness.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid registry snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("malformed corpus entry at line {line}: {source}")]
    MalformedEntry {
        line:   usize,
        #[source]
        source: serde_json::Error,
    },
}
