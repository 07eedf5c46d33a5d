use thiserror::Error;

use crate::types::SourceId;

/// Error type for transport, parse, value, and configuration failures.
///
/// Transport, parse, and value errors are fatal to an ingestion run: one bad
/// row invalidates the whole snapshot.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("text source '{source_id}' is unavailable: {reason}")]
    Transport { source_id: SourceId, reason: String },
    #[error("{}", format_parse(.line, .details))]
    Parse { line: Option<u64>, details: String },
    #[error("line {line}: field '{field}' is not a non-negative integer: {value:?}")]
    Value {
        line: u64,
        field: String,
        value: String,
    },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("an ingestion run is already in progress")]
    LoadInProgress,
    #[error("ingestion run was cancelled")]
    Cancelled,
}

fn format_parse(line: &Option<u64>, details: &str) -> String {
    match line {
        Some(line) => format!("malformed input at line {line}: {details}"),
        None => format!("malformed input: {details}"),
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|position| position.line());
        PipelineError::Parse {
            line,
            details: err.to_string(),
        }
    }
}
