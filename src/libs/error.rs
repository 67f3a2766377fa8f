use thiserror::Error;

/// Errors raised by one query file's pipeline.
///
/// Every variant is fatal to the affected file only; the batch coordinator
/// records it and keeps processing sibling files.
#[derive(Debug, Error)]
pub enum RbhError {
    #[error("{tool}: {reason}")]
    ExternalTool { tool: String, reason: String },

    #[error("{tool}: timed out after {seconds} s")]
    Timeout { tool: String, seconds: u64 },

    #[error("malformed record at line {line_no}: {reason}: `{line}`")]
    MalformedRecord {
        line_no: usize,
        line: String,
        reason: String,
    },

    #[error("missing or unreadable input: {path}")]
    MissingInput { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
