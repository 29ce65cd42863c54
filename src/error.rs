use thiserror::Error;

pub type Result<T> = std::result::Result<T, SummarizeError>;

/// Errors surfaced by the summarization pipeline.
///
/// All of them are terminal: nothing is retried, and the binary reports the
/// error as a single diagnostic line and exits non-zero.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// Required configuration is missing. Raised before any network activity.
    #[error("missing required configuration: {0}")]
    Config(String),

    /// The source page could not be fetched or parsed.
    #[error("failed to fetch or parse page: {0}")]
    Fetch(String),

    /// The completion call failed, the provider reported an error, or the
    /// response did not carry a reply.
    #[error("failed to generate summary: {0}")]
    Completion(String),
}
