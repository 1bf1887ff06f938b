use thiserror::Error;

/// Every failure mode of a single run. Nothing below the pipeline retries or
/// swallows an error; whichever stage fails first aborts the rest of the run
/// and the detail surfaces through the binary's exit status.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("source read failed: {0}")]
    SourceUnavailable(String),

    #[error("source grid has no rows (missing header)")]
    EmptySource,

    #[error("provisioning {resource} failed: {detail}")]
    Provisioning { resource: String, detail: String },

    #[error("load job failed: {0}")]
    LoadJob(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
