use thiserror::Error;

/// Failures surfaced by the remote admin API or its transport.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The admin endpoint rejected the bearer token (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// The operation was rejected by server-side input validation.
    /// `instance_path` points at the offending variable, e.g. `/defaultTimezone`.
    #[error("validation failed at {instance_path}: {message}")]
    Validation {
        instance_path: String,
        message: String,
    },

    /// The response carried a structured error list without validation details.
    #[error("{0}")]
    Remote(String),

    /// The response parsed but did not carry the expected data object.
    #[error("malformed response: {0}")]
    Decode(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Failures of the provisioning workflow itself.
///
/// Import states map one-to-one onto the terminal import job statuses, so the
/// boundary can tell them apart from transport errors.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Pattern import timed out")]
    ImportTimedOut,

    #[error("{0}")]
    ImportFailed(String),

    #[error("Unexpected pattern import status: {0}")]
    ImportUnexpectedStatus(String),

    /// The local polling budget ran out while the job still reported running.
    /// Distinct from the server-side `timeout` status.
    #[error("Pattern import still running after {attempts} status checks")]
    ImportBudgetExhausted { attempts: u32 },

    #[error("failed to build pattern archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
