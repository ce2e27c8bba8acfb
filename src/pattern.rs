//! Pattern Uploader: package the local pattern directory, push it to the
//! server-issued destination and poll the import job to a terminal state.

use std::path::Path;

use tracing::{debug, info};

use crate::api::AccountApi;
use crate::archive;
use crate::config::PollPolicy;
use crate::error::ProvisionError;

/// Terminal-state interpretation of the raw wire status.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ImportStatus {
    Running,
    Completed,
    Timeout,
    Error,
    Other(String),
}

impl From<&str> for ImportStatus {
    fn from(s: &str) -> Self {
        match s {
            "running" => ImportStatus::Running,
            "completed" => ImportStatus::Completed,
            "timeout" => ImportStatus::Timeout,
            "error" => ImportStatus::Error,
            other => ImportStatus::Other(other.to_string()),
        }
    }
}

/// Uploads the pattern directory to `project_id` and waits for the import to
/// finish. Fails on any terminal non-success state.
pub async fn upload_pattern<A: AccountApi>(
    api: &A,
    project_id: &str,
    pattern_dir: &Path,
    poll: &PollPolicy,
) -> Result<(), ProvisionError> {
    let ticket = api.begin_pattern_import(project_id).await?;

    let bytes = archive::pack_directory(pattern_dir)?;
    info!(
        project_id,
        import_id = %ticket.import_id,
        archive_bytes = bytes.len(),
        "Transferring pattern archive"
    );
    api.upload_archive(&ticket.uri, bytes).await?;

    await_import(api, &ticket.import_id, poll).await
}

/// Polls the import job on a fixed interval until a terminal state shows up
/// or the attempt budget runs out.
async fn await_import<A: AccountApi>(
    api: &A,
    import_id: &str,
    poll: &PollPolicy,
) -> Result<(), ProvisionError> {
    for attempt in 1..=poll.max_attempts {
        tokio::time::sleep(poll.interval).await;

        let Some(record) = api.fetch_import(import_id).await? else {
            // The job record can lag behind the upload acknowledgement.
            debug!(import_id, attempt, "Import job not visible yet");
            continue;
        };

        match ImportStatus::from(record.status.as_str()) {
            ImportStatus::Running => {
                debug!(import_id, attempt, "Import still running");
            }
            ImportStatus::Completed => {
                info!(import_id, attempt, "Pattern import completed");
                return Ok(());
            }
            ImportStatus::Timeout => return Err(ProvisionError::ImportTimedOut),
            ImportStatus::Error => {
                return Err(ProvisionError::ImportFailed(
                    record
                        .message
                        .unwrap_or_else(|| "Pattern import failed".to_string()),
                ))
            }
            ImportStatus::Other(status) => {
                return Err(ProvisionError::ImportUnexpectedStatus(status))
            }
        }
    }

    Err(ProvisionError::ImportBudgetExhausted {
        attempts: poll.max_attempts,
    })
}
