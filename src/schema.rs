//! Schema Synchronizer: change-gated push of the local schema file.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::api::ProjectApi;
use crate::error::ProvisionError;

/// The build system's report of which files were modified in this build.
#[derive(Debug, Clone, Default)]
pub struct ChangedFiles {
    paths: HashSet<PathBuf>,
}

impl ChangedFiles {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        ChangedFiles {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }
}

/// Pushes the schema file's raw bytes to the project when the build reports
/// it modified; does nothing otherwise.
///
/// The bytes are forwarded without local parsing or validation. The response
/// status is not inspected; only transport failures surface here.
pub async fn ensure_latest_schema<P: ProjectApi>(
    api: &P,
    changed: &ChangedFiles,
    schema_file: &Path,
) -> Result<(), ProvisionError> {
    if !changed.contains(schema_file) {
        debug!(schema = %schema_file.display(), "Schema unchanged, skipping push");
        return Ok(());
    }

    let body = fs::read(schema_file)?;
    info!(schema = %schema_file.display(), bytes = body.len(), "Pushing schema");
    api.push_schema(body).await?;
    Ok(())
}
