//! Top-level workflow: resolve project → sync schema → provision keys,
//! strictly in that order, fail-fast.
//!
//! No step depends on the output of a later one, and nothing created by an
//! earlier step is rolled back when a later step fails. Idempotence comes
//! entirely from the list-then-create checks inside each step.

use tracing::info;

use crate::api::{AccountApi, ProjectApi};
use crate::config::ProvisionConfig;
use crate::error::{ApiError, ProvisionError};
use crate::keys;
use crate::project;
use crate::schema::{self, ChangedFiles};

pub const ENV_API_URL: &str = "CMS_API_URL";
pub const ENV_READ_KEY: &str = "CMS_READ_ONLY_API_KEY";
pub const ENV_READ_WRITE_KEY: &str = "CMS_READ_WRITE_API_KEY";

/// Connection details handed to the rest of the build. A key field is `None`
/// when that key already existed and no fresh secret is available this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEnv {
    pub api_url: String,
    pub read_key: Option<String>,
    pub read_write_key: Option<String>,
}

impl BuildEnv {
    /// `KEY=value` lines for the build-environment mapping, secrets included
    /// only when newly created.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("{}={}", ENV_API_URL, self.api_url)];
        if let Some(key) = &self.read_key {
            lines.push(format!("{ENV_READ_KEY}={key}"));
        }
        if let Some(key) = &self.read_write_key {
            lines.push(format!("{ENV_READ_WRITE_KEY}={key}"));
        }
        lines
    }
}

/// Runs the full provisioning workflow for one build.
///
/// `project_api` constructs the project-scoped client once the project id is
/// known; the account-scoped client is used for everything before that.
pub async fn provision<A, P, F>(
    config: &ProvisionConfig,
    changed: &ChangedFiles,
    account: &A,
    project_api: F,
) -> Result<BuildEnv, ProvisionError>
where
    A: AccountApi,
    P: ProjectApi,
    F: FnOnce(&str) -> P,
{
    info!("[PROVISION] Resolving project");
    let project_id = project::ensure_project(account, config).await?;

    let project = project_api(&project_id);

    info!(project_id = %project_id, "[PROVISION] Synchronising schema");
    schema::ensure_latest_schema(&project, changed, &config.schema_file).await?;

    info!(project_id = %project_id, "[PROVISION] Ensuring API keys");
    let provisioned = keys::ensure_api_keys(&project).await?;

    Ok(BuildEnv {
        api_url: format!("{}/project/{}/v3/graphql", config.base_url, project_id),
        read_key: provisioned.read_key,
        read_write_key: provisioned.read_write_key,
    })
}

/// Classifies a workflow failure into the single message reported to the
/// build. Exactly one message, chosen at this boundary alone.
pub fn failure_message(config: &ProvisionConfig, err: &ProvisionError) -> String {
    match err {
        ProvisionError::Api(ApiError::Unauthorized) => "Invalid CMS_ACCESS_TOKEN".to_string(),
        ProvisionError::Api(ApiError::Validation { instance_path, .. })
            if instance_path == "/defaultTimezone" =>
        {
            format!("Invalid timezone {:?}", config.timezone)
        }
        other => other.to_string(),
    }
}
