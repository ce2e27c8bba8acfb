//! Project Resolver: one project per (site, branch), resolved by name.

use tracing::info;

use crate::api::AccountApi;
use crate::config::ProvisionConfig;
use crate::error::ProvisionError;
use crate::pattern;

/// Platform segment of the deterministic project name.
const PLATFORM_TAG: &str = "CI";

/// Computes the project name for a site/branch pair. The branch segment is
/// omitted when absent. Matching against this name is exact; no trimming or
/// case folding happens anywhere.
pub fn project_name(site_name: &str, branch: Option<&str>) -> String {
    match branch {
        Some(branch) => format!("[{PLATFORM_TAG}] {site_name}/{branch}"),
        None => format!("[{PLATFORM_TAG}] {site_name}"),
    }
}

/// Returns the id of the project for this site/branch, creating it if no
/// project with the computed name exists yet.
///
/// Creation seeds the new project from the local pattern directory when one
/// is present on disk. An already-existing project is returned untouched:
/// no field updates, no pattern upload.
pub async fn ensure_project<A: AccountApi>(
    api: &A,
    config: &ProvisionConfig,
) -> Result<String, ProvisionError> {
    let name = project_name(&config.site_name, config.branch.as_deref());

    let projects = api.list_projects().await?;
    if let Some(existing) = projects.iter().find(|p| p.name == name) {
        info!(project = %name, id = %existing.id, "Project already exists");
        return Ok(existing.id.clone());
    }

    info!(project = %name, timezone = %config.timezone, "Creating project");
    let project_id = api.create_project(&name, &config.timezone).await?;

    if config.pattern_dir.is_dir() {
        info!(id = %project_id, pattern_dir = %config.pattern_dir.display(), "Seeding new project from pattern");
        pattern::upload_pattern(api, &project_id, &config.pattern_dir, &config.import_poll)
            .await?;
    }

    Ok(project_id)
}
