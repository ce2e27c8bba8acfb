use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error, info};

/// Production admin endpoint, used when `CMS_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://api.shapecms.io";

/// Timezone assigned to newly created projects when none is configured.
pub const DEFAULT_TIMEZONE: &str = "Etc/UTC";

const DEFAULT_PATTERN_DIR: &str = ".cms/pattern";
const DEFAULT_SCHEMA_FILE: &str = ".cms/pattern/schema.json";

/// Everything the provisioning workflow needs, resolved once at process start
/// and passed into every entry point. Core logic never reads the environment.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// Personal access token for the admin API.
    pub access_token: String,
    /// Admin API base URL, no trailing slash.
    pub base_url: String,
    /// Site name, first segment of the deterministic project name.
    pub site_name: String,
    /// Branch being built; omitted from the project name when absent.
    pub branch: Option<String>,
    /// Default timezone handed to project creation.
    pub timezone: String,
    /// Directory holding the starter content pattern, uploaded on first creation.
    pub pattern_dir: PathBuf,
    /// Schema file pushed to the project when the build reports it modified.
    pub schema_file: PathBuf,
    /// Budget for the pattern import polling loop.
    pub import_poll: PollPolicy,
}

/// Bounded polling schedule for the asynchronous pattern import.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            interval: Duration::from_secs(1),
            max_attempts: 600,
        }
    }
}

impl ProvisionConfig {
    /// Builds the configuration from environment variables.
    ///
    /// Fails before any network call when a required variable is missing, so a
    /// misconfigured build dies with the verbatim message below.
    pub fn from_env() -> Result<Self> {
        let access_token = match std::env::var("CMS_ACCESS_TOKEN") {
            Ok(token) if !token.is_empty() => token,
            _ => {
                error!("CMS_ACCESS_TOKEN is not set");
                anyhow::bail!(
                    "Create a personal access token and add it to your build environment variables as CMS_ACCESS_TOKEN."
                );
            }
        };

        let site_name = match std::env::var("SITE_NAME") {
            Ok(name) if !name.is_empty() => name,
            _ => {
                error!("SITE_NAME is not set");
                anyhow::bail!("SITE_NAME environment variable not set");
            }
        };

        let base_url = std::env::var("CMS_BASE_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();

        let branch = std::env::var("BRANCH").ok().filter(|b| !b.is_empty());

        let timezone = std::env::var("CMS_TIMEZONE")
            .ok()
            .filter(|tz| !tz.is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

        let config = ProvisionConfig {
            access_token,
            base_url,
            site_name,
            branch,
            timezone,
            pattern_dir: PathBuf::from(DEFAULT_PATTERN_DIR),
            schema_file: PathBuf::from(DEFAULT_SCHEMA_FILE),
            import_poll: PollPolicy::default(),
        };

        info!(
            base_url = %config.base_url,
            site_name = %config.site_name,
            branch = config.branch.as_deref().unwrap_or(""),
            timezone = %config.timezone,
            "Configuration loaded from environment"
        );
        debug!(pattern_dir = %config.pattern_dir.display(), schema_file = %config.schema_file.display(), "Local content paths");

        Ok(config)
    }
}
