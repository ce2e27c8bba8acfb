//! API Key Provisioner: one read and one read/write credential per project.

use tracing::info;

use crate::api::{KeyRole, ProjectApi};
use crate::error::ProvisionError;

pub const READ_KEY_NAME: &str = "CI Read Only";
pub const READ_WRITE_KEY_NAME: &str = "CI Read/Write";

/// Secrets captured during this run. `None` means the key already existed;
/// its secret was only ever returned at creation time and cannot be
/// re-fetched, so nothing is published for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionedKeys {
    pub read_key: Option<String>,
    pub read_write_key: Option<String>,
}

/// Ensures both fixed credentials exist, creating whichever is missing.
/// The two checks are independent; neither influences the other.
pub async fn ensure_api_keys<P: ProjectApi>(api: &P) -> Result<ProvisionedKeys, ProvisionError> {
    let existing = api.list_api_keys().await?;
    let exists =
        |name: &str, role: KeyRole| existing.iter().any(|k| k.name == name && k.role == role);

    let read_key = if exists(READ_KEY_NAME, KeyRole::Read) {
        info!(name = READ_KEY_NAME, "Read key already exists");
        None
    } else {
        info!(name = READ_KEY_NAME, "Creating read key");
        Some(api.create_api_key(READ_KEY_NAME, KeyRole::Read).await?)
    };

    let read_write_key = if exists(READ_WRITE_KEY_NAME, KeyRole::ReadWrite) {
        info!(name = READ_WRITE_KEY_NAME, "Read/write key already exists");
        None
    } else {
        info!(name = READ_WRITE_KEY_NAME, "Creating read/write key");
        Some(
            api.create_api_key(READ_WRITE_KEY_NAME, KeyRole::ReadWrite)
                .await?,
        )
    };

    Ok(ProvisionedKeys {
        read_key,
        read_write_key,
    })
}
