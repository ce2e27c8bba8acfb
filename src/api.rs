//! Remote admin API interface.
//!
//! Two traits cover the two endpoint scopes the workflow talks to:
//! [`AccountApi`] for the account-level endpoint (project resolution and the
//! pattern import lifecycle) and [`ProjectApi`] for the project-scoped
//! endpoint (API keys and the schema push). The record structs here mirror
//! the response shapes exactly; duck-typed access into response JSON is not
//! allowed anywhere else in the crate.
//!
//! Both traits are implemented by the reqwest-backed client in
//! [`crate::client`] and by `mockall` mocks in tests (exported through the
//! `test-export-mocks` feature).

use async_trait::async_trait;
use mockall::{automock, predicate::*};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// A project visible to the authenticated account.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
}

/// Write-once upload destination plus the import job it feeds.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    pub uri: String,
    pub import_id: String,
}

/// Point-in-time view of an import job. `status` stays a raw string on the
/// wire; the uploader owns the terminal-state interpretation.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRecord {
    pub status: String,
    pub message: Option<String>,
}

/// Permission scope of an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyRole {
    #[serde(rename = "read")]
    Read,
    #[serde(rename = "readWrite")]
    ReadWrite,
}

/// An existing key as listed by the project endpoint. Secret values are never
/// part of listings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyRecord {
    pub name: String,
    pub role: KeyRole,
}

/// Account-scoped admin operations.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// List every project visible to the authenticated account.
    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, ApiError>;

    /// Create a project and return its server-assigned id.
    async fn create_project(&self, name: &str, default_timezone: &str)
        -> Result<String, ApiError>;

    /// Request a one-time upload destination and import job for a project.
    async fn begin_pattern_import(&self, project_id: &str) -> Result<UploadTicket, ApiError>;

    /// Fetch the current state of an import job. `None` means the job record
    /// is not visible yet; callers treat that as still running.
    async fn fetch_import(&self, import_id: &str) -> Result<Option<ImportRecord>, ApiError>;

    /// PUT the archive bytes to the server-issued URI. The URI itself is the
    /// authorization; no bearer token is attached.
    async fn upload_archive(&self, uri: &str, bytes: Vec<u8>) -> Result<(), ApiError>;
}

/// Project-scoped admin operations.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ProjectApi: Send + Sync {
    /// List the project's existing API keys (names and roles only).
    async fn list_api_keys(&self) -> Result<Vec<ApiKeyRecord>, ApiError>;

    /// Create an API key and return its secret. The secret is only ever
    /// returned here; it cannot be fetched again.
    async fn create_api_key(&self, name: &str, role: KeyRole) -> Result<String, ApiError>;

    /// POST raw schema bytes to the project schema endpoint.
    async fn push_schema(&self, body: Vec<u8>) -> Result<(), ApiError>;
}
