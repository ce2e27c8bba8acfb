//! reqwest-backed implementation of the admin API traits.
//!
//! All admin calls are named GraphQL operations POSTed to the scope's
//! endpoint with a bearer token. The archive PUT and the schema POST are the
//! two raw transfers outside the GraphQL envelope.

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::{
    AccountApi, ApiKeyRecord, ImportRecord, KeyRole, ProjectApi, ProjectRecord, UploadTicket,
};
use crate::config::ProvisionConfig;
use crate::error::ApiError;

const PROJECT_LIST_QUERY: &str = "\
query ProjectList {
  projects: projectList { id name }
}";

const CREATE_PROJECT_MUTATION: &str = "\
mutation CreateProject($name: String!, $timezone: String!) {
  project: createProject(name: $name, defaultTimezone: $timezone) { id }
}";

const BEGIN_PATTERN_IMPORT_MUTATION: &str = "\
mutation BeginPatternImport($projectId: String!) {
  upload: uploadProject(name: \"pattern.zip\", type: \"application/zip\", projectId: $projectId) {
    uri
    importId
  }
}";

const IMPORT_STATUS_QUERY: &str = "\
query ImportStatus($importId: String!) {
  import: projectImport(id: $importId) { status message }
}";

const API_KEY_LIST_QUERY: &str = "\
query ApiKeyList {
  apiKeys: apiKeysByProject { name role }
}";

const CREATE_API_KEY_MUTATION: &str = "\
mutation CreateApiKey($name: String!, $role: String!) {
  key: createApiKey(name: $name, role: $role) { apiKey }
}";

#[derive(Serialize)]
struct GraphqlRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
    #[serde(default, rename = "validationErrors")]
    validation_errors: Vec<ValidationDetail>,
}

#[derive(Deserialize)]
struct ValidationDetail {
    #[serde(rename = "instancePath")]
    instance_path: String,
    message: Option<String>,
}

/// One GraphQL endpoint plus the credentials to call it.
struct GraphqlEndpoint {
    http: reqwest::Client,
    url: String,
    token: String,
}

impl GraphqlEndpoint {
    async fn request<V, T>(&self, operation: &str, query: &str, variables: V) -> Result<T, ApiError>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        debug!(operation, url = %self.url, "Issuing admin call");
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await?;
        let envelope: GraphqlResponse<T> = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                ApiError::Decode(format!("{operation}: {e}"))
            } else {
                ApiError::Remote(format!("{operation} returned {status}"))
            }
        })?;

        if let Some(detail) = envelope
            .errors
            .iter()
            .flat_map(|e| e.validation_errors.iter())
            .next()
        {
            return Err(ApiError::Validation {
                instance_path: detail.instance_path.clone(),
                message: detail.message.clone().unwrap_or_default(),
            });
        }
        if !envelope.errors.is_empty() {
            let messages: Vec<&str> = envelope.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(ApiError::Remote(messages.join("; ")));
        }

        envelope
            .data
            .ok_or_else(|| ApiError::Decode(format!("{operation}: response carried no data")))
    }
}

/// Client for the account-level endpoint, `{base}/v3/admin-graphql`.
pub struct AccountClient {
    gql: GraphqlEndpoint,
}

impl AccountClient {
    pub fn new(config: &ProvisionConfig) -> Self {
        AccountClient {
            gql: GraphqlEndpoint {
                http: reqwest::Client::new(),
                url: format!("{}/v3/admin-graphql", config.base_url),
                token: config.access_token.clone(),
            },
        }
    }
}

/// Client for a project-scoped endpoint,
/// `{base}/project/{id}/v3/admin-graphql`, plus the raw schema endpoint.
pub struct ProjectClient {
    gql: GraphqlEndpoint,
    schema_url: String,
}

impl ProjectClient {
    pub fn new(config: &ProvisionConfig, project_id: &str) -> Self {
        ProjectClient {
            gql: GraphqlEndpoint {
                http: reqwest::Client::new(),
                url: format!("{}/project/{}/v3/admin-graphql", config.base_url, project_id),
                token: config.access_token.clone(),
            },
            schema_url: format!("{}/project/{}/schema", config.base_url, project_id),
        }
    }
}

#[derive(Deserialize)]
struct ProjectListData {
    projects: Vec<ProjectRecord>,
}

#[derive(Deserialize)]
struct CreateProjectData {
    project: CreatedId,
}

#[derive(Deserialize)]
struct CreatedId {
    id: String,
}

#[derive(Deserialize)]
struct BeginImportData {
    upload: UploadTicket,
}

#[derive(Deserialize)]
struct ImportStatusData {
    import: Option<ImportRecord>,
}

#[derive(Deserialize)]
struct ApiKeyListData {
    #[serde(rename = "apiKeys")]
    api_keys: Vec<ApiKeyRecord>,
}

#[derive(Deserialize)]
struct CreateApiKeyData {
    key: CreatedKey,
}

#[derive(Deserialize)]
struct CreatedKey {
    #[serde(rename = "apiKey")]
    api_key: String,
}

#[async_trait]
impl AccountApi for AccountClient {
    async fn list_projects(&self) -> Result<Vec<ProjectRecord>, ApiError> {
        let data: ProjectListData = self
            .gql
            .request("ProjectList", PROJECT_LIST_QUERY, serde_json::json!({}))
            .await?;
        Ok(data.projects)
    }

    async fn create_project(
        &self,
        name: &str,
        default_timezone: &str,
    ) -> Result<String, ApiError> {
        let data: CreateProjectData = self
            .gql
            .request(
                "CreateProject",
                CREATE_PROJECT_MUTATION,
                serde_json::json!({ "name": name, "timezone": default_timezone }),
            )
            .await?;
        Ok(data.project.id)
    }

    async fn begin_pattern_import(&self, project_id: &str) -> Result<UploadTicket, ApiError> {
        let data: BeginImportData = self
            .gql
            .request(
                "BeginPatternImport",
                BEGIN_PATTERN_IMPORT_MUTATION,
                serde_json::json!({ "projectId": project_id }),
            )
            .await?;
        Ok(data.upload)
    }

    async fn fetch_import(&self, import_id: &str) -> Result<Option<ImportRecord>, ApiError> {
        let data: ImportStatusData = self
            .gql
            .request(
                "ImportStatus",
                IMPORT_STATUS_QUERY,
                serde_json::json!({ "importId": import_id }),
            )
            .await?;
        Ok(data.import)
    }

    async fn upload_archive(&self, uri: &str, bytes: Vec<u8>) -> Result<(), ApiError> {
        // The destination is pre-authorized; the PUT carries no bearer token.
        let response = self
            .gql
            .http
            .put(uri)
            .header(CONTENT_LENGTH, bytes.len())
            .body(bytes)
            .send()
            .await?;
        if !response.status().is_success() {
            // The import job reports ingest failures; the transfer status is
            // informational only.
            warn!(status = %response.status(), "Archive transfer returned non-success status");
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectApi for ProjectClient {
    async fn list_api_keys(&self) -> Result<Vec<ApiKeyRecord>, ApiError> {
        let data: ApiKeyListData = self
            .gql
            .request("ApiKeyList", API_KEY_LIST_QUERY, serde_json::json!({}))
            .await?;
        Ok(data.api_keys)
    }

    async fn create_api_key(&self, name: &str, role: KeyRole) -> Result<String, ApiError> {
        let data: CreateApiKeyData = self
            .gql
            .request(
                "CreateApiKey",
                CREATE_API_KEY_MUTATION,
                serde_json::json!({ "name": name, "role": role }),
            )
            .await?;
        Ok(data.key.api_key)
    }

    async fn push_schema(&self, body: Vec<u8>) -> Result<(), ApiError> {
        let response = self
            .gql
            .http
            .post(&self.schema_url)
            .bearer_auth(&self.gql.token)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        if !response.status().is_success() {
            warn!(status = %response.status(), "Schema push returned non-success status");
        }
        Ok(())
    }
}
