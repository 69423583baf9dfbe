//! Microsoft Graph API client for account and role-membership operations.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, error, info};

use super::models::{
    CreatedUser, DirectoryRole, DirectoryUser, NewUser, ODataError, ODataListResponse,
};
use crate::auth::CredentialProvider;
use crate::config::Config;
use crate::error::{ApiError, GraphError};

/// HTTP request timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP connection timeout.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Page size for user listing requests.
const USER_PAGE_SIZE: u32 = 999;

/// Microsoft Graph API client.
///
/// Attaches a bearer token from the credential provider to every request.
pub struct GraphClient {
    http_client: Client,
    credentials: Arc<CredentialProvider>,
    base_url: String,
}

impl GraphClient {
    /// Create a new Graph client.
    pub fn new(config: &Config, credentials: Arc<CredentialProvider>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            credentials,
            base_url: config.api.graph_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// List all users in the tenant, following every result page.
    pub async fn list_users(&self) -> Result<Vec<DirectoryUser>, GraphError> {
        let mut url = format!(
            "{}/users?$select=id,displayName,userPrincipalName,mail&$top={}",
            self.base_url, USER_PAGE_SIZE
        );

        let mut users = Vec::new();

        loop {
            debug!("Fetching users page: {}", url);
            let page: ODataListResponse<DirectoryUser> = self.get_json(&url).await?;
            users.extend(page.value);

            match page.next_link {
                Some(next) => url = next,
                None => break,
            }
        }

        debug!("Fetched {} directory users", users.len());
        Ok(users)
    }

    /// Create a user account.
    pub async fn create_user(&self, new_user: &NewUser) -> Result<CreatedUser, GraphError> {
        let url = format!("{}/users", self.base_url);

        info!("Creating user {}", new_user.user_principal_name);

        let token = self.credentials.get_token().await?;
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(new_user)
            .send()
            .await
            .map_err(|e| ApiError::GraphRequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await.into());
        }

        let created: CreatedUser = response
            .json()
            .await
            .map_err(|e| ApiError::ParseFailed(e.to_string()))?;

        info!("User created with id {}", created.id);
        Ok(created)
    }

    /// Look up an activated directory role by exact display name.
    ///
    /// Returns the first match when display names are not unique, `None` when
    /// the catalog has no match.
    pub async fn find_role_by_name(
        &self,
        display_name: &str,
    ) -> Result<Option<DirectoryRole>, GraphError> {
        // Single quotes in OData string literals are escaped by doubling.
        let filter = format!("displayName eq '{}'", display_name.replace('\'', "''"));
        let url = format!(
            "{}/directoryRoles?$filter={}",
            self.base_url,
            urlencoding::encode(&filter)
        );

        debug!("Looking up directory role {:?}", display_name);
        let page: ODataListResponse<DirectoryRole> = self.get_json(&url).await?;

        Ok(page.value.into_iter().next())
    }

    /// Add an account to a directory role by object id.
    pub async fn add_role_member(&self, role_id: &str, user_id: &str) -> Result<(), GraphError> {
        let url = format!("{}/directoryRoles/{}/members/$ref", self.base_url, role_id);
        let body = serde_json::json!({
            "@odata.id": format!("{}/directoryObjects/{}", self.base_url, user_id)
        });

        info!("Adding user {} to role {}", user_id, role_id);

        let token = self.credentials.get_token().await?;
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::GraphRequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await.into());
        }

        Ok(())
    }

    /// Perform a GET request and deserialize the JSON response.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, GraphError> {
        let token = self.credentials.get_token().await?;

        let response = self
            .http_client
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| ApiError::GraphRequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await.into());
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::ParseFailed(e.to_string()).into())
    }

    /// Classify a non-success response.
    async fn error_from_response(response: reqwest::Response) -> ApiError {
        let status = response.status();
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            429 => ApiError::RateLimited,
            _ => {
                let body = response.text().await.unwrap_or_default();
                error!("Graph request failed: HTTP {} - {}", status, body);

                if let Ok(odata) = serde_json::from_str::<ODataError>(&body) {
                    ApiError::Graph {
                        code: odata.error.code,
                        message: odata.error.message,
                    }
                } else {
                    ApiError::GraphRequestFailed(format!("HTTP {}", status.as_u16()))
                }
            }
        }
    }
}
