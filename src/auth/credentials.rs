//! OAuth2 client credentials flow for Azure AD service principals.
//!
//! The provider exchanges the configured client id/secret for a bearer token
//! scoped to the Graph API's default scope, caches it, and transparently
//! re-acquires it when the token is within the expiry grace period.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::time::Duration as StdDuration;
use tokio::sync::RwLock;
use tracing::debug;
use zeroize::Zeroizing;

use crate::config::Config;
use crate::error::AuthError;

/// HTTP request timeout.
const HTTP_TIMEOUT: StdDuration = StdDuration::from_secs(30);
/// HTTP connection timeout.
const HTTP_CONNECT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Token response from Azure AD.
#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[allow(dead_code)]
    token_type: String,
}

/// Cached OAuth2 access token.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Returns true if the token is expired or will expire within the grace period.
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Acquires and caches bearer tokens for the directory API.
pub struct CredentialProvider {
    token_url: String,
    client_id: String,
    client_secret: Zeroizing<String>,
    scope: String,
    grace_period: Duration,
    http_client: reqwest::Client,
    cached_token: RwLock<Option<CachedToken>>,
}

impl CredentialProvider {
    /// Create a new credential provider from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            token_url: config.token_url(),
            client_id: config.entra.client_id.clone(),
            client_secret: config.entra.secret(),
            scope: config.graph_scope(),
            grace_period: Duration::seconds(config.token.refresh_before_expiry_seconds as i64),
            http_client,
            cached_token: RwLock::new(None),
        })
    }

    /// Get a valid access token, re-acquiring if the cached one is near expiry.
    pub async fn get_token(&self) -> Result<String, AuthError> {
        {
            let cache = self.cached_token.read().await;
            if let Some(ref token) = *cache {
                if !token.is_expired(self.grace_period) {
                    debug!("Using cached token");
                    return Ok(token.access_token.clone());
                }
            }
        }

        debug!("Acquiring access token");
        let new_token = self.acquire_token().await?;

        let access_token = new_token.access_token.clone();
        {
            let mut cache = self.cached_token.write().await;
            *cache = Some(new_token);
        }

        Ok(access_token)
    }

    /// Acquire a new access token using the client credentials flow.
    async fn acquire_token(&self) -> Result<CachedToken, AuthError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("grant_type", "client_credentials"),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::TokenRequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            // Log error details for debugging (doesn't expose to user)
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!("Token request failed: HTTP {} - {}", status, error_body);
            return Err(AuthError::TokenRequestFailed(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidTokenResponse(e.to_string()))?;

        let expires_at = Utc::now() + Duration::seconds(token_response.expires_in);
        debug!("Acquired token, expires at {}", expires_at);

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }
}
