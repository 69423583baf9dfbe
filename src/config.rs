//! Configuration loading and management.
//!
//! Loads configuration from embedded config.toml with environment variable overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use url::Url;
use zeroize::Zeroizing;

/// Embedded configuration file content.
const CONFIG_TOML: &str = include_str!("../config.toml");

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub entra: EntraConfig,
    pub api: ApiConfig,
    pub import: ImportConfig,
    pub token: TokenConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
}

/// Service-principal identity used for the client credentials flow.
#[derive(Debug, Clone, Deserialize)]
pub struct EntraConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl EntraConfig {
    /// The client secret, wrapped so it is wiped from memory on drop.
    pub fn secret(&self) -> Zeroizing<String> {
        Zeroizing::new(self.client_secret.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub graph_base_url: String,
    pub login_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub csv_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub refresh_before_expiry_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    /// Load configuration from embedded config.toml with environment variable overrides.
    pub fn load() -> Result<Self> {
        // Parse embedded config
        let mut config: Config =
            toml::from_str(CONFIG_TOML).context("Failed to parse embedded config.toml")?;

        // Apply environment variable overrides
        if let Ok(tenant_id) = env::var("AZURE_TENANT_ID") {
            config.entra.tenant_id = tenant_id;
        }

        if let Ok(client_id) = env::var("AZURE_CLIENT_ID") {
            config.entra.client_id = client_id;
        }

        if let Ok(client_secret) = env::var("AZURE_CLIENT_SECRET") {
            config.entra.client_secret = client_secret;
        }

        if let Ok(csv_path) = env::var("ENTRA_IMPORT_CSV") {
            config.import.csv_path = csv_path;
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            config.logging.level = log_level;
        }

        // Validate required fields
        config.validate()?;

        Ok(config)
    }

    /// Validate that required configuration is present.
    fn validate(&self) -> Result<()> {
        if self.entra.tenant_id.is_empty() || self.entra.tenant_id == "YOUR_TENANT_ID" {
            anyhow::bail!(
                "Azure AD tenant not configured. Set AZURE_TENANT_ID environment variable \
                 or update config.toml"
            );
        }

        if self.entra.client_id.is_empty() || self.entra.client_id == "YOUR_AZURE_AD_CLIENT_ID" {
            anyhow::bail!(
                "Azure AD client_id not configured. Set AZURE_CLIENT_ID environment variable \
                 or update config.toml"
            );
        }

        if self.entra.client_secret.is_empty()
            || self.entra.client_secret == "YOUR_AZURE_AD_CLIENT_SECRET"
        {
            anyhow::bail!(
                "Azure AD client_secret not configured. Set AZURE_CLIENT_SECRET environment \
                 variable or update config.toml"
            );
        }

        if self.import.csv_path.is_empty() {
            anyhow::bail!(
                "Input CSV path not configured. Set ENTRA_IMPORT_CSV or update config.toml"
            );
        }

        Url::parse(&self.api.graph_base_url).context("Invalid api.graph_base_url")?;
        Url::parse(&self.api.login_base_url).context("Invalid api.login_base_url")?;

        Ok(())
    }

    /// Get the token URL for the configured tenant.
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.api.login_base_url, self.entra.tenant_id
        )
    }

    /// Get the default scope for the Graph API resource.
    pub fn graph_scope(&self) -> String {
        let base = Url::parse(&self.api.graph_base_url).expect("validated at load");
        format!(
            "{}://{}/.default",
            base.scheme(),
            base.host_str().unwrap_or_default()
        )
    }
}
