//! Common test utilities for the bulk import integration tests.
//!
//! Everything runs against a wiremock server standing in for both the
//! Azure AD token endpoint and the Graph API.

#![allow(dead_code)] // not every test binary uses every helper

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use entra_bulk_import::auth::CredentialProvider;
use entra_bulk_import::config::{
    ApiConfig, AppConfig, Config, EntraConfig, ImportConfig, LoggingConfig, TokenConfig,
};
use entra_bulk_import::graph::GraphClient;
use entra_bulk_import::import::BulkImporter;

pub const TENANT_ID: &str = "test-tenant";

/// Configuration pointing every endpoint at the mock server.
pub fn test_config(server_url: &str) -> Config {
    Config {
        app: AppConfig {
            name: "entra-bulk-import".into(),
        },
        entra: EntraConfig {
            tenant_id: TENANT_ID.into(),
            client_id: "test-client".into(),
            client_secret: "test-secret".into(),
        },
        api: ApiConfig {
            graph_base_url: format!("{}/v1.0", server_url),
            login_base_url: server_url.to_string(),
        },
        import: ImportConfig {
            csv_path: "unused.csv".into(),
        },
        token: TokenConfig {
            refresh_before_expiry_seconds: 300,
        },
        logging: LoggingConfig {
            level: "info".into(),
        },
    }
}

/// Builds an importer whose token and Graph calls hit the mock server.
pub fn importer(config: &Config) -> BulkImporter {
    let credentials = Arc::new(CredentialProvider::new(config).expect("credential provider"));
    let graph = Arc::new(GraphClient::new(config, credentials).expect("graph client"));
    BulkImporter::new(graph)
}

/// Sets up the OAuth token endpoint.
pub async fn mock_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/{}/oauth2/v2.0/token", TENANT_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "mock-access-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

/// Test data factory for a user as the listing returns it.
pub fn directory_user(id: &str, upn: &str) -> Value {
    json!({
        "id": id,
        "displayName": format!("User {}", id),
        "userPrincipalName": upn,
        "mail": upn
    })
}

/// Test data factory for a user-creation response.
pub fn created_user(id: &str, upn: &str, display_name: &str) -> Value {
    json!({
        "id": id,
        "displayName": display_name,
        "userPrincipalName": upn,
        "mail": upn
    })
}

/// Test data factory for a directory role.
pub fn directory_role(id: &str, name: &str) -> Value {
    json!({ "id": id, "displayName": name })
}

/// Wraps items in an OData list response.
pub fn odata_response(items: Vec<Value>, next_link: Option<String>) -> Value {
    let mut response = json!({ "value": items });
    if let Some(link) = next_link {
        response["@odata.nextLink"] = json!(link);
    }
    response
}

/// An OData error body.
pub fn odata_error(code: &str, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message } })
}

/// Sets up the users listing endpoint with a single page.
pub async fn mock_users_list(server: &MockServer, users: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/v1.0/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(odata_response(users, None)))
        .mount(server)
        .await;
}

/// Sets up the role catalog lookup for a given filter result.
pub async fn mock_role_lookup(server: &MockServer, roles: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/v1.0/directoryRoles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(odata_response(roles, None)))
        .mount(server)
        .await;
}
