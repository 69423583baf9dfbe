//! Graph API data models for accounts and directory roles.

use serde::{Deserialize, Serialize};

/// A user as returned by the directory's account listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    /// Directory-assigned object id.
    pub id: String,

    /// User's display name.
    pub display_name: Option<String>,

    /// User Principal Name, the unique login identifier.
    pub user_principal_name: Option<String>,

    /// User's email address.
    pub mail: Option<String>,
}

/// Request body for user creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Whether the account is enabled. Always true for bulk-imported accounts.
    pub account_enabled: bool,

    /// Display name.
    pub display_name: String,

    /// Mail nickname (username portion before @).
    pub mail_nickname: String,

    /// User principal name (must be unique in tenant).
    pub user_principal_name: String,

    /// Password profile.
    pub password_profile: PasswordProfile,
}

/// Password profile for user creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordProfile {
    /// The initial password.
    pub password: String,

    /// Whether the user must change password on next sign-in.
    pub force_change_password_next_sign_in: bool,
}

/// Response body from a successful user creation.
///
/// The `id` is the directory-assigned object id; role assignment must
/// reference this id, not the principal name.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUser {
    pub id: String,
    pub display_name: Option<String>,
    pub user_principal_name: Option<String>,
    pub mail: Option<String>,
}

impl CreatedUser {
    /// Get the best available display name.
    pub fn display_name_or_upn(&self) -> String {
        self.display_name
            .clone()
            .or_else(|| self.user_principal_name.clone())
            .unwrap_or_else(|| self.id.clone())
    }

    /// Get the best available email.
    pub fn email_or_upn(&self) -> String {
        self.mail
            .clone()
            .or_else(|| self.user_principal_name.clone())
            .unwrap_or_else(|| "no mail".to_string())
    }
}

/// An activated directory role.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryRole {
    pub id: String,
    pub display_name: String,
}

/// Response wrapper for paginated Graph API list responses.
#[derive(Debug, Deserialize)]
pub struct ODataListResponse<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// `OData` error response from Microsoft Graph.
#[derive(Debug, Deserialize)]
pub struct ODataError {
    pub error: ODataErrorBody,
}

/// `OData` error body.
#[derive(Debug, Deserialize)]
pub struct ODataErrorBody {
    pub code: String,
    pub message: String,
}
