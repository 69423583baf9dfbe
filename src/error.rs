//! Error types for the bulk import application.
//!
//! Uses `thiserror` for library-style errors with automatic `Display` and `Error` implementations.
//!
//! The split matters for control flow: an [`AppError`] aborts the whole run
//! (configuration, authentication, input file I/O), while a [`RecordError`]
//! is caught at the record boundary and the run continues with the next record.

use thiserror::Error;

/// Top-level application error type. Fatal for the run.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Token acquisition errors. Always fatal: no record is processed without a credential.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token request failed: {0}")]
    TokenRequestFailed(String),

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),
}

/// Graph API errors.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Graph API request failed: {0}")]
    GraphRequestFailed(String),

    #[error("Failed to parse API response: {0}")]
    ParseFailed(String),

    #[error("Unauthorized (401): Token may be expired")]
    Unauthorized,

    #[error("Forbidden (403): Insufficient permissions")]
    Forbidden,

    #[error("Rate limited (429): Too many requests")]
    RateLimited,

    #[error("Graph API error {code}: {message}")]
    Graph { code: String, message: String },
}

/// Errors surfaced by directory calls. The split drives the orchestrator's
/// control flow: an authentication failure aborts the run, any other API
/// failure is confined to the current record.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<GraphError> for AppError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Auth(e) => AppError::Auth(e),
            GraphError::Api(e) => AppError::Api(e),
        }
    }
}

/// A malformed input line.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected 5 comma-separated fields, found {found}")]
    FieldCount { found: usize },

    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("invalid mail nickname {0:?}")]
    InvalidMailNickname(String),

    #[error("invalid user principal name {0:?}")]
    InvalidPrincipalName(String),
}

/// A failure confined to a single record. Never propagates past the orchestrator.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("malformed input line: {0}")]
    Parse(#[from] ParseError),

    #[error("existence check failed: {0}")]
    ExistenceCheck(ApiError),

    #[error("account creation failed: {0}")]
    Create(ApiError),

    /// The account exists in the directory at this point. Operators must be
    /// told so they can retry the role assignment manually.
    #[error("account {user_id} was created, but role assignment failed: {source}")]
    AssignRole { user_id: String, source: ApiError },
}

impl RecordError {
    /// Returns the directory id of an account this failure left behind, if any.
    pub fn created_account_id(&self) -> Option<&str> {
        match self {
            Self::AssignRole { user_id, .. } => Some(user_id),
            _ => None,
        }
    }
}
