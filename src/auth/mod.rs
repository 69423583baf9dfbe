//! Azure AD authentication module.
//!
//! Provides OAuth2 client credentials authentication with cached token reuse.

pub mod credentials;

pub use credentials::CredentialProvider;
