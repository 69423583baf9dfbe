//! Microsoft Graph API surface used by the bulk import.
//!
//! A thin call layer over the account and role-membership operations:
//! user listing, user creation, role lookup, role member addition.

pub mod client;
pub mod models;

pub use client::GraphClient;
pub use models::{CreatedUser, DirectoryRole, DirectoryUser, NewUser, PasswordProfile};
