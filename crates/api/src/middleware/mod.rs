//! Request extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the entry owner from a JWT Bearer token.

pub mod auth;
