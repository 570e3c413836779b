//! Request extractors.
//!
//! - [`auth::AuthUser`] -- the caller identified by a JWT bearer token.

pub mod auth;
