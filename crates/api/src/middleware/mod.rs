//! Authentication middleware extractors.
//!
//! - [`auth::AuthCustomer`] -- Extracts the authenticated customer from a JWT Bearer token.

pub mod auth;
