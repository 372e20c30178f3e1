//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing behind [`crm_core::password::PasswordHasher`].
//! - [`jwt`] -- JWT access-token generation and validation.

pub mod jwt;
pub mod password;
