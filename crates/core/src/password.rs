//! Password hashing boundary.

use crate::error::CoreError;

/// One-way password hashing used at registration and login.
///
/// Kept narrow so the service does not depend on a concrete algorithm.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing string.
    fn hash(&self, password: &str) -> Result<String, CoreError>;

    /// Return `Ok(true)` if `password` matches `hash`.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, CoreError>;
}
