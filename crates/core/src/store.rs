//! Persistence boundary for customer records.

use async_trait::async_trait;

use crate::customer::{Customer, NewCustomer};
use crate::error::CoreError;
use crate::types::DbId;

/// Storage-agnostic access to customer rows.
///
/// Implementations own consistency (transactions, unique constraints). A
/// unique-email violation raised by the backing store should surface as
/// [`CoreError::Conflict`]; any other backend failure as [`CoreError::Internal`].
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// All customers ordered by id.
    async fn list(&self) -> Result<Vec<Customer>, CoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Customer>, CoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, CoreError>;

    async fn exists_by_id(&self, id: DbId) -> Result<bool, CoreError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, CoreError>;

    async fn insert(&self, input: &NewCustomer) -> Result<Customer, CoreError>;

    /// Persist `name`, `email`, and `age` of an existing customer.
    ///
    /// Returns `None` if no row with `customer.id` exists.
    async fn update(&self, customer: &Customer) -> Result<Option<Customer>, CoreError>;

    /// Record the active profile image. Returns `true` if the row was updated.
    async fn set_profile_image_id(
        &self,
        id: DbId,
        profile_image_id: &str,
    ) -> Result<bool, CoreError>;

    /// Delete a customer. Returns `true` if a row was removed.
    async fn delete(&self, id: DbId) -> Result<bool, CoreError>;

    /// Confirm the backing store is reachable.
    async fn health_check(&self) -> Result<(), CoreError> {
        Ok(())
    }
}
