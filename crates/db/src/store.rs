//! [`CustomerStore`] backed by PostgreSQL.

use async_trait::async_trait;
use crm_core::customer::{Customer, NewCustomer};
use crm_core::error::CoreError;
use crm_core::store::CustomerStore;
use crm_core::types::DbId;

use crate::models::customer::CustomerRow;
use crate::repositories::CustomerRepo;
use crate::DbPool;

/// Delegates to [`CustomerRepo`] and converts rows and errors into domain terms.
#[derive(Clone)]
pub struct PgCustomerStore {
    pool: DbPool,
}

impl PgCustomerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn list(&self) -> Result<Vec<Customer>, CoreError> {
        let rows = CustomerRepo::list(&self.pool).await.map_err(classify)?;
        rows.into_iter().map(Customer::try_from).collect()
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Customer>, CoreError> {
        let row = CustomerRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify)?;
        row.map(Customer::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, CoreError> {
        let row = CustomerRepo::find_by_email(&self.pool, email)
            .await
            .map_err(classify)?;
        row.map(Customer::try_from).transpose()
    }

    async fn exists_by_id(&self, id: DbId) -> Result<bool, CoreError> {
        CustomerRepo::exists_by_id(&self.pool, id)
            .await
            .map_err(classify)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, CoreError> {
        CustomerRepo::exists_by_email(&self.pool, email)
            .await
            .map_err(classify)
    }

    async fn insert(&self, input: &NewCustomer) -> Result<Customer, CoreError> {
        let row: CustomerRow = CustomerRepo::create(&self.pool, input)
            .await
            .map_err(classify)?;
        Customer::try_from(row)
    }

    async fn update(&self, customer: &Customer) -> Result<Option<Customer>, CoreError> {
        let row = CustomerRepo::update(
            &self.pool,
            customer.id,
            &customer.name,
            &customer.email,
            customer.age,
        )
        .await
        .map_err(classify)?;
        row.map(Customer::try_from).transpose()
    }

    async fn set_profile_image_id(
        &self,
        id: DbId,
        profile_image_id: &str,
    ) -> Result<bool, CoreError> {
        CustomerRepo::update_profile_image_id(&self.pool, id, profile_image_id)
            .await
            .map_err(classify)
    }

    async fn delete(&self, id: DbId) -> Result<bool, CoreError> {
        CustomerRepo::delete(&self.pool, id).await.map_err(classify)
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(classify)
    }
}

/// Map a sqlx error onto the domain error taxonomy.
///
/// - Unique constraint violations (SQLSTATE 23505 on a `uq_` constraint) become
///   [`CoreError::Conflict`], which covers two requests racing for one email.
/// - Everything else becomes [`CoreError::Internal`] and is logged here.
fn classify(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint == "uq_customers_email" {
                return CoreError::Conflict("email already taken".into());
            }
            if constraint.starts_with("uq_") {
                return CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Internal(format!("Database error: {err}"))
}
