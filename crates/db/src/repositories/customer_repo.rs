//! Repository for the `customers` table.

use crm_core::customer::NewCustomer;
use crm_core::types::DbId;
use sqlx::PgPool;

use crate::models::customer::CustomerRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, password_hash, age, gender, profile_image_id, \
                       created_at, updated_at";

/// Provides CRUD operations for customers.
pub struct CustomerRepo;

impl CustomerRepo {
    /// Insert a new customer, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewCustomer) -> Result<CustomerRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers (name, email, password_hash, age, gender)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CustomerRow>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.age)
            .bind(input.gender.name())
            .fetch_one(pool)
            .await
    }

    /// Find a customer by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CustomerRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = $1");
        sqlx::query_as::<_, CustomerRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a customer by email (case-sensitive).
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<CustomerRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE email = $1");
        sqlx::query_as::<_, CustomerRow>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List all customers ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<CustomerRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers ORDER BY id");
        sqlx::query_as::<_, CustomerRow>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn exists_by_id(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn exists_by_email(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM customers WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await
    }

    /// Overwrite `name`, `email`, and `age`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        name: &str,
        email: &str,
        age: i32,
    ) -> Result<Option<CustomerRow>, sqlx::Error> {
        let query = format!(
            "UPDATE customers SET name = $2, email = $3, age = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CustomerRow>(&query)
            .bind(id)
            .bind(name)
            .bind(email)
            .bind(age)
            .fetch_optional(pool)
            .await
    }

    /// Set the active profile image id. Returns `true` if the row was updated.
    pub async fn update_profile_image_id(
        pool: &PgPool,
        id: DbId,
        profile_image_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE customers SET profile_image_id = $2 WHERE id = $1")
            .bind(id)
            .bind(profile_image_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete a customer. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
