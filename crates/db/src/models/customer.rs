//! Customer row model.

use crm_core::customer::{Customer, Gender};
use crm_core::error::CoreError;
use crm_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full row from the `customers` table.
///
/// `gender` is stored as text (`MALE` / `FEMALE`) and parsed on conversion.
#[derive(Debug, Clone, FromRow)]
pub struct CustomerRow {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    pub gender: String,
    pub profile_image_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = CoreError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        Ok(Customer {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            age: row.age,
            gender: Gender::from_name(&row.gender)?,
            profile_image_id: row.profile_image_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
