//! Customer entity, registration input, and partial-update staging.
//!
//! A [`CustomerUpdate`] is never applied blindly: [`CustomerUpdate::stage`]
//! compares each supplied field against the current record and keeps only the
//! ones that actually differ. An empty [`StagedChanges`] means the request is a
//! no-op and must be rejected by the caller.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Role granted to every registered customer.
pub const ROLE_USER: &str = "ROLE_USER";

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Accepted age range (inclusive).
const MIN_AGE: i32 = 1;
const MAX_AGE: i32 = 150;

// ---------------------------------------------------------------------------
// Gender
// ---------------------------------------------------------------------------

/// Customer gender, stored as its upper-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse from the database `gender` column.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "MALE" => Ok(Self::Male),
            "FEMALE" => Ok(Self::Female),
            other => Err(CoreError::Validation(format!(
                "Unknown gender '{other}'. Must be one of: MALE, FEMALE"
            ))),
        }
    }

    /// Database name value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
        }
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// Full customer record as held by the store.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`CustomerDto`] for external-facing output.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    pub gender: Gender,
    pub profile_image_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Customer {
    /// The stored profile image id, treating a blank value as absent.
    pub fn active_profile_image(&self) -> Option<&str> {
        self.profile_image_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }
}

/// Safe customer representation for API responses (no password hash).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerDto {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub gender: Gender,
    pub age: i32,
    pub roles: Vec<String>,
    /// Login name; customers authenticate with their email.
    pub username: String,
    pub profile_image_id: Option<String>,
}

impl From<&Customer> for CustomerDto {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name.clone(),
            email: customer.email.clone(),
            gender: customer.gender,
            age: customer.age,
            roles: vec![ROLE_USER.to_string()],
            username: customer.email.clone(),
            profile_image_id: customer.profile_image_id.clone(),
        }
    }
}

/// Insert payload for a new customer. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    pub gender: Gender,
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Request body for registering a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub age: i32,
    pub gender: Gender,
}

impl CustomerRegistration {
    /// Check field-level rules. Email uniqueness is checked by the service.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("Name must not be blank".into()));
        }
        validate_email(&self.email)?;
        validate_age(self.age)?;
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(CoreError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
            )));
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

fn validate_age(age: i32) -> Result<(), CoreError> {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(CoreError::Validation(format!(
            "Age must be between {MIN_AGE} and {MAX_AGE}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Partial update
// ---------------------------------------------------------------------------

/// Request body for updating a customer. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub email: Option<String>,
}

/// The fields of a [`CustomerUpdate`] that differ from the current record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagedChanges {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub email: Option<String>,
}

impl CustomerUpdate {
    /// Compare each supplied field against `current`, keeping only real changes.
    pub fn stage(&self, current: &Customer) -> StagedChanges {
        StagedChanges {
            name: self
                .name
                .as_ref()
                .filter(|name| **name != current.name)
                .cloned(),
            age: self.age.filter(|age| *age != current.age),
            email: self
                .email
                .as_ref()
                .filter(|email| **email != current.email)
                .cloned(),
        }
    }
}

impl StagedChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.email.is_none()
    }

    /// Validate the staged values with the same rules as registration.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(CoreError::Validation("Name must not be blank".into()));
            }
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(age) = self.age {
            validate_age(age)?;
        }
        Ok(())
    }

    /// Write the staged values onto `customer`.
    pub fn apply(self, customer: &mut Customer) {
        if let Some(name) = self.name {
            customer.name = name;
        }
        if let Some(age) = self.age {
            customer.age = age;
        }
        if let Some(email) = self.email {
            customer.email = email;
        }
    }
}
