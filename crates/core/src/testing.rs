//! In-memory implementations of the service boundaries for tests.
//!
//! Enabled for this crate's own tests and, for downstream crates, through the
//! `test-support` feature.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::customer::{Customer, NewCustomer};
use crate::error::CoreError;
use crate::password::PasswordHasher;
use crate::storage::{ObjectStorage, StorageError};
use crate::store::CustomerStore;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Vec-backed [`CustomerStore`] that enforces the unique-email constraint.
#[derive(Default)]
pub struct MemoryCustomerStore {
    rows: Mutex<Vec<Customer>>,
    next_id: Mutex<DbId>,
}

impl MemoryCustomerStore {
    /// Snapshot of a stored row.
    pub fn get(&self, id: DbId) -> Option<Customer> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }
}

#[async_trait]
impl CustomerStore for MemoryCustomerStore {
    async fn list(&self) -> Result<Vec<Customer>, CoreError> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Customer>, CoreError> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, CoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn exists_by_id(&self, id: DbId) -> Result<bool, CoreError> {
        Ok(self.get(id).is_some())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, CoreError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn insert(&self, input: &NewCustomer) -> Result<Customer, CoreError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|c| c.email == input.email) {
            return Err(CoreError::Conflict("email already taken".into()));
        }

        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;

        let now = chrono::Utc::now();
        let customer = Customer {
            id: *next_id,
            name: input.name.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            age: input.age,
            gender: input.gender,
            profile_image_id: None,
            created_at: now,
            updated_at: now,
        };
        rows.push(customer.clone());
        Ok(customer)
    }

    async fn update(&self, customer: &Customer) -> Result<Option<Customer>, CoreError> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|c| c.id != customer.id && c.email == customer.email)
        {
            return Err(CoreError::Conflict("email already taken".into()));
        }

        let Some(row) = rows.iter_mut().find(|c| c.id == customer.id) else {
            return Ok(None);
        };
        row.name = customer.name.clone();
        row.email = customer.email.clone();
        row.age = customer.age;
        row.updated_at = chrono::Utc::now();
        Ok(Some(row.clone()))
    }

    async fn set_profile_image_id(
        &self,
        id: DbId,
        profile_image_id: &str,
    ) -> Result<bool, CoreError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|c| c.id == id) else {
            return Ok(false);
        };
        row.profile_image_id = Some(profile_image_id.to_string());
        row.updated_at = chrono::Utc::now();
        Ok(true)
    }

    async fn delete(&self, id: DbId) -> Result<bool, CoreError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|c| c.id != id);
        Ok(rows.len() < before)
    }
}

// ---------------------------------------------------------------------------
// Object storage
// ---------------------------------------------------------------------------

/// HashMap-backed [`ObjectStorage`] that reads and writes the local paths it
/// is handed, like a real transfer would.
#[derive(Default)]
pub struct MemoryObjectStorage {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    last_local_path: Mutex<Option<PathBuf>>,
    fail: AtomicBool,
}

impl MemoryObjectStorage {
    /// Make every subsequent transfer fail (or succeed again).
    pub fn fail_transfers(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// All `(bucket, key)` pairs currently stored.
    pub fn keys(&self) -> Vec<(String, String)> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    /// Stored bytes of an object.
    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Local path used by the most recent transfer attempt.
    pub fn last_local_path(&self) -> Option<PathBuf> {
        self.last_local_path.lock().unwrap().clone()
    }

    fn record(&self, bucket: &str, key: &str, path: &Path) -> Result<(), StorageError> {
        *self.last_local_path.lock().unwrap() = Some(path.to_path_buf());
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Transfer {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn upload(&self, bucket: &str, key: &str, source: &Path) -> Result<String, StorageError> {
        self.record(bucket, key, source)?;
        let bytes = tokio::fs::read(source).await?;
        let etag = format!("\"{}\"", bytes.len());
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), bytes);
        Ok(etag)
    }

    async fn download(
        &self,
        bucket: &str,
        key: &str,
        destination: &Path,
    ) -> Result<u64, StorageError> {
        self.record(bucket, key, destination)?;
        let bytes = self.object(bucket, key).ok_or_else(|| StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })?;
        tokio::fs::write(destination, &bytes).await?;
        Ok(bytes.len() as u64)
    }
}

// ---------------------------------------------------------------------------
// Password hashing
// ---------------------------------------------------------------------------

/// Cheap reversible "hash" for tests that do not exercise the real algorithm.
pub struct PrefixHasher;

const PREFIX: &str = "plain$";

impl PasswordHasher for PrefixHasher {
    fn hash(&self, password: &str) -> Result<String, CoreError> {
        Ok(format!("{PREFIX}{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CoreError> {
        Ok(hash.strip_prefix(PREFIX) == Some(password))
    }
}
