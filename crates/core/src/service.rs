//! Customer business logic.
//!
//! [`CustomerService`] is the only place that decides *whether* a change is
//! allowed. It talks to persistence through [`CustomerStore`], to object
//! storage through [`ObjectStorage`], and hashes passwords through
//! [`PasswordHasher`], so it can be exercised without a database or bucket.
//!
//! Profile images are staged through a transient local file on both upload and
//! download. The file is a [`NamedTempFile`], so it is removed when it goes out
//! of scope on every exit path.

use std::sync::Arc;

use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::customer::{CustomerDto, CustomerRegistration, CustomerUpdate, NewCustomer};
use crate::error::CoreError;
use crate::password::PasswordHasher;
use crate::storage::{profile_image_key, ObjectStorage, StorageError};
use crate::store::CustomerStore;
use crate::types::DbId;

const CUSTOMER: &str = "Customer";
const PROFILE_IMAGE: &str = "Profile image for customer";

/// Orchestrates customer CRUD, credential checks, and profile-image transfers.
pub struct CustomerService {
    store: Arc<dyn CustomerStore>,
    storage: Arc<dyn ObjectStorage>,
    hasher: Arc<dyn PasswordHasher>,
    bucket: String,
}

impl CustomerService {
    pub fn new(
        store: Arc<dyn CustomerStore>,
        storage: Arc<dyn ObjectStorage>,
        hasher: Arc<dyn PasswordHasher>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            store,
            storage,
            hasher,
            bucket: bucket.into(),
        }
    }

    /// `true` when the customer store answers.
    pub async fn store_healthy(&self) -> bool {
        self.store.health_check().await.is_ok()
    }

    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    pub async fn list_customers(&self) -> Result<Vec<CustomerDto>, CoreError> {
        let customers = self.store.list().await?;
        Ok(customers.iter().map(CustomerDto::from).collect())
    }

    pub async fn get_customer(&self, id: DbId) -> Result<CustomerDto, CoreError> {
        self.store
            .find_by_id(id)
            .await?
            .map(|customer| CustomerDto::from(&customer))
            .ok_or(CoreError::NotFound {
                entity: CUSTOMER,
                id,
            })
    }

    /// Register a new customer with a hashed password.
    pub async fn register(&self, request: CustomerRegistration) -> Result<CustomerDto, CoreError> {
        if self.store.exists_by_email(&request.email).await? {
            return Err(CoreError::Conflict("email already taken".into()));
        }
        request.validate()?;

        let password_hash = self.hasher.hash(&request.password)?;
        let input = NewCustomer {
            name: request.name,
            email: request.email,
            password_hash,
            age: request.age,
            gender: request.gender,
        };

        let customer = self.store.insert(&input).await?;
        tracing::info!(customer_id = customer.id, "Customer registered");
        Ok(CustomerDto::from(&customer))
    }

    pub async fn delete_customer(&self, id: DbId) -> Result<(), CoreError> {
        if !self.store.exists_by_id(id).await? {
            return Err(CoreError::NotFound {
                entity: CUSTOMER,
                id,
            });
        }

        self.store.delete(id).await?;
        tracing::info!(customer_id = id, "Customer deleted");
        Ok(())
    }

    /// Apply a partial update.
    ///
    /// Each field is staged independently and only when it differs from the
    /// stored value. The email uniqueness check runs only for a staged email.
    /// A request that stages nothing is rejected.
    pub async fn update_customer(
        &self,
        id: DbId,
        update: CustomerUpdate,
    ) -> Result<CustomerDto, CoreError> {
        let mut customer = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: CUSTOMER,
                id,
            })?;

        let staged = update.stage(&customer);

        if let Some(email) = &staged.email {
            if self.store.exists_by_email(email).await? {
                return Err(CoreError::Conflict("email already taken".into()));
            }
        }

        if staged.is_empty() {
            return Err(CoreError::Validation("no data changes found".into()));
        }
        staged.validate()?;

        staged.apply(&mut customer);
        let updated = self
            .store
            .update(&customer)
            .await?
            .ok_or(CoreError::NotFound {
                entity: CUSTOMER,
                id,
            })?;

        tracing::info!(customer_id = id, "Customer updated");
        Ok(CustomerDto::from(&updated))
    }

    // -----------------------------------------------------------------------
    // Authentication
    // -----------------------------------------------------------------------

    /// Check an email/password pair, returning the customer on success.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<CustomerDto, CoreError> {
        let invalid = || CoreError::Unauthorized("Invalid username or password".into());

        let customer = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(invalid)?;

        if !self.hasher.verify(password, &customer.password_hash)? {
            tracing::debug!(customer_id = customer.id, "Password mismatch");
            return Err(invalid());
        }

        Ok(CustomerDto::from(&customer))
    }

    // -----------------------------------------------------------------------
    // Profile images
    // -----------------------------------------------------------------------

    /// Store `content` as the customer's new profile image.
    ///
    /// The customer row is written only after the upload succeeds, so a failed
    /// transfer leaves the previous image id in place. Superseded objects are
    /// not deleted. Returns the new image id.
    pub async fn upload_profile_image(
        &self,
        id: DbId,
        content: &[u8],
    ) -> Result<String, CoreError> {
        if !self.store.exists_by_id(id).await? {
            return Err(CoreError::NotFound {
                entity: CUSTOMER,
                id,
            });
        }
        if content.is_empty() {
            return Err(CoreError::Validation("Profile image must not be empty".into()));
        }

        let profile_image_id = Uuid::new_v4().to_string();
        let key = profile_image_key(id, &profile_image_id);

        let staged = stage_file("upload-")?;
        tokio::fs::write(staged.path(), content)
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to stage upload: {e}")))?;

        let etag = self
            .storage
            .upload(&self.bucket, &key, staged.path())
            .await
            .map_err(|e| transfer_failure("upload", e))?;

        if let Err(e) = staged.close() {
            tracing::warn!(error = %e, "Failed to remove staged upload file");
        }

        if !self
            .store
            .set_profile_image_id(id, &profile_image_id)
            .await?
        {
            return Err(CoreError::NotFound {
                entity: CUSTOMER,
                id,
            });
        }

        tracing::info!(customer_id = id, %key, %etag, "Profile image uploaded");
        Ok(profile_image_id)
    }

    /// Fetch the bytes of the customer's current profile image.
    pub async fn download_profile_image(&self, id: DbId) -> Result<Vec<u8>, CoreError> {
        let customer = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: CUSTOMER,
                id,
            })?;

        let profile_image_id = customer.active_profile_image().ok_or(CoreError::NotFound {
            entity: PROFILE_IMAGE,
            id,
        })?;
        let key = profile_image_key(id, profile_image_id);

        let staged = stage_file("download-")?;
        let length = self
            .storage
            .download(&self.bucket, &key, staged.path())
            .await
            .map_err(|e| transfer_failure("download", e))?;

        let bytes = tokio::fs::read(staged.path())
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to read staged download: {e}")))?;

        tracing::debug!(customer_id = id, %key, length, "Profile image downloaded");
        Ok(bytes)
    }
}

/// Create a transient file that is deleted when dropped.
fn stage_file(prefix: &str) -> Result<NamedTempFile, CoreError> {
    tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".tmp")
        .tempfile()
        .map_err(|e| CoreError::Internal(format!("Failed to create staging file: {e}")))
}

fn transfer_failure(direction: &str, err: StorageError) -> CoreError {
    tracing::error!(error = %err, direction, "Profile image transfer failed");
    CoreError::Internal(format!("Failed to {direction} file: {err}"))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::customer::Gender;
    use crate::testing::{MemoryCustomerStore, MemoryObjectStorage, PrefixHasher};

    struct Fixture {
        service: CustomerService,
        store: Arc<MemoryCustomerStore>,
        storage: Arc<MemoryObjectStorage>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryCustomerStore::default());
        let storage = Arc::new(MemoryObjectStorage::default());
        let service = CustomerService::new(
            store.clone(),
            storage.clone(),
            Arc::new(PrefixHasher),
            "test-bucket",
        );
        Fixture {
            service,
            store,
            storage,
        }
    }

    fn registration(email: &str) -> CustomerRegistration {
        CustomerRegistration {
            name: "Alex".to_string(),
            email: email.to_string(),
            password: "password".to_string(),
            age: 30,
            gender: Gender::Male,
        }
    }

    async fn register(fx: &Fixture, email: &str) -> CustomerDto {
        fx.service
            .register(registration(email))
            .await
            .expect("registration should succeed")
    }

    // --- register / get / delete ---

    #[tokio::test]
    async fn register_hashes_password() {
        let fx = fixture();
        let dto = register(&fx, "a@x.com").await;

        let stored = fx.store.get(dto.id).expect("row exists");
        assert_ne!(stored.password_hash, "password");
        assert_eq!(stored.email, "a@x.com");
    }

    #[tokio::test]
    async fn register_duplicate_email_conflicts() {
        let fx = fixture();
        register(&fx, "a@x.com").await;

        let result = fx.service.register(registration("a@x.com")).await;
        assert_matches!(result, Err(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn get_missing_customer_is_not_found() {
        let fx = fixture();
        let result = fx.service.get_customer(99).await;
        assert_matches!(result, Err(CoreError::NotFound { id: 99, .. }));
    }

    #[tokio::test]
    async fn delete_missing_customer_is_not_found() {
        let fx = fixture();
        let result = fx.service.delete_customer(99).await;
        assert_matches!(result, Err(CoreError::NotFound { id: 99, .. }));
    }

    #[tokio::test]
    async fn delete_removes_customer() {
        let fx = fixture();
        let dto = register(&fx, "a@x.com").await;

        fx.service.delete_customer(dto.id).await.unwrap();
        assert!(fx.store.get(dto.id).is_none());
    }

    #[tokio::test]
    async fn list_returns_all_customers() {
        let fx = fixture();
        register(&fx, "a@x.com").await;
        register(&fx, "b@x.com").await;

        let customers = fx.service.list_customers().await.unwrap();
        let emails: Vec<_> = customers.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(emails, ["a@x.com", "b@x.com"]);
    }

    // --- update ---

    #[tokio::test]
    async fn update_with_no_fields_is_rejected() {
        let fx = fixture();
        let dto = register(&fx, "a@x.com").await;

        let result = fx
            .service
            .update_customer(dto.id, CustomerUpdate::default())
            .await;
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg == "no data changes found");
    }

    #[tokio::test]
    async fn update_with_identical_values_is_rejected() {
        let fx = fixture();
        let dto = register(&fx, "a@x.com").await;

        let update = CustomerUpdate {
            name: Some("Alex".to_string()),
            age: Some(30),
            email: Some("a@x.com".to_string()),
        };
        let result = fx.service.update_customer(dto.id, update).await;
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn update_email_to_unused_address() {
        let fx = fixture();
        let dto = register(&fx, "a@x.com").await;

        let update = CustomerUpdate {
            email: Some("b@x.com".to_string()),
            ..Default::default()
        };
        let updated = fx.service.update_customer(dto.id, update).await.unwrap();

        assert_eq!(updated.email, "b@x.com");
        assert_eq!(fx.store.get(dto.id).unwrap().email, "b@x.com");
    }

    #[tokio::test]
    async fn update_email_owned_by_another_customer_conflicts() {
        let fx = fixture();
        let dto = register(&fx, "a@x.com").await;
        register(&fx, "b@x.com").await;

        let update = CustomerUpdate {
            name: Some("Renamed".to_string()),
            email: Some("b@x.com".to_string()),
            ..Default::default()
        };
        let result = fx.service.update_customer(dto.id, update).await;

        assert_matches!(result, Err(CoreError::Conflict(_)));
        let stored = fx.store.get(dto.id).unwrap();
        assert_eq!(stored.name, "Alex", "nothing is written on conflict");
    }

    #[tokio::test]
    async fn update_own_email_is_ignored_for_that_field() {
        let fx = fixture();
        let dto = register(&fx, "a@x.com").await;

        let update = CustomerUpdate {
            age: Some(41),
            email: Some("a@x.com".to_string()),
            ..Default::default()
        };
        let updated = fx.service.update_customer(dto.id, update).await.unwrap();

        assert_eq!(updated.age, 41);
        assert_eq!(updated.email, "a@x.com");
    }

    #[tokio::test]
    async fn update_missing_customer_is_not_found() {
        let fx = fixture();
        let update = CustomerUpdate {
            age: Some(41),
            ..Default::default()
        };
        let result = fx.service.update_customer(5, update).await;
        assert_matches!(result, Err(CoreError::NotFound { id: 5, .. }));
    }

    // --- authenticate ---

    #[tokio::test]
    async fn authenticate_checks_password() {
        let fx = fixture();
        let dto = register(&fx, "a@x.com").await;

        let ok = fx.service.authenticate("a@x.com", "password").await.unwrap();
        assert_eq!(ok.id, dto.id);

        let wrong = fx.service.authenticate("a@x.com", "nope").await;
        assert_matches!(wrong, Err(CoreError::Unauthorized(_)));

        let unknown = fx.service.authenticate("ghost@x.com", "password").await;
        assert_matches!(unknown, Err(CoreError::Unauthorized(_)));
    }

    // --- profile images ---

    #[tokio::test]
    async fn upload_for_missing_customer_is_not_found() {
        let fx = fixture();
        let result = fx.service.upload_profile_image(3, b"jpeg").await;
        assert_matches!(result, Err(CoreError::NotFound { id: 3, .. }));
        assert!(fx.storage.keys().is_empty());
    }

    #[tokio::test]
    async fn upload_records_new_image_id() {
        let fx = fixture();
        let dto = register(&fx, "a@x.com").await;

        let first = fx.service.upload_profile_image(dto.id, b"one").await.unwrap();
        let second = fx.service.upload_profile_image(dto.id, b"two").await.unwrap();

        assert!(!second.is_empty());
        assert_ne!(first, second);
        assert_eq!(
            fx.store.get(dto.id).unwrap().profile_image_id.as_deref(),
            Some(second.as_str())
        );

        // Superseded objects stay in the bucket.
        let keys = fx.storage.keys();
        assert!(keys.contains(&("test-bucket".to_string(), profile_image_key(dto.id, &first))));
        assert!(keys.contains(&("test-bucket".to_string(), profile_image_key(dto.id, &second))));
    }

    #[tokio::test]
    async fn upload_removes_staged_file() {
        let fx = fixture();
        let dto = register(&fx, "a@x.com").await;

        fx.service.upload_profile_image(dto.id, b"jpeg").await.unwrap();

        let staged = fx.storage.last_local_path().expect("transfer recorded");
        assert!(!staged.exists(), "staged upload file must be removed");
    }

    #[tokio::test]
    async fn failed_upload_leaves_customer_untouched() {
        let fx = fixture();
        let dto = register(&fx, "a@x.com").await;
        fx.storage.fail_transfers(true);

        let result = fx.service.upload_profile_image(dto.id, b"jpeg").await;

        assert_matches!(result, Err(CoreError::Internal(_)));
        assert_eq!(fx.store.get(dto.id).unwrap().profile_image_id, None);
        let staged = fx.storage.last_local_path().expect("transfer attempted");
        assert!(!staged.exists(), "staged file must be removed on failure too");
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let fx = fixture();
        let dto = register(&fx, "a@x.com").await;

        let result = fx.service.upload_profile_image(dto.id, b"").await;
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn download_without_image_is_not_found() {
        let fx = fixture();
        let dto = register(&fx, "a@x.com").await;

        let result = fx.service.download_profile_image(dto.id).await;
        assert_matches!(
            result,
            Err(CoreError::NotFound {
                entity: PROFILE_IMAGE,
                ..
            })
        );
    }

    #[tokio::test]
    async fn download_returns_uploaded_bytes() {
        let fx = fixture();
        let dto = register(&fx, "a@x.com").await;
        fx.service
            .upload_profile_image(dto.id, b"\xff\xd8jpeg-bytes")
            .await
            .unwrap();

        let bytes = fx.service.download_profile_image(dto.id).await.unwrap();

        assert_eq!(bytes, b"\xff\xd8jpeg-bytes");
        let staged = fx.storage.last_local_path().expect("transfer recorded");
        assert!(!staged.exists(), "staged download file must be removed");
    }

    #[tokio::test]
    async fn failed_download_removes_staged_file() {
        let fx = fixture();
        let dto = register(&fx, "a@x.com").await;
        fx.service.upload_profile_image(dto.id, b"jpeg").await.unwrap();
        fx.storage.fail_transfers(true);

        let result = fx.service.download_profile_image(dto.id).await;

        assert_matches!(result, Err(CoreError::Internal(_)));
        let staged = fx.storage.last_local_path().expect("transfer attempted");
        assert!(!staged.exists());
    }
}
