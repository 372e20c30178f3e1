//! Object storage backends implementing [`crm_core::storage::ObjectStorage`].
//!
//! - [`s3::S3Storage`] -- Amazon S3 or an S3-compatible endpoint.
//! - [`local::LocalStorage`] -- a directory tree on local disk, for development.

pub mod local;
pub mod s3;

pub use local::LocalStorage;
pub use s3::{S3Settings, S3Storage};
