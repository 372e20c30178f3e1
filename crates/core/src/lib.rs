//! Customer domain: entity types, update staging, service boundaries, and the
//! [`service::CustomerService`] that ties them together.

pub mod customer;
pub mod error;
pub mod password;
pub mod service;
pub mod storage;
pub mod store;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;
