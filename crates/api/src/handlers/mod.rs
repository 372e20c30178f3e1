//! Request handlers.
//!
//! Handlers extract request data, delegate to
//! [`crm_core::service::CustomerService`], and map errors via
//! [`AppError`](crate::error::AppError).

pub mod auth;
pub mod customer;
