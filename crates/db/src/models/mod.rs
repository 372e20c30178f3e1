//! Database row structs.
//!
//! Rows are converted into `crm_core` domain types at the repository boundary.

pub mod customer;
