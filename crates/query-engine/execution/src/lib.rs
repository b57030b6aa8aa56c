//! Query execution against a MySQL database.

pub mod error;
pub mod metrics;
pub mod placeholders;
pub mod query;
