//! Translate a query plan into a parameterized MySQL statement.

pub mod error;
pub mod helpers;
pub mod query;
