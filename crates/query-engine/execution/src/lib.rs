//! Query execution against a database: count the matching rows, then fetch a page of them.

pub mod database;
pub mod error;
pub mod metrics;
pub mod query;
