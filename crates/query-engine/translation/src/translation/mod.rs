//! Translate request parameters into an ExecutionPlan (SQL) to be run against the database,
//! and describe the neighbouring pages of the result.

pub mod comparison;
pub mod cursor;
pub mod error;
pub mod pagination;
pub mod parameters;
pub mod query;
pub mod request;
