//! Metadata information regarding entities and how they map onto tables.

pub mod description;
pub mod error;
pub mod field;
pub mod joins;
pub mod schema;

// re-export without modules
pub use description::*;
pub use error::SchemaError;
pub use field::*;
pub use joins::*;
pub use schema::*;
