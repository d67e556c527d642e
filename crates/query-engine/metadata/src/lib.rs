//! Resolved entity metadata: fields, joins and the schema built from them.

pub mod metadata;
