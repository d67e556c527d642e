//! SQL AST, a dialect-aware renderer and execution plans for generated queries.

pub mod sql;
