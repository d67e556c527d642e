//! The query service: read a request URI, run its queries and build the response.
//!
//! HTTP routing is left to the embedding server, which passes the entity name and
//! the request to [`query::respond`].

pub mod error;
pub mod headers;
pub mod query;
pub mod state;
