//! Request payload matching for stub endpoints.
//!
//! This module provides:
//! - `compare`: structural (sub-structure) equality between JSON-like values,
//!   safe on self-referential inputs
//! - `ValueGraph`: an arena of JSON-like nodes that may reference each other
//! - `decode_query`: flat decoding of a raw query string
//!
//! ## Module Structure
//!
//! - `structural`: the `JsonNode` view trait and the comparator
//! - `graph`: arena-backed values, used for merged request payloads
//! - `query`: query string decoding

mod graph;
mod query;
mod structural;

pub use graph::{NodeId, NodeRef, ValueGraph};
pub use query::{decode_query, QueryMap};
pub use structural::{compare, JsonNode, NodeIdentity, Shape};
