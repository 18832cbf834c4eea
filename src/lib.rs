//! planenum - index assignment enumerator for predicate trees
//!
//! Builds a memo of per-node index solutions over a relevance-annotated
//! predicate tree and produces an index-tagged plan for the access-path
//! builder.

pub mod cli;
pub mod observability;
pub mod planner;
