//! Graph container APIs used by `narwhal`.
//!
//! The container is a directed multigraph keyed by string ids. Node and edge iteration follows
//! insertion order so layouts stay deterministic for identical input.

#![forbid(unsafe_code)]

mod graph;

pub use graph::{EdgeKey, Graph, GraphOptions, alg};
