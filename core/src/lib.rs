//! # devtree core
//!
//! The filter-and-aggregation engine.
//!
//! * **[`filter`]**: filter expressions, per-level patterns, tolerant queries.
//! * **[`builder`]**: per-host tree assembly across many hosts.
//! * **[`cache`]**: read-through snapshot cache of built trees.
//! * **[`naming`]**: naming-service adapters (registry snapshots, timeouts).

pub mod builder;
pub mod cache;
pub mod filter;
pub mod naming;

pub use builder::TreeBuilder;
pub use filter::FilterSet;
