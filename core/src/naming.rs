//! # Naming Service Adapters
//!
//! Concrete implementations of the ports in [`devtree_common::naming`].
//!
//! * **[`registry`]**: serves naming data from a JSON registry snapshot.
//! * **[`timeout`]**: bounds every call of another handle in time.

pub mod registry;
pub mod timeout;
