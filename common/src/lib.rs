//! # devtree common
//!
//! Shared vocabulary of the workspace: the tree documents handed to callers,
//! the device and host identifiers they are built from, the error taxonomy,
//! and the outbound ports through which the naming service is reached.
//!
//! * **[`tree`]**: serializable host / alias / domain / family / member nodes.
//! * **[`device`]**: three-level device paths (`domain/family/member`).
//! * **[`network`]**: host identifiers of the form `host[:port]`.
//! * **[`naming`]**: the naming-service contract (ports).
//! * **[`config`]**: runtime knobs shared by the builder and the binaries.

pub mod config;
pub mod device;
pub mod error;
pub mod naming;
pub mod network;
pub mod tree;
