//! # Naming Service Ports
//!
//! Contracts the tree builder depends on to reach a host's naming service.
//! Concrete implementations live in `devtree-core` (registry snapshots) or in
//! test support code.
//!
//! ## Rules
//! 1. Every call is fallible on its own; callers decide how much of the tree
//!    a failure costs.
//! 2. Patterns use the naming-service wildcard `*` (any run of characters).
//! 3. [`NamingConnector::connect`] hands back the handle itself, typed; no
//!    caller ever needs to look inside a wrapper to reach the client.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::NamingError;
use crate::network::address::HostAddr;

/// A connected naming-service handle for one host.
#[async_trait]
pub trait NamingService: Send + Sync {
    /// Lists level-1 names matching `pattern`.
    async fn list_domains(&self, pattern: &str) -> Result<Vec<String>, NamingError>;

    /// Lists level-2 names under `domain` matching `pattern`.
    async fn list_families(&self, domain: &str, pattern: &str) -> Result<Vec<String>, NamingError>;

    /// Lists level-3 names under `domain/family` matching `pattern`.
    async fn list_members(
        &self,
        domain: &str,
        family: &str,
        pattern: &str,
    ) -> Result<Vec<String>, NamingError>;

    /// Lists alias names matching `pattern`.
    async fn list_aliases(&self, pattern: &str) -> Result<Vec<String>, NamingError>;

    /// Resolves an alias to the `domain/family/member` path it stands for.
    async fn resolve_alias(&self, alias: &str) -> Result<String, NamingError>;
}

/// Opens naming-service handles.
#[async_trait]
pub trait NamingConnector: Send + Sync {
    async fn connect(&self, addr: &HostAddr) -> Result<Arc<dyn NamingService>, NamingError>;
}
