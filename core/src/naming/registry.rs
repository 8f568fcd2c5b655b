//! # Registry Snapshot Adapter
//!
//! A naming service backed by a JSON document instead of a live server, so a
//! deployment (or a test) can serve trees without reaching real hosts.
//!
//! ```json
//! {
//!   "svc1:10000": {
//!     "devices": ["sys/tg_test/1", "lab1/ctrl/motor1"],
//!     "aliases": { "motor": "lab1/ctrl/motor1" }
//!   }
//! }
//! ```
//!
//! Hosts are looked up by the identifier as written in the request, then by
//! `host:port` with the default port filled in, then (on the default port) by
//! the bare host name. A host missing from the snapshot behaves like an
//! unreachable one.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use devtree_common::device::DevicePath;
use devtree_common::error::NamingError;
use devtree_common::naming::{NamingConnector, NamingService};
use devtree_common::network::address::{DEFAULT_PORT, HostAddr};
use serde::Deserialize;
use tracing::debug;

use crate::filter::Wildcard;

/// Naming data of a single host.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct HostRecord {
    #[serde(default)]
    pub devices: Vec<DevicePath>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// All hosts of a snapshot, keyed by host identifier.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    hosts: HashMap<String, Arc<HostRecord>>,
}

impl Registry {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid registry snapshot")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading registry snapshot {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("loading {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    fn lookup(&self, addr: &HostAddr) -> Option<Arc<HostRecord>> {
        self.hosts
            .get(addr.as_str())
            .or_else(|| self.hosts.get(&addr.authority()))
            .or_else(|| {
                (addr.port() == DEFAULT_PORT)
                    .then(|| self.hosts.get(addr.host()))
                    .flatten()
            })
            .cloned()
    }
}

/// Hands out [`RegistryService`] handles for the hosts of a snapshot.
#[derive(Debug, Clone)]
pub struct RegistryConnector {
    registry: Arc<Registry>,
}

impl RegistryConnector {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

#[async_trait]
impl NamingConnector for RegistryConnector {
    async fn connect(&self, addr: &HostAddr) -> Result<Arc<dyn NamingService>, NamingError> {
        let record = self
            .registry
            .lookup(addr)
            .ok_or_else(|| NamingError::Connection {
                host: addr.to_string(),
                reason: "host is not part of the registry snapshot".to_string(),
            })?;
        debug!(host = %addr, devices = record.devices.len(), "Connected to registry host");
        Ok(Arc::new(RegistryService { record }))
    }
}

/// A handle over one host's [`HostRecord`].
#[derive(Debug, Clone)]
pub struct RegistryService {
    record: Arc<HostRecord>,
}

impl RegistryService {
    /// Distinct, sorted names produced by `select` for devices it accepts.
    fn collect<'a, F>(&'a self, pattern: &str, select: F) -> Result<Vec<String>, NamingError>
    where
        F: Fn(&'a DevicePath) -> Option<&'a str>,
    {
        let wildcard = compile(pattern)?;
        let names: BTreeSet<&str> = self
            .record
            .devices
            .iter()
            .filter_map(select)
            .filter(|name| wildcard.is_match(name))
            .collect();
        Ok(names.into_iter().map(str::to_string).collect())
    }
}

#[async_trait]
impl NamingService for RegistryService {
    async fn list_domains(&self, pattern: &str) -> Result<Vec<String>, NamingError> {
        self.collect(pattern, |device| Some(device.domain.as_str()))
    }

    async fn list_families(&self, domain: &str, pattern: &str) -> Result<Vec<String>, NamingError> {
        self.collect(pattern, |device| {
            device
                .domain
                .eq_ignore_ascii_case(domain)
                .then_some(device.family.as_str())
        })
    }

    async fn list_members(
        &self,
        domain: &str,
        family: &str,
        pattern: &str,
    ) -> Result<Vec<String>, NamingError> {
        self.collect(pattern, |device| {
            (device.domain.eq_ignore_ascii_case(domain) && device.family.eq_ignore_ascii_case(family))
                .then_some(device.member.as_str())
        })
    }

    async fn list_aliases(&self, pattern: &str) -> Result<Vec<String>, NamingError> {
        let wildcard = compile(pattern)?;
        Ok(self
            .record
            .aliases
            .keys()
            .filter(|alias| wildcard.is_match(alias))
            .cloned()
            .collect())
    }

    async fn resolve_alias(&self, alias: &str) -> Result<String, NamingError> {
        self.record
            .aliases
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(alias))
            .map(|(_, device)| device.clone())
            .ok_or_else(|| NamingError::Alias {
                alias: alias.to_string(),
                reason: "alias not defined".to_string(),
            })
    }
}

fn compile(pattern: &str) -> Result<Wildcard, NamingError> {
    Wildcard::new(pattern).map_err(|e| NamingError::Query {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}
