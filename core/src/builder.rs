//! # Device Tree Builder
//!
//! Implements the "device tree" use case: for every requested host, walk the
//! naming service level by level through a [`FilterSet`] and assemble one
//! [`HostTree`].
//!
//! ## Failure isolation
//! Nothing below request validation fails a request. Each failure costs the
//! smallest piece of output it can:
//!
//! | failure                          | lost                         |
//! |----------------------------------|------------------------------|
//! | host identifier does not parse   | the host                     |
//! | connect fails / times out        | the host                     |
//! | alias listing fails              | the alias group's content    |
//! | one alias does not resolve       | that alias                   |
//! | one domain/family/member pattern | that pattern's contribution  |
//!
//! Hosts are built concurrently (bounded by `host_concurrency`) and returned
//! in request order. Dropping the returned future abandons the hosts not yet
//! built.

use std::sync::Arc;
use std::time::Instant;

use devtree_common::config::Config;
use devtree_common::device::DevicePath;
use devtree_common::error::{FilterError, NamingError};
use devtree_common::naming::{NamingConnector, NamingService};
use devtree_common::network::address::HostAddr;
use devtree_common::tree::{Alias, AliasGroup, DomainNode, FamilyNode, HostTree, MemberLeaf};
use futures::{StreamExt, future, stream};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::cache::{HostSnapshotCache, SnapshotKey};
use crate::filter::{FilterSet, Scope};
use crate::naming::timeout;

/// Pattern used to list every alias of a host.
const ALL_ALIASES: &str = "*";
/// Alias resolutions in flight per host.
const ALIAS_CONCURRENCY: usize = 16;
/// Domains walked at the same time per host.
const DOMAIN_CONCURRENCY: usize = 4;

/// Builds device trees for batches of hosts.
pub struct TreeBuilder {
    connector: Arc<dyn NamingConnector>,
    cache: HostSnapshotCache,
    config: Config,
}

impl TreeBuilder {
    pub fn new(connector: Arc<dyn NamingConnector>, config: Config) -> Self {
        let cache = HostSnapshotCache::new(config.cache_ttl);
        Self {
            connector,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &HostSnapshotCache {
        &self.cache
    }

    /// Parses `filters` and builds one tree per usable host.
    ///
    /// The only error is a malformed filter expression; unusable hosts are
    /// left out of the result.
    pub async fn build_for_hosts<H, F>(
        &self,
        hosts: &[H],
        filters: &[F],
    ) -> Result<Vec<Arc<HostTree>>, FilterError>
    where
        H: AsRef<str> + Sync,
        F: AsRef<str>,
    {
        let filter = FilterSet::parse(filters)?;
        Ok(self.build_with(hosts, &filter).await)
    }

    /// Builds one tree per usable host under an already parsed filter set.
    pub async fn build_with<H>(&self, hosts: &[H], filter: &FilterSet) -> Vec<Arc<HostTree>>
    where
        H: AsRef<str> + Sync,
    {
        let started = Instant::now();

        // Built up front so the stream holds plain futures and stays `Send`.
        let builds: Vec<_> = hosts
            .iter()
            .map(|raw| {
                let raw = raw.as_ref();
                self.build_host(raw, filter)
                    .instrument(info_span!("host", host = raw))
            })
            .collect();

        let trees: Vec<Arc<HostTree>> = stream::iter(builds)
            .buffered(self.config.host_concurrency.max(1))
            .filter_map(future::ready)
            .collect()
            .await;

        info!(
            requested = hosts.len(),
            built = trees.len(),
            cached = self.cache().len(),
            filters = %filter.fingerprint(),
            "Device trees ready in {:.2?}",
            started.elapsed()
        );
        trees
    }

    async fn build_host(&self, raw: &str, filter: &FilterSet) -> Option<Arc<HostTree>> {
        let addr: HostAddr = match raw.parse() {
            Ok(addr) => addr,
            Err(e) => {
                warn!("Skipping host: {e}");
                return None;
            }
        };

        let key = SnapshotKey::new(&addr, filter);
        if let Some(tree) = self.cache.get(&key) {
            debug!("Serving cached tree");
            return Some(tree);
        }

        let service = match timeout::connect(self.connector.as_ref(), &addr, self.config.call_timeout).await {
            Ok(service) => service,
            Err(e) => {
                warn!("Skipping host: {e}");
                return None;
            }
        };

        let host = addr.as_str();
        let (aliases, domains) = tokio::join!(
            self.build_aliases(host, &service, filter),
            self.build_domains(host, &service, filter)
        );

        let tree = HostTree::new(host, aliases, domains, self.config.styles.host.clone());
        Some(self.cache.insert_if_absent(key, Arc::new(tree)))
    }

    /// Lists and resolves every alias of the host.
    ///
    /// Under a narrowing filter set only aliases whose device passes
    /// [`FilterSet::matches_device`] are kept.
    async fn build_aliases(&self, host: &str, service: &dyn NamingService, filter: &FilterSet) -> AliasGroup {
        let styles = &self.config.styles;

        let names = match service.list_aliases(ALL_ALIASES).await {
            Ok(names) => names,
            Err(e) => {
                warn!("Failed to get aliases list for {host}: {e}");
                return AliasGroup::empty(styles.aliases.clone());
            }
        };

        let narrowing = !filter.is_catch_all();
        let aliases: Vec<Alias> = stream::iter(names)
            .map(|name| async move {
                let resolved = service.resolve_alias(&name).await;
                (name, resolved)
            })
            .buffered(ALIAS_CONCURRENCY)
            .filter_map(|(name, resolved)| {
                let alias = resolve(host, &name, resolved)
                    .filter(|path| !narrowing || filter.matches_device(path))
                    .map(|path| Alias::new(&name, &path, host, styles.alias.clone()));
                future::ready(alias)
            })
            .collect()
            .await;

        AliasGroup::new(aliases, styles.aliases.clone())
    }

    async fn build_domains(&self, host: &str, service: &dyn NamingService, filter: &FilterSet) -> Vec<DomainNode> {
        let domains = filter.query(host, service, Scope::Root).await;

        stream::iter(domains)
            .map(|domain| self.build_domain(host, service, filter, domain))
            .buffered(DOMAIN_CONCURRENCY)
            .collect()
            .await
    }

    async fn build_domain(
        &self,
        host: &str,
        service: &dyn NamingService,
        filter: &FilterSet,
        domain: String,
    ) -> DomainNode {
        let styles = &self.config.styles;
        let families = filter.query(host, service, Scope::Domain(&domain)).await;

        let mut data = Vec::with_capacity(families.len());
        for family in families {
            let members = filter
                .query(host, service, Scope::Family(&domain, &family))
                .await;
            let leaves = members
                .into_iter()
                .map(|member| {
                    let path = DevicePath::new(domain.as_str(), family.as_str(), member);
                    MemberLeaf::new(&path, host, styles.member.clone())
                })
                .collect();

            data.push(FamilyNode {
                value: family,
                css: styles.family.clone(),
                data: leaves,
            });
        }

        DomainNode {
            value: domain,
            css: styles.domain.clone(),
            data,
        }
    }
}

fn resolve(
    host: &str,
    alias: &str,
    resolved: Result<String, NamingError>,
) -> Option<DevicePath> {
    let device = match resolved {
        Ok(device) => device,
        Err(e) => {
            debug!(host, "Dropping alias {alias}: {e}");
            return None;
        }
    };
    match device.parse() {
        Ok(path) => Some(path),
        Err(e) => {
            debug!(host, "Dropping alias {alias}: {e}");
            None
        }
    }
}
