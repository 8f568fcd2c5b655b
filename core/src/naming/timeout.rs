use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use devtree_common::error::NamingError;
use devtree_common::naming::{NamingConnector, NamingService};
use devtree_common::network::address::HostAddr;

/// Wraps a handle so that no call outlives `limit`.
///
/// A call that runs out of time resolves to [`NamingError::Timeout`] and is
/// handled like any other failed call.
pub struct TimeoutNamingService {
    inner: Arc<dyn NamingService>,
    limit: Duration,
}

impl TimeoutNamingService {
    pub fn new(inner: Arc<dyn NamingService>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T, F>(&self, call: impl FnOnce() -> String, fut: F) -> Result<T, NamingError>
    where
        F: Future<Output = Result<T, NamingError>>,
    {
        bounded(self.limit, call, fut).await
    }
}

#[async_trait]
impl NamingService for TimeoutNamingService {
    async fn list_domains(&self, pattern: &str) -> Result<Vec<String>, NamingError> {
        self.bounded(
            || format!("list_domains({pattern})"),
            self.inner.list_domains(pattern),
        )
        .await
    }

    async fn list_families(&self, domain: &str, pattern: &str) -> Result<Vec<String>, NamingError> {
        self.bounded(
            || format!("list_families({domain}, {pattern})"),
            self.inner.list_families(domain, pattern),
        )
        .await
    }

    async fn list_members(
        &self,
        domain: &str,
        family: &str,
        pattern: &str,
    ) -> Result<Vec<String>, NamingError> {
        self.bounded(
            || format!("list_members({domain}, {family}, {pattern})"),
            self.inner.list_members(domain, family, pattern),
        )
        .await
    }

    async fn list_aliases(&self, pattern: &str) -> Result<Vec<String>, NamingError> {
        self.bounded(
            || format!("list_aliases({pattern})"),
            self.inner.list_aliases(pattern),
        )
        .await
    }

    async fn resolve_alias(&self, alias: &str) -> Result<String, NamingError> {
        self.bounded(
            || format!("resolve_alias({alias})"),
            self.inner.resolve_alias(alias),
        )
        .await
    }
}

/// Connects through `connector`, giving up after `limit`.
pub async fn connect(
    connector: &dyn NamingConnector,
    addr: &HostAddr,
    limit: Duration,
) -> Result<TimeoutNamingService, NamingError> {
    let inner = bounded(limit, || format!("connect({addr})"), connector.connect(addr)).await?;
    Ok(TimeoutNamingService::new(inner, limit))
}

async fn bounded<T, F>(limit: Duration, call: impl FnOnce() -> String, fut: F) -> Result<T, NamingError>
where
    F: Future<Output = Result<T, NamingError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_elapsed) => Err(NamingError::Timeout { call: call(), limit }),
    }
}
