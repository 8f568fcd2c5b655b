use std::time::Duration;

/// Runtime knobs shared by the tree builder and the binaries.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upper bound on every single naming-service call, `connect` included.
    ///
    /// A call that runs past it counts as failed and only its branch is lost.
    pub call_timeout: Duration,
    /// How long a built host tree may be served from the snapshot cache.
    ///
    /// `Duration::ZERO` turns the cache off entirely.
    pub cache_ttl: Duration,
    /// How many hosts of one request are built at the same time.
    pub host_concurrency: usize,
    /// Style classes attached to the emitted nodes.
    pub styles: NodeStyles,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(3),
            cache_ttl: Duration::ZERO,
            host_concurrency: 8,
            styles: NodeStyles::default(),
        }
    }
}

/// Opaque presentation classes, copied as-is onto each node kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStyles {
    pub host: Option<String>,
    pub aliases: Option<String>,
    pub alias: Option<String>,
    pub domain: Option<String>,
    pub family: Option<String>,
    pub member: Option<String>,
}
