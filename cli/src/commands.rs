pub mod serve;
pub mod tree;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use devtree_common::config::{Config, NodeStyles};
use devtree_core::TreeBuilder;
use devtree_core::naming::registry::{Registry, RegistryConnector};
use tracing::info;

#[derive(Parser)]
#[command(name = "devtree")]
#[command(about = "Aggregates device trees from naming services.")]
pub struct CommandLine {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve device trees over HTTP
    #[command(alias = "s")]
    Serve {
        /// Address to listen on
        #[arg(long, env = "DEVTREE_BIND", default_value = "0.0.0.0:8080")]
        bind: SocketAddr,

        #[command(flatten)]
        build: BuildArgs,
    },
    /// Build the device trees of some hosts once and print them
    #[command(alias = "t")]
    Tree {
        /// Naming-service host, `host[:port]` (repeatable)
        #[arg(short = 'H', long = "host", required = true)]
        hosts: Vec<String>,

        /// Filter `domain/family/member`, wildcards allowed (repeatable)
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Print the JSON documents instead of the rendered tree
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        build: BuildArgs,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Options shared by every command that builds trees.
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// JSON registry snapshot holding the naming data of each host
    #[arg(short, long, env = "DEVTREE_REGISTRY")]
    pub registry: PathBuf,

    /// Limit for a single naming-service call, in milliseconds
    #[arg(
        long,
        env = "DEVTREE_CALL_TIMEOUT_MS",
        default_value_t = 3000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub call_timeout_ms: u64,

    /// Serve built trees from memory for this many seconds (0 disables)
    #[arg(long, env = "DEVTREE_CACHE_TTL_SECS", default_value_t = 0)]
    pub cache_ttl_secs: u64,

    /// Hosts built at the same time within one request
    #[arg(long, env = "DEVTREE_HOST_CONCURRENCY", default_value_t = 8)]
    pub host_concurrency: usize,

    /// Style class for a node kind, e.g. `member=tango-device` (repeatable)
    #[arg(long = "css", value_name = "KIND=CLASS")]
    pub styles: Vec<StyleArg>,
}

impl BuildArgs {
    pub fn config(&self) -> Config {
        let mut styles = NodeStyles::default();
        for style in &self.styles {
            style.apply(&mut styles);
        }

        Config {
            call_timeout: Duration::from_millis(self.call_timeout_ms),
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            host_concurrency: self.host_concurrency,
            styles,
        }
    }

    pub fn tree_builder(&self) -> anyhow::Result<TreeBuilder> {
        let registry = Registry::load(&self.registry)
            .with_context(|| format!("cannot use registry {}", self.registry.display()))?;
        info!(
            hosts = registry.len(),
            "Loaded registry snapshot {}",
            self.registry.display()
        );

        let connector = Arc::new(RegistryConnector::new(registry));
        Ok(TreeBuilder::new(connector, self.config()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Host,
    Aliases,
    Alias,
    Domain,
    Family,
    Member,
}

/// A `KIND=CLASS` pair from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleArg {
    pub kind: NodeKind,
    pub class: String,
}

impl StyleArg {
    fn apply(&self, styles: &mut NodeStyles) {
        let slot = match self.kind {
            NodeKind::Host => &mut styles.host,
            NodeKind::Aliases => &mut styles.aliases,
            NodeKind::Alias => &mut styles.alias,
            NodeKind::Domain => &mut styles.domain,
            NodeKind::Family => &mut styles.family,
            NodeKind::Member => &mut styles.member,
        };
        *slot = Some(self.class.clone());
    }
}

impl FromStr for StyleArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((kind, class)) = s.split_once('=') else {
            return Err(format!("expected KIND=CLASS, got `{s}`"));
        };

        let kind = match kind.trim().to_ascii_lowercase().as_str() {
            "host" => NodeKind::Host,
            "aliases" => NodeKind::Aliases,
            "alias" => NodeKind::Alias,
            "domain" => NodeKind::Domain,
            "family" => NodeKind::Family,
            "member" => NodeKind::Member,
            other => return Err(format!("unknown node kind `{other}`")),
        };

        Ok(Self {
            kind,
            class: class.to_string(),
        })
    }
}
