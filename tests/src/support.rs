//! Scripted naming hosts for driving the tree builder end to end.
//!
//! Answers are keyed by call, e.g. `domains lab*`, `families lab1/ctrl*`,
//! `members lab1/ctrl/motor*`, `aliases *` and `resolve motor`. Unscripted
//! list calls answer with no names; unscripted resolutions fail.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use devtree_common::config::Config;
use devtree_common::error::NamingError;
use devtree_common::naming::{NamingConnector, NamingService};
use devtree_common::network::address::HostAddr;
use devtree_core::TreeBuilder;

#[derive(Debug, Clone)]
enum Answer {
    Names(Vec<String>),
    Device(String),
    Fail,
    Stall(Duration),
}

/// Shared record of every call made against scripted hosts.
#[derive(Debug, Default, Clone)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
    connects: Arc<AtomicUsize>,
}

impl CallLog {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    fn record(&self, host: &str, key: &str) {
        self.calls.lock().unwrap().push(format!("{host} {key}"));
    }
}

#[derive(Debug, Default, Clone)]
pub struct ScriptedHost {
    answers: HashMap<String, Answer>,
    connect_delay: Duration,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(mut self, key: &str, names: &[&str]) -> Self {
        let names = names.iter().map(|name| name.to_string()).collect();
        self.answers.insert(key.to_string(), Answer::Names(names));
        self
    }

    pub fn alias(mut self, alias: &str, device: &str) -> Self {
        self.answers
            .insert(format!("resolve {alias}"), Answer::Device(device.to_string()));
        self
    }

    pub fn fail(mut self, key: &str) -> Self {
        self.answers.insert(key.to_string(), Answer::Fail);
        self
    }

    pub fn stall(mut self, key: &str, delay: Duration) -> Self {
        self.answers.insert(key.to_string(), Answer::Stall(delay));
        self
    }

    pub fn connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }
}

struct ScriptedService {
    host: String,
    script: ScriptedHost,
    log: CallLog,
}

impl ScriptedService {
    async fn answer(&self, key: String) -> Result<Answer, NamingError> {
        self.log.record(&self.host, &key);
        match self.script.answers.get(&key).cloned() {
            Some(Answer::Fail) => Err(NamingError::Query {
                pattern: key,
                reason: "API_CorbaException".to_string(),
            }),
            Some(Answer::Stall(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(Answer::Names(Vec::new()))
            }
            Some(answer) => Ok(answer),
            None => Ok(Answer::Names(Vec::new())),
        }
    }

    async fn list(&self, key: String) -> Result<Vec<String>, NamingError> {
        match self.answer(key).await? {
            Answer::Names(names) => Ok(names),
            _ => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl NamingService for ScriptedService {
    async fn list_domains(&self, pattern: &str) -> Result<Vec<String>, NamingError> {
        self.list(format!("domains {pattern}")).await
    }

    async fn list_families(&self, domain: &str, pattern: &str) -> Result<Vec<String>, NamingError> {
        self.list(format!("families {domain}/{pattern}")).await
    }

    async fn list_members(
        &self,
        domain: &str,
        family: &str,
        pattern: &str,
    ) -> Result<Vec<String>, NamingError> {
        self.list(format!("members {domain}/{family}/{pattern}")).await
    }

    async fn list_aliases(&self, pattern: &str) -> Result<Vec<String>, NamingError> {
        self.list(format!("aliases {pattern}")).await
    }

    async fn resolve_alias(&self, alias: &str) -> Result<String, NamingError> {
        match self.answer(format!("resolve {alias}")).await? {
            Answer::Device(device) => Ok(device),
            _ => Err(NamingError::Alias {
                alias: alias.to_string(),
                reason: "DB_AliasNotDefined".to_string(),
            }),
        }
    }
}

/// Connects to scripted hosts by their identifier as written.
#[derive(Default)]
pub struct ScriptedConnector {
    hosts: HashMap<String, ScriptedHost>,
    log: CallLog,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: &str, script: ScriptedHost) -> Self {
        self.hosts.insert(host.to_string(), script);
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

#[async_trait]
impl NamingConnector for ScriptedConnector {
    async fn connect(&self, addr: &HostAddr) -> Result<Arc<dyn NamingService>, NamingError> {
        self.log.connects.fetch_add(1, Ordering::SeqCst);
        let script = self
            .hosts
            .get(addr.as_str())
            .cloned()
            .ok_or_else(|| NamingError::Connection {
                host: addr.to_string(),
                reason: "API_CantConnectToDatabase".to_string(),
            })?;

        if !script.connect_delay.is_zero() {
            tokio::time::sleep(script.connect_delay).await;
        }

        Ok(Arc::new(ScriptedService {
            host: addr.to_string(),
            script,
            log: self.log.clone(),
        }))
    }
}

/// A builder over `connector` plus the log of the calls it sees.
pub fn builder(connector: ScriptedConnector, config: Config) -> (TreeBuilder, CallLog) {
    let log = connector.log();
    (TreeBuilder::new(Arc::new(connector), config), log)
}

pub fn quick_config() -> Config {
    Config {
        call_timeout: Duration::from_millis(100),
        ..Config::default()
    }
}
