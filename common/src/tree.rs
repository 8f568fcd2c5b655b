//! # Device Tree Documents
//!
//! The nodes returned for each requested host. Field names follow the JSON
//! shape consumed by tree widgets: every node has a display `value`, inner
//! nodes keep their children under `data`, and an optional style class is
//! emitted as `$css`.
//!
//! ```text
//! host
//! ├─ aliases
//! │   └─ alias ──► domain/family/member
//! └─ domain
//!     └─ family
//!         └─ member
//! ```

use serde::Serialize;

use crate::device::DevicePath;

pub const ALIASES_LABEL: &str = "aliases";

/// Root node for one naming-service host.
#[derive(Debug, Clone, Serialize)]
pub struct HostTree {
    pub id: String,
    pub value: String,
    #[serde(rename = "$css", skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    pub data: Vec<HostChild>,
}

impl HostTree {
    /// The alias group always comes first, domains follow in query order.
    pub fn new(host: &str, aliases: AliasGroup, domains: Vec<DomainNode>, css: Option<String>) -> Self {
        let mut data = Vec::with_capacity(domains.len() + 1);
        data.push(HostChild::Aliases(aliases));
        data.extend(domains.into_iter().map(HostChild::Domain));

        Self {
            id: host.to_string(),
            value: host.to_string(),
            css,
            data,
        }
    }

    pub fn aliases(&self) -> Option<&AliasGroup> {
        self.data.iter().find_map(|child| match child {
            HostChild::Aliases(group) => Some(group),
            HostChild::Domain(_) => None,
        })
    }

    pub fn domains(&self) -> impl Iterator<Item = &DomainNode> {
        self.data.iter().filter_map(|child| match child {
            HostChild::Domain(domain) => Some(domain),
            HostChild::Aliases(_) => None,
        })
    }

    /// Every member leaf of the tree, in document order.
    pub fn members(&self) -> impl Iterator<Item = &MemberLeaf> {
        self.domains()
            .flat_map(|domain| domain.data.iter())
            .flat_map(|family| family.data.iter())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum HostChild {
    Aliases(AliasGroup),
    Domain(DomainNode),
}

#[derive(Debug, Clone, Serialize)]
pub struct AliasGroup {
    pub value: String,
    #[serde(rename = "$css", skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    pub data: Vec<Alias>,
}

impl AliasGroup {
    pub fn new(data: Vec<Alias>, css: Option<String>) -> Self {
        Self {
            value: ALIASES_LABEL.to_string(),
            css,
            data,
        }
    }

    pub fn empty(css: Option<String>) -> Self {
        Self::new(Vec::new(), css)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Alias {
    pub value: String,
    #[serde(rename = "isAlias")]
    pub is_alias: bool,
    pub device_name: String,
    pub device_id: String,
    #[serde(rename = "$css", skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
}

impl Alias {
    pub fn new(name: &str, path: &DevicePath, host: &str, css: Option<String>) -> Self {
        Self {
            value: name.to_string(),
            is_alias: true,
            device_name: path.to_string(),
            device_id: path.device_id(host),
            css,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DomainNode {
    pub value: String,
    #[serde(rename = "$css", skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    pub data: Vec<FamilyNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FamilyNode {
    pub value: String,
    #[serde(rename = "$css", skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    pub data: Vec<MemberLeaf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberLeaf {
    pub value: String,
    #[serde(rename = "isMember")]
    pub is_member: bool,
    pub device_name: String,
    pub device_id: String,
    #[serde(rename = "$css", skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
}

impl MemberLeaf {
    pub fn new(path: &DevicePath, host: &str, css: Option<String>) -> Self {
        Self {
            value: path.member.clone(),
            is_member: true,
            device_name: path.to_string(),
            device_id: path.device_id(host),
            css,
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
