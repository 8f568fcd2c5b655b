//! # Device Filters
//!
//! Turns user filter expressions (`domain/family/member`, each segment
//! optionally wildcarded) into per-level naming-service query patterns.
//!
//! Every segment gets a `*` appended unconditionally, so `lab` queries as
//! `lab*` and `*` as `**`: a literal segment is always a prefix match and
//! nothing narrower than a prefix can be expressed.
//!
//! A [`FilterSet`] is built once per request and then drives every level of
//! the tree walk through [`FilterSet::query`].

use std::fmt;
use std::str::FromStr;

use devtree_common::device::{DevicePath, SEPARATOR};
use devtree_common::error::FilterError;
use devtree_common::naming::NamingService;
use futures::future;
use tracing::warn;

mod wildcard;

pub use wildcard::Wildcard;

/// Expression used when the caller supplies no filter at all.
pub const CATCH_ALL: &str = "*/*/*";

const QUERY_SUFFIX: &str = "*";

/// One of the three hierarchy levels of a device name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Domain,
    Family,
    Member,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Domain, Level::Family, Level::Member];

    fn index(self) -> usize {
        match self {
            Level::Domain => 0,
            Level::Family => 1,
            Level::Member => 2,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Domain => "domain",
            Level::Family => "family",
            Level::Member => "member",
        };
        f.write_str(name)
    }
}

/// Where in the hierarchy a query runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    /// Top level: domain names.
    Root,
    /// Families under a domain.
    Domain(&'a str),
    /// Members under a domain and family.
    Family(&'a str, &'a str),
}

impl Scope<'_> {
    /// The level whose names a query in this scope returns.
    pub fn level(&self) -> Level {
        match self {
            Scope::Root => Level::Domain,
            Scope::Domain(_) => Level::Family,
            Scope::Family(..) => Level::Member,
        }
    }

    /// Prefixes `pattern` with the scope, e.g. `lab1/ctrl/motor*`.
    pub fn qualify(&self, pattern: &str) -> String {
        match self {
            Scope::Root => pattern.to_string(),
            Scope::Domain(domain) => format!("{domain}{SEPARATOR}{pattern}"),
            Scope::Family(domain, family) => {
                format!("{domain}{SEPARATOR}{family}{SEPARATOR}{pattern}")
            }
        }
    }
}

/// A single `domain/family/member` filter, segments kept as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpression {
    segments: [String; 3],
}

impl FilterExpression {
    pub fn segment(&self, level: Level) -> &str {
        &self.segments[level.index()]
    }
}

impl FromStr for FilterExpression {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expression = s.trim();
        let segments: Vec<&str> = expression.split(SEPARATOR).collect();
        let [domain, family, member] = segments.as_slice() else {
            return Err(FilterError::Malformed {
                expression: expression.to_string(),
                segments: segments.len(),
            });
        };

        Ok(Self {
            segments: [domain.to_string(), family.to_string(), member.to_string()],
        })
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [domain, family, member] = &self.segments;
        write!(f, "{domain}{SEPARATOR}{family}{SEPARATOR}{member}")
    }
}

#[derive(Debug, Clone)]
struct LevelPatterns {
    queries: Vec<String>,
    matchers: Vec<Wildcard>,
}

impl LevelPatterns {
    fn derive(expressions: &[FilterExpression], level: Level) -> Result<Self, FilterError> {
        let mut queries: Vec<String> = Vec::new();
        for expression in expressions {
            let query = format!("{}{QUERY_SUFFIX}", expression.segment(level));
            if !queries.contains(&query) {
                queries.push(query);
            }
        }

        let matchers = queries
            .iter()
            .map(|query| {
                Wildcard::new(query).map_err(|e| FilterError::Pattern {
                    segment: query.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { queries, matchers })
    }

    fn accepts(&self, name: &str) -> bool {
        self.matchers.iter().any(|matcher| matcher.is_match(name))
    }

    fn is_universal(&self) -> bool {
        self.matchers.iter().any(Wildcard::is_universal)
    }
}

/// The parsed filters of one request.
#[derive(Debug, Clone)]
pub struct FilterSet {
    levels: [LevelPatterns; 3],
}

impl FilterSet {
    /// Parses raw filter expressions.
    ///
    /// Blank entries are ignored; if nothing remains the catch-all
    /// [`CATCH_ALL`] is used. A single malformed expression rejects the
    /// whole set.
    pub fn parse<I, S>(filters: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut expressions = filters
            .into_iter()
            .filter(|raw| !raw.as_ref().trim().is_empty())
            .map(|raw| raw.as_ref().parse::<FilterExpression>())
            .collect::<Result<Vec<_>, _>>()?;

        if expressions.is_empty() {
            expressions.push(CATCH_ALL.parse()?);
        }

        let levels = [
            LevelPatterns::derive(&expressions, Level::Domain)?,
            LevelPatterns::derive(&expressions, Level::Family)?,
            LevelPatterns::derive(&expressions, Level::Member)?,
        ];

        Ok(Self { levels })
    }

    /// Distinct query patterns of `level`, in first-seen order.
    pub fn patterns(&self, level: Level) -> &[String] {
        &self.levels[level.index()].queries
    }

    /// True when every level accepts every name, i.e. the set filters nothing.
    pub fn is_catch_all(&self) -> bool {
        self.levels.iter().all(LevelPatterns::is_universal)
    }

    /// Stable text identifying what this set selects.
    pub fn fingerprint(&self) -> String {
        Level::ALL
            .iter()
            .map(|level| self.patterns(*level).join(","))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// True when the domain, family and member of `path` each match at least
    /// one pattern of their own level. Levels are checked independently, so
    /// the three matches may come from different expressions.
    pub fn matches_device(&self, path: &DevicePath) -> bool {
        self.levels[Level::Domain.index()].accepts(&path.domain)
            && self.levels[Level::Family.index()].accepts(&path.family)
            && self.levels[Level::Member.index()].accepts(&path.member)
    }

    /// Runs every pattern of the scope's level against `service`.
    ///
    /// Patterns that fail are logged and contribute nothing. The result is
    /// the concatenation of the successful answers, pattern order first and
    /// naming-service order within a pattern; duplicates are kept.
    pub async fn query(&self, host: &str, service: &dyn NamingService, scope: Scope<'_>) -> Vec<String> {
        let level = scope.level();
        let calls = self.patterns(level).iter().map(|pattern| async move {
            let result = match scope {
                Scope::Root => service.list_domains(pattern).await,
                Scope::Domain(domain) => service.list_families(domain, pattern).await,
                Scope::Family(domain, family) => service.list_members(domain, family, pattern).await,
            };
            (pattern, result)
        });

        let mut names = Vec::new();
        for (pattern, result) in future::join_all(calls).await {
            match result {
                Ok(found) => names.extend(found),
                Err(e) => {
                    warn!(
                        host,
                        %level,
                        pattern = %scope.qualify(pattern),
                        "Failed to get {level} list: {e}"
                    );
                }
            }
        }
        names
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
