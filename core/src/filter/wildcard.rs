use regex::{Regex, RegexBuilder};

const WILDCARD: char = '*';

/// A naming-service wildcard pattern: `*` stands for any run of characters,
/// everything else is literal. Matching ignores ASCII case, as naming
/// services do.
#[derive(Debug, Clone)]
pub struct Wildcard {
    source: String,
    regex: Regex,
}

impl Wildcard {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let body: Vec<String> = pattern.split(WILDCARD).map(regex::escape).collect();
        let regex = RegexBuilder::new(&format!("^{}$", body.join(".*")))
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// True when the pattern accepts every name.
    pub fn is_universal(&self) -> bool {
        !self.source.is_empty() && self.source.chars().all(|c| c == WILDCARD)
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
