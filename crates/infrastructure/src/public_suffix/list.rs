//! Public Suffix List (<https://publicsuffix.org/list/>) matcher.

use super::suffix_trie::{RuleKind, SuffixTrie};
use nsgeo_application::ports::PublicSuffixMatcher;
use nsgeo_domain::fqdn::{canonicalize, trim_dot};
use nsgeo_domain::DomainError;
use std::path::Path;
use tracing::{debug, info};

const PRIVATE_SECTION_MARKER: &str = "===BEGIN PRIVATE DOMAINS===";

pub struct PublicSuffixList {
    trie: SuffixTrie,
}

impl PublicSuffixList {
    /// Parses the list format: one rule per line, `//` comments, `*.`
    /// wildcards and `!` exceptions. Rules after the private-domains
    /// marker are only kept with `include_private`.
    pub fn parse(contents: &str, include_private: bool) -> Result<Self, DomainError> {
        let mut trie = SuffixTrie::new();

        for line in contents.lines() {
            let line = line.trim();
            if line.contains(PRIVATE_SECTION_MARKER) && !include_private {
                break;
            }
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            let Some(token) = line.split_whitespace().next() else {
                continue;
            };

            let (kind, rule) = if let Some(rest) = token.strip_prefix('!') {
                (RuleKind::Exception, rest)
            } else if let Some(rest) = token.strip_prefix("*.") {
                (RuleKind::Wildcard, rest)
            } else {
                (RuleKind::Normal, token)
            };

            match canonicalize(rule) {
                Ok(ascii) => trie.insert(trim_dot(&ascii), kind),
                Err(e) => debug!(rule = %token, error = %e, "Skipping unparsable rule"),
            }
        }

        if trie.is_empty() {
            return Err(DomainError::PublicSuffixList(
                "list contains no rules".to_string(),
            ));
        }
        Ok(Self { trie })
    }

    pub fn from_file(path: impl AsRef<Path>, include_private: bool) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DomainError::PublicSuffixList(format!("failed to read {}: {}", path.display(), e))
        })?;
        let list = Self::parse(&contents, include_private)?;
        info!(
            file = %path.display(),
            rules = list.len(),
            include_private,
            "Public suffix list loaded"
        );
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }
}

impl PublicSuffixMatcher for PublicSuffixList {
    fn registrable_domain(&self, fqdn: &str) -> Option<String> {
        let name = trim_dot(fqdn);
        let suffix_len = self.trie.suffix_len(name)?;

        let labels: Vec<&str> = name.split('.').collect();
        if labels.len() <= suffix_len {
            return None;
        }
        Some(format!("{}.", labels[labels.len() - suffix_len - 1..].join(".")))
    }
}
