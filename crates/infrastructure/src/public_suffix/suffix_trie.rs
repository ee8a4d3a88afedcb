use compact_str::CompactString;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// `co.uk`
    Normal,
    /// `*.ck`: every label directly below is a public suffix.
    Wildcard,
    /// `!www.ck`: carves a registrable name out of a wildcard.
    Exception,
}

#[derive(Default)]
struct TrieNode {
    children: HashMap<CompactString, TrieNode, FxBuildHasher>,
    rule: bool,
    wildcard: bool,
    exception: bool,
}

/// Public suffix rules keyed by reversed labels.
#[derive(Default)]
pub struct SuffixTrie {
    root: TrieNode,
    rules: usize,
}

impl SuffixTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a rule given without its `*.` or `!` prefix.
    pub fn insert(&mut self, domain: &str, kind: RuleKind) {
        let mut node = &mut self.root;
        for label in domain.split('.').rev().filter(|l| !l.is_empty()) {
            node = node.children.entry(CompactString::new(label)).or_default();
        }
        match kind {
            RuleKind::Normal => node.rule = true,
            RuleKind::Wildcard => node.wildcard = true,
            RuleKind::Exception => node.exception = true,
        }
        self.rules += 1;
    }

    pub fn len(&self) -> usize {
        self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules == 0
    }

    /// Number of labels of the prevailing public suffix of `domain`
    /// (no trailing dot), or `None` when no rule matches.
    ///
    /// The longest matching rule wins, and an exception beats everything.
    pub fn suffix_len(&self, domain: &str) -> Option<usize> {
        let labels: SmallVec<[&str; 8]> = domain.split('.').rev().collect();
        let mut node = &self.root;
        let mut best = None;

        for (i, label) in labels.iter().enumerate() {
            if node.wildcard {
                best = Some(i + 1);
            }
            match node.children.get(*label) {
                Some(child) => {
                    if child.exception {
                        return Some(i);
                    }
                    if child.rule {
                        best = Some(i + 1);
                    }
                    node = child;
                }
                None => break,
            }
        }

        best
    }
}
