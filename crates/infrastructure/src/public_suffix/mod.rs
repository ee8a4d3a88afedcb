pub mod list;
pub mod suffix_trie;

pub use list::PublicSuffixList;
pub use suffix_trie::{RuleKind, SuffixTrie};
