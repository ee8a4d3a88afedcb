use crate::ports::PublicSuffixMatcher;
use nsgeo_domain::fqdn::trim_dot;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreprocessOutcome {
    /// Registrable names without the trailing dot, sorted and unique.
    pub names: Vec<String>,
    /// Inputs with no registrable domain.
    pub skipped: usize,
}

/// Reduces canonical FQDNs to the set of registrable domains they belong to.
pub struct PreprocessDomainsUseCase {
    matcher: Arc<dyn PublicSuffixMatcher>,
}

impl PreprocessDomainsUseCase {
    pub fn new(matcher: Arc<dyn PublicSuffixMatcher>) -> Self {
        Self { matcher }
    }

    pub fn execute<I>(&self, fqdns: I) -> PreprocessOutcome
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut registrable = BTreeSet::new();
        let mut skipped = 0usize;

        for fqdn in fqdns {
            let fqdn = fqdn.as_ref();
            match self.matcher.registrable_domain(fqdn) {
                Some(name) => {
                    registrable.insert(trim_dot(&name).to_string());
                }
                None => {
                    debug!(fqdn = %fqdn, "No registrable domain");
                    skipped += 1;
                }
            }
        }

        info!(
            registrable = registrable.len(),
            skipped, "Domains preprocessed"
        );

        PreprocessOutcome {
            names: registrable.into_iter().collect(),
            skipped,
        }
    }
}
