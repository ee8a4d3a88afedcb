pub trait PublicSuffixMatcher: Send + Sync {
    /// Registrable domain (public suffix plus one label) of a canonical
    /// FQDN, keeping the trailing dot. `None` when no rule matches.
    ///
    /// A name that is itself a public suffix (`co.uk.`) is also `None`
    /// rather than being passed through unchanged, so preprocessing never
    /// emits a bare suffix as if it were a registrable domain.
    fn registrable_domain(&self, fqdn: &str) -> Option<String>;
}
