use anyhow::Context;
use nsgeo_application::use_cases::PreprocessDomainsUseCase;
use nsgeo_infrastructure::input::read_domain_lists;
use nsgeo_infrastructure::output::write_name_list;
use nsgeo_infrastructure::public_suffix::PublicSuffixList;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub struct PreprocessCommand<'a> {
    pub psl: &'a Path,
    pub out: &'a Path,
    pub include_private: bool,
    pub files: &'a [PathBuf],
}

pub fn run(command: PreprocessCommand<'_>) -> anyhow::Result<usize> {
    let list = PublicSuffixList::from_file(command.psl, command.include_private)
        .context("failed to load public suffix list")?;

    let domains = read_domain_lists(command.files).context("failed to process domain list")?;
    info!(
        files = command.files.len(),
        domains = domains.len(),
        invalid = domains.invalid,
        "Domain lists loaded"
    );

    let outcome = PreprocessDomainsUseCase::new(Arc::new(list)).execute(domains.names.iter());

    write_name_list(command.out, &outcome.names).context("failed to write output file")?;
    info!(
        written = outcome.names.len(),
        skipped = outcome.skipped,
        out = %command.out.display(),
        "Preprocessing finished"
    );
    Ok(outcome.names.len())
}
