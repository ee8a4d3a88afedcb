//! Newline-separated domain lists.
//!
//! `#` starts a comment. Blank lines and names that cannot be
//! canonicalized are skipped.

use nsgeo_domain::fqdn::parse_list_line;
use nsgeo_domain::DomainError;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Canonical names read from one or more lists, deduplicated.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DomainList {
    pub names: BTreeSet<String>,
    pub invalid: usize,
}

impl DomainList {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.names.into_iter().collect()
    }

    /// Adds every valid line of `reader`.
    pub fn extend_from_reader<R: BufRead>(&mut self, reader: R) -> Result<(), DomainError> {
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| DomainError::IoError(e.to_string()))?;
            match parse_list_line(&line) {
                None => {}
                Some(Ok(fqdn)) => {
                    self.names.insert(fqdn);
                }
                Some(Err(e)) => {
                    debug!(line = index + 1, error = %e, "Skipping invalid domain");
                    self.invalid += 1;
                }
            }
        }
        Ok(())
    }
}

pub fn read_domain_list(path: impl AsRef<Path>) -> Result<DomainList, DomainError> {
    let mut list = DomainList::default();
    extend_from_file(&mut list, path.as_ref())?;
    Ok(list)
}

pub fn read_domain_lists<P: AsRef<Path>>(paths: &[P]) -> Result<DomainList, DomainError> {
    let mut list = DomainList::default();
    for path in paths {
        extend_from_file(&mut list, path.as_ref())?;
    }
    Ok(list)
}

fn extend_from_file(list: &mut DomainList, path: &Path) -> Result<(), DomainError> {
    let file = File::open(path)
        .map_err(|e| DomainError::IoError(format!("failed to open {}: {}", path.display(), e)))?;
    let before = list.len();
    list.extend_from_reader(BufReader::new(file))
        .map_err(|e| DomainError::IoError(format!("failed to read {}: {}", path.display(), e)))?;
    info!(
        file = %path.display(),
        added = list.len() - before,
        total = list.len(),
        "Domain list loaded"
    );
    Ok(())
}
