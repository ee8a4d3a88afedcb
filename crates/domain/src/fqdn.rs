//! Canonical domain names.
//!
//! Every name handed to the scanner is lower-case ASCII (IDNA labels are
//! converted to punycode) and ends with a dot.

use crate::DomainError;

/// Maximum presentation length of a domain name, root dot included.
const MAX_NAME_LEN: usize = 254;

/// Converts a raw name into its canonical fully-qualified form.
pub fn canonicalize(raw: &str) -> Result<String, DomainError> {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() || lowered == "." {
        return Err(DomainError::InvalidDomainName(format!(
            "'{}' is not a domain name",
            raw
        )));
    }

    let ascii = idna::domain_to_ascii(&lowered)
        .map_err(|e| DomainError::InvalidDomainName(format!("'{}': {}", raw, e)))?;

    let name = to_fqdn(&ascii);
    if name.len() > MAX_NAME_LEN {
        return Err(DomainError::InvalidDomainName(format!(
            "'{}' exceeds {} characters",
            raw, MAX_NAME_LEN
        )));
    }
    if name.starts_with('.') || name.contains("..") {
        return Err(DomainError::InvalidDomainName(format!(
            "'{}' has an empty label",
            raw
        )));
    }
    Ok(name)
}

/// Parses one line of a domain list.
///
/// Strips a trailing `#` comment and surrounding whitespace. Returns `None`
/// for blank lines and for names that cannot be canonicalized.
pub fn parse_list_line(line: &str) -> Option<Result<String, DomainError>> {
    let content = match line.split_once('#') {
        Some((before, _)) => before,
        None => line,
    };
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    Some(canonicalize(content))
}

pub fn to_fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

pub fn trim_dot(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}
