//! Input validation for domains and hostnames.

use crate::error::{Error, Result};

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Returns `true` if `value` looks like a fully qualified domain name.
///
/// Accepts lowercase ASCII labels made of letters, digits, `-` and `_`, with
/// an alphabetic top-level label of at least two characters. A trailing dot
/// is tolerated.
pub fn is_valid_domain(value: &str) -> bool {
    let name = value.strip_suffix('.').unwrap_or(value);
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return false;
    }

    let labels: Vec<&str> = name.split('.').collect();
    if labels.len() < 2 || !labels.iter().all(|l| is_valid_label(l)) {
        return false;
    }

    labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_lowercase()))
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Lowercases and trims `value`, then validates it as a domain.
pub fn normalize_domain(value: &str) -> Result<String> {
    let normalized = value.trim().trim_end_matches('.').to_ascii_lowercase();
    if is_valid_domain(&normalized) {
        Ok(normalized)
    } else {
        Err(Error::InvalidDomain(value.to_string()))
    }
}
