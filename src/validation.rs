//! Domain-name canonicalization and hostname syntax checks.
use regex::Regex;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("domain name is empty")]
    Empty,
    #[error("domain name too long (max 253 characters)")]
    NameTooLong,
    #[error("label is empty (consecutive dots)")]
    EmptyLabel,
    #[error("label too long (max 63 characters)")]
    TooLong,
    #[error("label contains invalid characters (only a-z, 0-9, '-' and '_' allowed)")]
    InvalidCharacters,
    #[error("label must not start or end with '-'")]
    LeadingOrTrailingHyphen,
}

lazy_static::lazy_static! {
    /// Letters, digits, '-' and '_' (service labels such as `_dmarc`)
    static ref LABEL_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// Normalize a domain name to end with exactly one trailing dot.
///
/// `canonicalize("example.com")`, `canonicalize("example.com.")` and
/// `canonicalize("example.com..")` all yield `"example.com."`.
pub fn canonicalize(domain: &str) -> String {
    format!("{}.", domain.trim().trim_end_matches('.'))
}

/// Strip any trailing dots from a domain name.
pub fn trim_canonical(domain: &str) -> &str {
    domain.trim().trim_end_matches('.')
}

/// Escape a canonical zone name into the server's zone-id path form.
pub fn zone_id(domain: &str) -> String {
    canonicalize(domain).replace('/', "=2F")
}

pub fn validate_label(label: &str) -> Result<(), ValidationError> {
    if label.is_empty() {
        return Err(ValidationError::EmptyLabel);
    }
    if label.len() > 63 {
        return Err(ValidationError::TooLong);
    }
    // a lone "*" is the wildcard owner label
    if label == "*" {
        return Ok(());
    }
    if !LABEL_RE.is_match(label) {
        return Err(ValidationError::InvalidCharacters);
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(ValidationError::LeadingOrTrailingHyphen);
    }
    Ok(())
}

/// Check an ASCII hostname with or without its trailing dot.
pub fn validate_fqdn_ascii(domain: &str) -> Result<(), ValidationError> {
    let d = trim_canonical(domain);
    if d.is_empty() {
        return Err(ValidationError::Empty);
    }
    if d.len() > 253 {
        return Err(ValidationError::NameTooLong);
    }
    for label in d.split('.') {
        validate_label(label)?;
    }
    Ok(())
}
