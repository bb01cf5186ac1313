//! Canonical name parsing.
//!
//! A caller-supplied name such as `user:alice//net/eth0/` parses into the
//! stored form `user/net/eth0` with the domain `alice` split out. Leading and
//! trailing delimiters are dropped and empty components collapse.

use crate::{Namespace, NameError, DELIMITER, DOMAIN_SEPARATOR, SYSTEM_ROOT, USER_ROOT};
use std::fmt;

/// A key name split into its canonical parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Namespace of the name
    pub namespace: Namespace,

    /// Explicit user domain (`user:<domain>/...`), never set for system names
    pub domain: Option<String>,

    /// Canonical name without domain, e.g. `user/net/eth0`
    pub name: String,
}

impl ParsedName {
    /// The name with the domain re-interleaved for user keys.
    pub fn full_name(&self) -> String {
        full_name(&self.name, self.domain.as_deref())
    }

    /// The path below the namespace root, empty for a root name.
    pub fn path(&self) -> &str {
        self.name
            .get(self.namespace.root().len() + 1..)
            .unwrap_or("")
    }
}

impl fmt::Display for ParsedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Parse a caller-supplied key name into its canonical parts.
pub fn parse(input: &str) -> Result<ParsedName, NameError> {
    let trimmed = input.trim_matches(DELIMITER);
    if trimmed.is_empty() {
        return Err(NameError::Empty);
    }

    let (root, rest) = match trimmed.split_once(DELIMITER) {
        Some((root, rest)) => (root, rest),
        None => (trimmed, ""),
    };

    let (namespace, domain) = if root == SYSTEM_ROOT {
        (Namespace::System, None)
    } else if let Some(tail) = root.strip_prefix(USER_ROOT) {
        if tail.is_empty() {
            (Namespace::User, None)
        } else {
            match tail.strip_prefix(DOMAIN_SEPARATOR) {
                Some("") => (Namespace::User, None),
                Some(domain) => (Namespace::User, Some(domain.to_string())),
                None => return Err(NameError::UnknownSeparator(input.to_string())),
            }
        }
    } else if let Some(tail) = root.strip_prefix(SYSTEM_ROOT) {
        if tail.starts_with(DOMAIN_SEPARATOR) {
            return Err(NameError::DomainOnSystem(input.to_string()));
        }
        return Err(NameError::UnknownSeparator(input.to_string()));
    } else {
        return Err(NameError::InvalidRoot(input.to_string()));
    };

    let mut name = String::from(namespace.root());
    for component in rest.split(DELIMITER).filter(|c| !c.is_empty()) {
        name.push(DELIMITER);
        name.push_str(component);
    }

    Ok(ParsedName {
        namespace,
        domain,
        name,
    })
}

/// Check a user domain supplied apart from a name.
pub fn validate_domain(domain: &str) -> Result<(), NameError> {
    if domain.contains(DELIMITER) {
        return Err(NameError::InvalidDomain(domain.to_string()));
    }
    Ok(())
}

/// Re-interleave a user domain into a canonical name.
///
/// `("user/net", Some("alice"))` gives `user:alice/net`. System names and
/// user names without a domain come back unchanged.
pub fn full_name(name: &str, domain: Option<&str>) -> String {
    match (name.strip_prefix(USER_ROOT), domain) {
        (Some(rest), Some(domain)) => {
            let mut full = String::with_capacity(name.len() + domain.len() + 1);
            full.push_str(USER_ROOT);
            full.push(DOMAIN_SEPARATOR);
            full.push_str(domain);
            full.push_str(rest);
            full
        }
        _ => name.to_string(),
    }
}
