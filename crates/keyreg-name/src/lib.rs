//! Key-name grammar for the keyreg configuration registry.
//!
//! A key name is a `/`-delimited path below one of two namespaces:
//!
//! ```text
//! key-name    := namespace ( "/" path )?
//! namespace   := "system" | "user" ( ":" domain )?
//! path        := component ( "/" component )*
//! ```
//!
//! The functions here are pure: they measure and split names without
//! allocating, except for [`parse`], which produces the canonical form a
//! key stores (domain split out of the name).

mod error;
mod parse;

pub use error::NameError;
pub use parse::{full_name, parse, validate_domain, ParsedName};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Path delimiter between name components.
pub const DELIMITER: char = '/';

/// Separator between the `user` token and an explicit user domain.
pub const DOMAIN_SEPARATOR: char = ':';

/// Root token of the machine-wide namespace.
pub const SYSTEM_ROOT: &str = "system";

/// Root token of the per-identity namespace.
pub const USER_ROOT: &str = "user";

/// Top-level scope of a key name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Machine-wide keys (`system/...`)
    System,
    /// Per-identity keys (`user/...` or `user:<domain>/...`)
    User,
}

impl Namespace {
    /// The literal root token of this namespace.
    pub fn root(&self) -> &'static str {
        match self {
            Namespace::System => SYSTEM_ROOT,
            Namespace::User => USER_ROOT,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root())
    }
}

/// Namespace a name belongs to, judged by its leading token.
///
/// This is a prefix test only; `"users/x"` reports [`Namespace::User`] even
/// though [`parse`] rejects it.
pub fn namespace(name: &str) -> Option<Namespace> {
    if name.starts_with(SYSTEM_ROOT) {
        Some(Namespace::System)
    } else if name.starts_with(USER_ROOT) {
        Some(Namespace::User)
    } else {
        None
    }
}

pub fn is_system(name: &str) -> bool {
    namespace(name) == Some(Namespace::System)
}

pub fn is_user(name: &str) -> bool {
    namespace(name) == Some(Namespace::User)
}

/// Length of the leading root token, up to (not including) the first
/// delimiter, or the whole name when there is none.
pub fn root_name_size(name: &str) -> usize {
    name.find(DELIMITER).unwrap_or(name.len())
}

/// Length of the final path component, or 0 when the name is a root.
///
/// Trailing delimiters belong to the preceding component and are not counted.
pub fn base_name_size(name: &str) -> usize {
    let trimmed = name.trim_end_matches(DELIMITER);
    let root = root_name_size(trimmed);
    if root == 0 || root == trimmed.len() {
        return 0;
    }
    match trimmed.rfind(DELIMITER) {
        Some(pos) => trimmed.len() - pos - 1,
        None => 0,
    }
}

/// Length of the name with its final component removed.
///
/// Returns 0 for a root (`"system"`) and for a lone component hanging off a
/// leading delimiter (`"/a"`). Trailing delimiters are skipped first.
pub fn parent_size(name: &str) -> usize {
    let trimmed = name.trim_end_matches(DELIMITER);
    match trimmed.rfind(DELIMITER) {
        None | Some(0) => 0,
        Some(pos) => pos,
    }
}

pub fn root_name(name: &str) -> &str {
    &name[..root_name_size(name)]
}

pub fn base_name(name: &str) -> &str {
    let trimmed = name.trim_end_matches(DELIMITER);
    let size = base_name_size(trimmed);
    &trimmed[trimmed.len() - size..]
}

pub fn parent_name(name: &str) -> &str {
    &name[..parent_size(name)]
}
