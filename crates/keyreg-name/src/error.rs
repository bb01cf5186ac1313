//! Errors for key-name parsing.

/// Reasons a key name fails the grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("key name is empty")]
    Empty,

    #[error("key name must start with 'system' or 'user': {0}")]
    InvalidRoot(String),

    #[error("unrecognized separator after namespace token: {0}")]
    UnknownSeparator(String),

    #[error("system keys carry no user domain: {0}")]
    DomainOnSystem(String),

    #[error("user domain must not contain '/': {0}")]
    InvalidDomain(String),
}
