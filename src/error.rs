//! Error taxonomy for key and key-set operations.
//!
//! Every failure is returned to the immediate caller; nothing here is
//! fatal and no operation leaves a key partially mutated on error.

use keyreg_name::NameError;
use std::collections::TryReserveError;
use std::fmt;

use crate::key::KeyType;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, KeyError>;

/// A key facet that may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    OwnerDomain,
    Comment,
    Value,
    BaseName,
    ParentName,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::OwnerDomain => write!(f, "owner domain"),
            Self::Comment => write!(f, "comment"),
            Self::Value => write!(f, "value"),
            Self::BaseName => write!(f, "base name"),
            Self::ParentName => write!(f, "parent name"),
        }
    }
}

/// Errors for key operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("key is not initialized")]
    Uninitialized,

    #[error("invalid key name: {0}")]
    InvalidName(#[from] NameError),

    #[error("buffer too small: {required} bytes required, {capacity} available")]
    Truncated { required: usize, capacity: usize },

    #[error("key has no {0}")]
    FieldAbsent(Field),

    #[error("value of type {actual} cannot be read as {requested}")]
    TypeMismatch { requested: KeyType, actual: KeyType },

    #[error("could not allocate key storage")]
    AllocationFailure,

    #[error("invalid environment configuration: {0}")]
    InvalidConfig(String),
}

impl From<TryReserveError> for KeyError {
    fn from(_: TryReserveError) -> Self {
        KeyError::AllocationFailure
    }
}

/// Copy `src` into the front of `dest` only if all of it fits.
pub(crate) fn copy_out(src: &[u8], dest: &mut [u8]) -> Result<usize> {
    if dest.len() < src.len() {
        return Err(KeyError::Truncated {
            required: src.len(),
            capacity: dest.len(),
        });
    }
    dest[..src.len()].copy_from_slice(src);
    Ok(src.len())
}
