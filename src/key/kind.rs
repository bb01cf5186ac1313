//! Value type tags.
//!
//! Numeric codes follow the registry's layout:
//! - `0` undefined, `1` directory, `2` link
//! - `20..=39` binary (variant 0 is raw bytes, the rest application-defined)
//! - `40..=254` string (variant 0 is UTF-8 text, the rest application-defined)

use serde::{Deserialize, Serialize};
use std::fmt;

const CODE_UNDEFINED: u8 = 0;
const CODE_DIRECTORY: u8 = 1;
const CODE_LINK: u8 = 2;
const CODE_BINARY: u8 = 20;
const CODE_BINARY_LAST: u8 = 39;
const CODE_STRING: u8 = 40;
const CODE_STRING_LAST: u8 = 254;

/// Type tag of a key's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct KeyType(u8);

impl KeyType {
    /// No type yet; what a freshly initialized key carries.
    pub const UNDEFINED: KeyType = KeyType(CODE_UNDEFINED);
    /// Folder key; never carries a value.
    pub const DIRECTORY: KeyType = KeyType(CODE_DIRECTORY);
    /// Symbolic link; the value is the target name.
    pub const LINK: KeyType = KeyType(CODE_LINK);
    /// Raw bytes.
    pub const BINARY: KeyType = KeyType(CODE_BINARY);
    /// UTF-8 text.
    pub const STRING: KeyType = KeyType(CODE_STRING);

    /// Map a numeric code, rejecting the unassigned ones.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            CODE_UNDEFINED | CODE_DIRECTORY | CODE_LINK => Some(KeyType(code)),
            CODE_BINARY..=CODE_BINARY_LAST | CODE_STRING..=CODE_STRING_LAST => Some(KeyType(code)),
            _ => None,
        }
    }

    /// A binary variant (0..=19).
    pub fn binary(variant: u8) -> Option<Self> {
        Self::from_code(CODE_BINARY.checked_add(variant)?).filter(|t| t.is_binary())
    }

    /// A string variant (0..=214).
    pub fn string(variant: u8) -> Option<Self> {
        Self::from_code(CODE_STRING.checked_add(variant)?).filter(|t| t.is_string())
    }

    pub fn code(&self) -> u8 {
        self.0
    }

    pub fn is_binary(&self) -> bool {
        (CODE_BINARY..=CODE_BINARY_LAST).contains(&self.0)
    }

    pub fn is_string(&self) -> bool {
        (CODE_STRING..=CODE_STRING_LAST).contains(&self.0)
    }

    /// Offset within the binary or string family, `None` for the special tags.
    pub fn variant(&self) -> Option<u8> {
        if self.is_binary() {
            Some(self.0 - CODE_BINARY)
        } else if self.is_string() {
            Some(self.0 - CODE_STRING)
        } else {
            None
        }
    }
}

impl Default for KeyType {
    fn default() -> Self {
        Self::UNDEFINED
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let family = match self.0 {
            CODE_UNDEFINED => return write!(f, "undefined"),
            CODE_DIRECTORY => return write!(f, "directory"),
            CODE_LINK => return write!(f, "link"),
            _ if self.is_binary() => "binary",
            _ => "string",
        };
        match self.variant() {
            Some(0) | None => write!(f, "{}", family),
            Some(v) => write!(f, "{}+{}", family, v),
        }
    }
}

impl TryFrom<u8> for KeyType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unassigned key type code {}", code))
    }
}

impl From<KeyType> for u8 {
    fn from(t: KeyType) -> u8 {
        t.0
    }
}
