//! Lifecycle flags and comparison bits.

use crate::key::mode;

bitflags::bitflags! {
    /// State and presence bits a key carries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyFlags: u32 {
        /// Key was initialized; required before any other operation.
        const INITIALIZED = 1 << 0;
        const ACTIVE = 1 << 1;
        /// Durable content changed since the last load or commit.
        const NEEDS_SYNC = 1 << 2;
        const HAS_KEY = 1 << 3;
        const HAS_DOMAIN = 1 << 4;
        const HAS_COMMENT = 1 << 5;
        const HAS_DATA = 1 << 6;
        const HAS_UID = 1 << 7;
        const HAS_GID = 1 << 8;
        const HAS_PERMISSION = 1 << 9;
        /// Free boolean for the host application.
        const USER_FLAG = 1 << 10;
    }
}

bitflags::bitflags! {
    /// Facets in which two keys differ; empty means structurally equal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyDiff: u32 {
        const UID = 1 << 0;
        const GID = 1 << 1;
        const TYPE = 1 << 2;
        /// rwx bits only; file-type bits are ignored.
        const PERMISSION = 1 << 3;
        const NAME = 1 << 4;
        const COMMENT = 1 << 5;
        const DOMAIN = 1 << 6;
        const DATA = 1 << 7;

        /// Name and owner domain together: the full-name identity.
        const FULL_NAME = Self::NAME.bits() | Self::DOMAIN.bits();
    }
}

impl KeyDiff {
    /// True when the two keys share a full name.
    pub fn same_full_name(&self) -> bool {
        !self.intersects(KeyDiff::FULL_NAME)
    }
}

impl KeyFlags {
    pub fn is_initialized(&self) -> bool {
        self.contains(KeyFlags::INITIALIZED)
    }

    pub fn needs_sync(&self) -> bool {
        self.contains(KeyFlags::NEEDS_SYNC)
    }
}

/// Compare permission bits as the diff does.
pub(crate) fn permission_differs(a: u32, b: u32) -> bool {
    (a & mode::PERMISSION_BITS) != (b & mode::PERMISSION_BITS)
}
