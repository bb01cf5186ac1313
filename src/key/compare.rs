//! Structural comparison of two keys.

use super::flags::permission_differs;
use super::{Key, KeyDiff};

impl Key {
    /// Report every facet in which `self` and `other` differ.
    ///
    /// An empty result means the keys are structurally equal. Absent text
    /// fields compare equal only to absent. Values are compared over the
    /// length of the shorter one, so a value that is a prefix of the other
    /// does not set [`KeyDiff::DATA`].
    pub fn compare(&self, other: &Key) -> KeyDiff {
        let mut diff = KeyDiff::empty();

        diff.set(KeyDiff::UID, self.uid != other.uid);
        diff.set(KeyDiff::GID, self.gid != other.gid);
        diff.set(KeyDiff::TYPE, self.key_type != other.key_type);
        diff.set(KeyDiff::PERMISSION, permission_differs(self.access, other.access));
        diff.set(KeyDiff::NAME, self.name != other.name);
        diff.set(KeyDiff::COMMENT, self.comment != other.comment);
        diff.set(KeyDiff::DOMAIN, self.user_domain != other.user_domain);

        let ours = self.value.as_deref().unwrap_or_default();
        let theirs = other.value.as_deref().unwrap_or_default();
        let common = ours.len().min(theirs.len());
        diff.set(KeyDiff::DATA, ours[..common] != theirs[..common]);

        diff
    }
}
