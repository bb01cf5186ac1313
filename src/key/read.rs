//! Read access to a key.
//!
//! Borrowed views (`name()`, `value()`, ...) return `None` for an absent
//! field. The `get_*` family copies into a caller buffer: it reports the
//! bytes written, `FieldAbsent` when there is nothing to copy, and
//! `Truncated` without writing anything when the buffer is too small.

use chrono::{DateTime, Utc};
use keyreg_name::{Namespace, DOMAIN_SEPARATOR, USER_ROOT};

use super::{mode, Key, KeyFlags, KeyType};
use crate::error::{copy_out, Field, KeyError, Result};

impl Key {
    pub fn is_initialized(&self) -> bool {
        self.flags.is_initialized()
    }

    pub fn needs_sync(&self) -> bool {
        self.flags.needs_sync()
    }

    pub fn flags(&self) -> KeyFlags {
        self.flags
    }

    /// The host application's free boolean.
    pub fn user_flag(&self) -> bool {
        self.flags.contains(KeyFlags::USER_FLAG)
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn gid(&self) -> u32 {
        self.gid
    }

    /// Full mode, including file-type bits.
    pub fn access(&self) -> u32 {
        self.access
    }

    pub fn mtime(&self) -> Option<DateTime<Utc>> {
        self.mtime
    }

    pub fn atime(&self) -> Option<DateTime<Utc>> {
        self.atime
    }

    pub fn ctime(&self) -> Option<DateTime<Utc>> {
        self.ctime
    }

    /// Canonical name, without the user domain.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn owner_domain(&self) -> Option<&str> {
        self.user_domain.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    /// The value as text, when it is valid UTF-8.
    pub fn value_str(&self) -> Option<&str> {
        self.value().and_then(|v| std::str::from_utf8(v).ok())
    }

    /// Name with the domain re-interleaved for user keys.
    pub fn full_name(&self) -> Option<String> {
        let name = self.name.as_deref()?;
        Some(keyreg_name::full_name(name, self.user_domain.as_deref()))
    }

    pub fn namespace(&self) -> Option<Namespace> {
        if !self.is_initialized() {
            return None;
        }
        self.name.as_deref().and_then(keyreg_name::namespace)
    }

    pub fn is_system(&self) -> bool {
        self.namespace() == Some(Namespace::System)
    }

    pub fn is_user(&self) -> bool {
        self.namespace() == Some(Namespace::User)
    }

    /// A directory by mode bits or by type.
    pub fn is_directory(&self) -> bool {
        self.is_initialized()
            && (mode::is_directory(self.access) || self.key_type == KeyType::DIRECTORY)
    }

    /// A link by mode bits or by type.
    pub fn is_link(&self) -> bool {
        self.is_initialized() && (mode::is_link(self.access) || self.key_type == KeyType::LINK)
    }

    pub fn root_name(&self) -> Option<&str> {
        self.name.as_deref().map(keyreg_name::root_name)
    }

    /// Root token with the domain re-interleaved: `user:alice` for user keys.
    pub fn full_root_name(&self) -> Option<String> {
        let root = self.root_name()?;
        match (self.is_user(), self.user_domain.as_deref()) {
            (true, Some(domain)) => Some(format!("{}{}{}", USER_ROOT, DOMAIN_SEPARATOR, domain)),
            _ => Some(root.to_string()),
        }
    }

    /// Final path component, `None` for a root key.
    pub fn base_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(keyreg_name::base_name)
            .filter(|base| !base.is_empty())
    }

    /// Name without its final component, `None` when there is no parent.
    pub fn parent_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(keyreg_name::parent_name)
            .filter(|parent| !parent.is_empty())
    }

    pub fn name_size(&self) -> usize {
        self.name.as_ref().map_or(0, String::len)
    }

    pub fn full_name_size(&self) -> usize {
        match (self.is_user(), self.user_domain.as_ref()) {
            (true, Some(domain)) => self.name_size() + domain.len() + 1,
            _ => self.name_size(),
        }
    }

    pub fn comment_size(&self) -> usize {
        self.comment.as_ref().map_or(0, String::len)
    }

    pub fn data_size(&self) -> usize {
        self.value.as_ref().map_or(0, Vec::len)
    }

    pub fn root_name_size(&self) -> usize {
        self.name.as_deref().map_or(0, keyreg_name::root_name_size)
    }

    pub fn full_root_name_size(&self) -> usize {
        self.full_root_name().map_or(0, |root| root.len())
    }

    pub fn base_name_size(&self) -> usize {
        self.name.as_deref().map_or(0, keyreg_name::base_name_size)
    }

    pub fn parent_size(&self) -> usize {
        self.name.as_deref().map_or(0, keyreg_name::parent_size)
    }

    fn check_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(KeyError::Uninitialized)
        }
    }

    fn present<'a, T: ?Sized>(&self, field: Option<&'a T>, which: Field) -> Result<&'a T> {
        self.check_initialized()?;
        field.ok_or(KeyError::FieldAbsent(which))
    }

    pub fn get_name(&self, buf: &mut [u8]) -> Result<usize> {
        let name = self.present(self.name.as_deref(), Field::Name)?;
        copy_out(name.as_bytes(), buf)
    }

    pub fn get_full_name(&self, buf: &mut [u8]) -> Result<usize> {
        self.present(self.name.as_deref(), Field::Name)?;
        let full = self.full_name().unwrap_or_default();
        copy_out(full.as_bytes(), buf)
    }

    pub fn get_owner_domain(&self, buf: &mut [u8]) -> Result<usize> {
        let domain = self.present(self.user_domain.as_deref(), Field::OwnerDomain)?;
        copy_out(domain.as_bytes(), buf)
    }

    pub fn get_comment(&self, buf: &mut [u8]) -> Result<usize> {
        let comment = self.present(self.comment.as_deref(), Field::Comment)?;
        copy_out(comment.as_bytes(), buf)
    }

    /// Copy a string value; other types report `TypeMismatch`.
    pub fn get_string(&self, buf: &mut [u8]) -> Result<usize> {
        let value = self.present(self.value.as_deref(), Field::Value)?;
        if !self.key_type.is_string() {
            return Err(KeyError::TypeMismatch {
                requested: KeyType::STRING,
                actual: self.key_type,
            });
        }
        copy_out(value, buf)
    }

    /// Copy the value bytes whatever the type.
    pub fn get_binary(&self, buf: &mut [u8]) -> Result<usize> {
        let value = self.present(self.value.as_deref(), Field::Value)?;
        copy_out(value, buf)
    }

    /// Copy a link target; other types report `TypeMismatch`.
    pub fn get_link(&self, buf: &mut [u8]) -> Result<usize> {
        let value = self.present(self.value.as_deref(), Field::Value)?;
        if self.key_type != KeyType::LINK {
            return Err(KeyError::TypeMismatch {
                requested: KeyType::LINK,
                actual: self.key_type,
            });
        }
        copy_out(value, buf)
    }

    pub fn get_root_name(&self, buf: &mut [u8]) -> Result<usize> {
        let root = self.present(self.root_name(), Field::Name)?;
        copy_out(root.as_bytes(), buf)
    }

    pub fn get_full_root_name(&self, buf: &mut [u8]) -> Result<usize> {
        self.present(self.name.as_deref(), Field::Name)?;
        let root = self.full_root_name().unwrap_or_default();
        copy_out(root.as_bytes(), buf)
    }

    pub fn get_base_name(&self, buf: &mut [u8]) -> Result<usize> {
        self.present(self.name.as_deref(), Field::Name)?;
        let base = self.present(self.base_name(), Field::BaseName)?;
        copy_out(base.as_bytes(), buf)
    }

    pub fn get_parent_name(&self, buf: &mut [u8]) -> Result<usize> {
        self.present(self.name.as_deref(), Field::Name)?;
        let parent = self.present(self.parent_name(), Field::ParentName)?;
        copy_out(parent.as_bytes(), buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::KeyEnv;

    fn env() -> KeyEnv {
        KeyEnv::new(1000, 100, 0o022, Some("alice"))
    }

    #[test]
    fn test_uninitialized_getters() {
        let key = Key::new();
        let mut buf = [0u8; 16];
        assert_eq!(key.get_name(&mut buf), Err(KeyError::Uninitialized));
        assert_eq!(key.get_comment(&mut buf), Err(KeyError::Uninitialized));
        assert_eq!(key.get_binary(&mut buf), Err(KeyError::Uninitialized));
        assert!(key.namespace().is_none());
        assert!(!key.is_directory());
    }

    #[test]
    fn test_absent_fields() {
        let key = Key::new_in(&env());
        let mut buf = [0u8; 16];
        assert_eq!(key.get_name(&mut buf), Err(KeyError::FieldAbsent(Field::Name)));
        assert_eq!(key.get_comment(&mut buf), Err(KeyError::FieldAbsent(Field::Comment)));
        assert_eq!(
            key.get_owner_domain(&mut buf),
            Err(KeyError::FieldAbsent(Field::OwnerDomain))
        );
        assert_eq!(key.get_string(&mut buf), Err(KeyError::FieldAbsent(Field::Value)));
    }

    #[test]
    fn test_name_parts() {
        let key = Key::with_name(&env(), "user:bob/net/eth0").unwrap();
        assert_eq!(key.root_name(), Some("user"));
        assert_eq!(key.full_root_name().as_deref(), Some("user:bob"));
        assert_eq!(key.base_name(), Some("eth0"));
        assert_eq!(key.parent_name(), Some("user/net"));
        assert_eq!(key.name_size(), 13);
        assert_eq!(key.full_name_size(), 17);
        assert_eq!(key.root_name_size(), 4);
        assert_eq!(key.full_root_name_size(), 8);
        assert_eq!(key.base_name_size(), 4);
        assert_eq!(key.parent_size(), 8);

        let mut buf = [0u8; 32];
        let n = key.get_full_root_name(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"user:bob");
        let n = key.get_parent_name(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"user/net");
        let n = key.get_base_name(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"eth0");
        let n = key.get_root_name(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"user");
    }

    #[test]
    fn test_root_key_has_no_base_or_parent() {
        let key = Key::with_name(&env(), "system").unwrap();
        let mut buf = [0u8; 16];
        assert!(key.base_name().is_none());
        assert!(key.parent_name().is_none());
        assert_eq!(key.get_base_name(&mut buf), Err(KeyError::FieldAbsent(Field::BaseName)));
        assert_eq!(
            key.get_parent_name(&mut buf),
            Err(KeyError::FieldAbsent(Field::ParentName))
        );
        assert_eq!(key.full_root_name().as_deref(), Some("system"));
    }

    #[test]
    fn test_top_level_child_parent_is_root() {
        let key = Key::with_name(&env(), "system/a").unwrap();
        assert_eq!(key.parent_name(), Some("system"));
    }

    #[test]
    fn test_get_string_type_checks() {
        let mut key = Key::new_in(&env());
        key.set_binary(b"\xff\x00").unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(
            key.get_string(&mut buf),
            Err(KeyError::TypeMismatch {
                requested: KeyType::STRING,
                actual: KeyType::BINARY
            })
        );
        assert_eq!(key.get_binary(&mut buf), Ok(2));

        key.set_type(KeyType::string(3).unwrap());
        assert_eq!(key.get_string(&mut buf), Ok(2), "string variants read as text");
    }

    #[test]
    fn test_get_link() {
        let mut key = Key::new_in(&env());
        key.set_string("system/target").unwrap();
        let mut buf = [0u8; 32];
        assert!(matches!(key.get_link(&mut buf), Err(KeyError::TypeMismatch { .. })));

        key.set_link("system/target").unwrap();
        assert!(key.is_link());
        let n = key.get_link(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"system/target");
    }

    #[test]
    fn test_link_by_mode_bits() {
        let mut key = Key::new_in(&env());
        key.set_access(mode::TYPE_LINK | 0o777);
        assert!(key.is_link());
        assert!(!key.is_directory());
    }

    #[test]
    fn test_truncated_writes_nothing() {
        let mut key = Key::new_in(&env());
        key.set_comment("twelve bytes").unwrap();
        let mut buf = [b'.'; 11];
        assert_eq!(
            key.get_comment(&mut buf),
            Err(KeyError::Truncated {
                required: 12,
                capacity: 11
            })
        );
        assert_eq!(&buf, b"...........");
    }

    #[test]
    fn test_value_str() {
        let mut key = Key::new_in(&env());
        key.set_string("ünïcode").unwrap();
        assert_eq!(key.value_str(), Some("ünïcode"));
        key.set_binary(&[0xff, 0xfe]).unwrap();
        assert!(key.value_str().is_none());
    }
}
