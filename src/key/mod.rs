//! Key: a single configuration entry
//!
//! A key holds a hierarchical name, an optional owner domain, a typed value,
//! a comment, and filesystem-like metadata (owner uid/gid, permission bits,
//! timestamps). It starts Uninitialized; [`Key::initialize`] or the first
//! mutator moves it to Initialized with defaults from a [`KeyEnv`].
//!
//! Every dynamic field is a private copy. Setters replace the whole field,
//! and an empty argument clears it instead of failing.

mod compare;
mod flags;
mod kind;
pub mod mode;
mod read;

pub use flags::{KeyDiff, KeyFlags};
pub use kind::KeyType;

use chrono::{DateTime, Utc};
use keyreg_name::{Namespace, NameError};

use crate::env::KeyEnv;
use crate::error::Result;

/// A configuration entry.
#[derive(Debug, Clone, Default)]
pub struct Key {
    name: Option<String>,
    user_domain: Option<String>,
    value: Option<Vec<u8>>,
    key_type: KeyType,
    comment: Option<String>,
    uid: u32,
    gid: u32,
    access: u32,
    mtime: Option<DateTime<Utc>>,
    atime: Option<DateTime<Utc>>,
    ctime: Option<DateTime<Utc>>,
    flags: KeyFlags,
    /// Context captured at initialization; `None` while uninitialized.
    env: Option<KeyEnv>,
}

impl Key {
    /// An uninitialized key.
    pub fn new() -> Self {
        Self::default()
    }

    /// An initialized key with defaults from `env`.
    pub fn new_in(env: &KeyEnv) -> Self {
        let mut key = Self::default();
        key.initialize(env);
        key
    }

    /// An initialized key carrying `name`.
    pub fn with_name(env: &KeyEnv, name: &str) -> Result<Self> {
        let mut key = Self::new_in(env);
        key.set_name(name)?;
        Ok(key)
    }

    /// Reset to Initialized with identity and permission defaults.
    ///
    /// Any existing content is discarded.
    pub fn initialize(&mut self, env: &KeyEnv) {
        *self = Key {
            uid: env.uid,
            gid: env.gid,
            access: env.default_mode(),
            flags: KeyFlags::INITIALIZED | KeyFlags::ACTIVE,
            env: Some(env.clone()),
            ..Key::default()
        };
    }

    /// Release every field and return to the Uninitialized state.
    pub fn close(&mut self) {
        *self = Key::default();
    }

    /// Mutators initialize from the process environment when needed.
    fn ensure_initialized(&mut self) {
        if !self.flags.is_initialized() {
            self.initialize(&KeyEnv::from_process());
        }
    }

    fn default_domain(&self) -> Option<&str> {
        self.env.as_ref().and_then(|env| env.user.as_deref())
    }

    /// Set the key name, returning the size of the stored canonical name.
    ///
    /// `user:<domain>/...` splits the domain out; `user/...` keeps the current
    /// domain or takes the environment's user. System names drop any domain.
    /// An empty name detaches the current one. An invalid name is rejected
    /// and the previous name kept.
    pub fn set_name(&mut self, new_name: &str) -> Result<usize> {
        if new_name.is_empty() {
            self.ensure_initialized();
            if self.name.take().is_some() {
                self.flags.remove(KeyFlags::HAS_KEY);
                self.flags.insert(KeyFlags::NEEDS_SYNC);
            }
            return Ok(0);
        }

        let parsed = keyreg_name::parse(new_name).map_err(|e| {
            tracing::trace!(name = new_name, error = %e, "rejected key name");
            e
        })?;
        let domain = match (parsed.namespace, parsed.domain) {
            (Namespace::System, _) => None,
            (Namespace::User, Some(explicit)) => Some(explicit),
            (Namespace::User, None) if self.flags.is_initialized() => self
                .user_domain
                .as_deref()
                .or(self.default_domain())
                .map(owned_str)
                .transpose()?,
            (Namespace::User, None) => KeyEnv::from_process().user,
        };
        let name = parsed.name;
        let size = name.len();
        self.ensure_initialized();

        self.name = Some(name);
        self.flags.set(KeyFlags::HAS_DOMAIN, domain.is_some());
        self.user_domain = domain;
        self.flags.insert(KeyFlags::HAS_KEY | KeyFlags::NEEDS_SYNC);
        Ok(size)
    }

    /// Set the user domain of a `user` key. Empty clears it.
    pub fn set_owner_domain(&mut self, domain: &str) -> Result<usize> {
        if domain.is_empty() {
            self.ensure_initialized();
            if self.user_domain.take().is_some() {
                self.flags.remove(KeyFlags::HAS_DOMAIN);
                self.flags.insert(KeyFlags::NEEDS_SYNC);
            }
            return Ok(0);
        }
        keyreg_name::validate_domain(domain)?;
        if self.is_system() {
            return Err(NameError::DomainOnSystem(domain.to_string()).into());
        }
        let owned = owned_str(domain)?;
        self.ensure_initialized();

        self.user_domain = Some(owned);
        self.flags.insert(KeyFlags::HAS_DOMAIN | KeyFlags::NEEDS_SYNC);
        Ok(domain.len())
    }

    /// Set the comment. Empty clears it.
    pub fn set_comment(&mut self, text: &str) -> Result<usize> {
        if text.is_empty() {
            self.ensure_initialized();
            if self.comment.take().is_some() {
                self.flags.remove(KeyFlags::HAS_COMMENT);
                self.flags.insert(KeyFlags::NEEDS_SYNC);
            }
            return Ok(0);
        }

        let comment = owned_str(text)?;
        self.ensure_initialized();
        self.comment = Some(comment);
        self.flags.insert(KeyFlags::HAS_COMMENT | KeyFlags::NEEDS_SYNC);
        Ok(text.len())
    }

    /// Replace the value verbatim without touching the type. Empty clears it.
    pub fn set_raw(&mut self, bytes: &[u8]) -> Result<usize> {
        if bytes.is_empty() {
            self.ensure_initialized();
            self.clear_value();
            return Ok(0);
        }

        let value = owned_bytes(bytes)?;
        self.ensure_initialized();
        self.value = Some(value);
        self.flags.insert(KeyFlags::HAS_DATA | KeyFlags::NEEDS_SYNC);
        Ok(bytes.len())
    }

    /// Set a text value and force the type to [`KeyType::STRING`].
    pub fn set_string(&mut self, text: &str) -> Result<usize> {
        let size = self.set_raw(text.as_bytes())?;
        self.set_type(KeyType::STRING);
        Ok(size)
    }

    /// Set a byte value and force the type to [`KeyType::BINARY`].
    pub fn set_binary(&mut self, bytes: &[u8]) -> Result<usize> {
        let size = self.set_raw(bytes)?;
        self.set_type(KeyType::BINARY);
        Ok(size)
    }

    /// Set a link target and force the type to [`KeyType::LINK`].
    pub fn set_link(&mut self, target: &str) -> Result<usize> {
        let size = self.set_raw(target.as_bytes())?;
        self.set_type(KeyType::LINK);
        Ok(size)
    }

    fn clear_value(&mut self) {
        if self.value.take().is_some() {
            self.flags.remove(KeyFlags::HAS_DATA);
            self.flags.insert(KeyFlags::NEEDS_SYNC);
        }
    }

    /// Force the value type.
    ///
    /// [`KeyType::DIRECTORY`] drops the value and marks the access bits as a
    /// directory with umask-filtered execute bits. Leaving the directory type
    /// takes those bits away again.
    pub fn set_type(&mut self, new_type: KeyType) -> KeyType {
        self.ensure_initialized();
        let exec_bits = self
            .env
            .as_ref()
            .map_or(mode::EXEC_BITS, KeyEnv::directory_exec_bits);

        if new_type == KeyType::DIRECTORY {
            self.access |= exec_bits | mode::TYPE_DIRECTORY;
            self.clear_value();
        } else if mode::is_directory(self.access) {
            self.access &= !(mode::TYPE_MASK | exec_bits);
        }
        self.key_type = new_type;
        self.flags.insert(KeyFlags::NEEDS_SYNC);
        new_type
    }

    pub fn set_uid(&mut self, uid: u32) {
        self.ensure_initialized();
        self.uid = uid;
        self.flags.insert(KeyFlags::HAS_UID | KeyFlags::NEEDS_SYNC);
    }

    pub fn set_gid(&mut self, gid: u32) {
        self.ensure_initialized();
        self.gid = gid;
        self.flags.insert(KeyFlags::HAS_GID | KeyFlags::NEEDS_SYNC);
    }

    /// Set the full mode, file-type bits included.
    pub fn set_access(&mut self, mode: u32) {
        self.ensure_initialized();
        self.access = mode;
        self.flags.insert(KeyFlags::HAS_PERMISSION | KeyFlags::NEEDS_SYNC);
    }

    /// Record storage timestamps. Used by backends on load; not a content change.
    pub fn stamp_times(
        &mut self,
        mtime: DateTime<Utc>,
        atime: DateTime<Utc>,
        ctime: DateTime<Utc>,
    ) {
        self.ensure_initialized();
        self.mtime = Some(mtime);
        self.atime = Some(atime);
        self.ctime = Some(ctime);
    }

    /// Clear the dirty flag after a load or commit.
    pub fn mark_synced(&mut self) {
        self.flags.remove(KeyFlags::NEEDS_SYNC);
    }

    pub fn set_user_flag(&mut self) {
        self.ensure_initialized();
        self.flags.insert(KeyFlags::USER_FLAG);
    }

    pub fn clear_user_flag(&mut self) {
        self.flags.remove(KeyFlags::USER_FLAG);
    }

    /// Deep copy with fallible allocation. Flags are copied verbatim.
    pub fn duplicate(&self) -> Result<Key> {
        Ok(Key {
            name: self.name.as_deref().map(owned_str).transpose()?,
            user_domain: self.user_domain.as_deref().map(owned_str).transpose()?,
            value: self.value.as_deref().map(owned_bytes).transpose()?,
            comment: self.comment.as_deref().map(owned_str).transpose()?,
            env: self.env.clone(),
            ..*self
        })
    }

    /// Replace this key with a deep copy of `source`.
    ///
    /// The copy is built first, so on failure this key is unchanged.
    pub fn copy_from(&mut self, source: &Key) -> Result<()> {
        *self = source.duplicate()?;
        Ok(())
    }
}

fn owned_str(src: &str) -> Result<String> {
    let mut out = String::new();
    out.try_reserve_exact(src.len())?;
    out.push_str(src);
    Ok(out)
}

fn owned_bytes(src: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.try_reserve_exact(src.len())?;
    out.extend_from_slice(src);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyError;

    fn env() -> KeyEnv {
        KeyEnv::new(1000, 100, 0o022, Some("alice"))
    }

    #[test]
    fn test_initialize_applies_env() {
        let key = Key::new_in(&env());
        assert!(key.is_initialized());
        assert!(!key.needs_sync());
        assert_eq!(key.uid(), 1000);
        assert_eq!(key.gid(), 100);
        assert_eq!(key.access(), 0o644);
        assert_eq!(key.key_type(), KeyType::UNDEFINED);
    }

    #[test]
    fn test_new_key_is_uninitialized() {
        let key = Key::new();
        assert!(!key.is_initialized());
        assert_eq!(key.flags(), KeyFlags::empty());
    }

    #[test]
    fn test_close_resets_everything() {
        let mut key = Key::with_name(&env(), "user/a").unwrap();
        key.set_string("v").unwrap();
        key.set_comment("c").unwrap();
        key.close();
        assert!(!key.is_initialized());
        assert!(key.name().is_none());
        assert!(key.value().is_none());
        assert!(key.comment().is_none());
        assert!(key.owner_domain().is_none());
    }

    #[test]
    fn test_set_name_user_domain_default() {
        let mut key = Key::new_in(&env());
        assert_eq!(key.set_name("user/sw/app").unwrap(), 11);
        assert_eq!(key.name(), Some("user/sw/app"));
        assert_eq!(key.owner_domain(), Some("alice"));
        let expected = KeyFlags::HAS_KEY | KeyFlags::HAS_DOMAIN | KeyFlags::NEEDS_SYNC;
        assert!(key.flags().contains(expected));
    }

    #[test]
    fn test_set_name_keeps_existing_domain() {
        let mut key = Key::with_name(&env(), "user:bob/a").unwrap();
        key.set_name("user/b").unwrap();
        assert_eq!(key.owner_domain(), Some("bob"));
    }

    #[test]
    fn test_set_name_system_drops_domain() {
        let mut key = Key::with_name(&env(), "user:bob/a").unwrap();
        key.set_name("system/a").unwrap();
        assert!(key.owner_domain().is_none());
        assert!(!key.flags().contains(KeyFlags::HAS_DOMAIN));
    }

    #[test]
    fn test_set_name_without_env_user() {
        let anon = KeyEnv::new(0, 0, 0o022, None);
        let key = Key::with_name(&anon, "user/a").unwrap();
        assert!(key.owner_domain().is_none());
        assert_eq!(key.full_name().as_deref(), Some("user/a"));
    }

    #[test]
    fn test_set_name_rejects_and_keeps_previous() {
        let mut key = Key::with_name(&env(), "system/keep").unwrap();
        let err = key.set_name("etc/passwd").unwrap_err();
        assert!(matches!(err, KeyError::InvalidName(NameError::InvalidRoot(_))));
        assert!(matches!(
            key.set_name("user?x/a"),
            Err(KeyError::InvalidName(NameError::UnknownSeparator(_)))
        ));
        assert_eq!(key.name(), Some("system/keep"));
    }

    #[test]
    fn test_set_name_empty_detaches() {
        let mut key = Key::with_name(&env(), "system/a").unwrap();
        key.mark_synced();
        assert_eq!(key.set_name("").unwrap(), 0);
        assert!(key.name().is_none());
        assert!(!key.flags().contains(KeyFlags::HAS_KEY));
        assert!(key.needs_sync());
    }

    #[test]
    fn test_mutator_initializes_from_process() {
        let mut key = Key::new();
        key.set_comment("hello").unwrap();
        assert!(key.is_initialized());
        assert_eq!(key.comment(), Some("hello"));
    }

    #[test]
    fn test_rejected_name_leaves_key_uninitialized() {
        let mut key = Key::new();
        assert!(key.set_name("etc/passwd").is_err());
        assert!(!key.is_initialized());
        assert_eq!(key.flags(), KeyFlags::empty());

        assert!(key.set_owner_domain("a/b").is_err());
        assert!(!key.is_initialized());
    }

    #[test]
    fn test_auto_init_user_name_takes_process_user() {
        let mut key = Key::new();
        key.set_name("user/a").unwrap();
        assert!(key.is_initialized());
        assert_eq!(key.owner_domain(), KeyEnv::from_process().user.as_deref());
    }

    #[test]
    fn test_set_owner_domain() {
        let mut key = Key::with_name(&env(), "user/a").unwrap();
        assert_eq!(key.set_owner_domain("carol").unwrap(), 5);
        assert_eq!(key.full_name().as_deref(), Some("user:carol/a"));

        assert_eq!(key.set_owner_domain("").unwrap(), 0);
        assert!(key.owner_domain().is_none());
        assert!(!key.flags().contains(KeyFlags::HAS_DOMAIN));

        assert!(matches!(
            key.set_owner_domain("a/b"),
            Err(KeyError::InvalidName(NameError::InvalidDomain(_)))
        ));
    }

    #[test]
    fn test_set_owner_domain_rejected_for_system() {
        let mut key = Key::with_name(&env(), "system/a").unwrap();
        assert!(matches!(
            key.set_owner_domain("bob"),
            Err(KeyError::InvalidName(NameError::DomainOnSystem(_)))
        ));
        assert!(key.owner_domain().is_none());
    }

    #[test]
    fn test_clear_comment_on_empty_key_is_noop() {
        let mut key = Key::new_in(&env());
        let before = key.flags();
        assert_eq!(key.set_comment("").unwrap(), 0);
        assert_eq!(key.flags(), before);
    }

    #[test]
    fn test_setters_mark_dirty() {
        let mut key = Key::new_in(&env());
        key.set_uid(1);
        assert!(key.needs_sync());
        key.mark_synced();
        key.set_gid(2);
        assert!(key.flags().contains(KeyFlags::HAS_GID | KeyFlags::NEEDS_SYNC));
        key.mark_synced();
        key.set_access(0o600);
        assert!(key.flags().contains(KeyFlags::HAS_PERMISSION | KeyFlags::NEEDS_SYNC));
        key.mark_synced();
        key.set_binary(&[1, 2, 3]).unwrap();
        assert!(key.flags().contains(KeyFlags::HAS_DATA | KeyFlags::NEEDS_SYNC));
    }

    #[test]
    fn test_value_setters_force_type() {
        let mut key = Key::new_in(&env());
        key.set_string("text").unwrap();
        assert_eq!(key.key_type(), KeyType::STRING);
        key.set_binary(b"\x00\x01").unwrap();
        assert_eq!(key.key_type(), KeyType::BINARY);
        key.set_link("system/target").unwrap();
        assert_eq!(key.key_type(), KeyType::LINK);
        key.set_raw(b"raw").unwrap();
        assert_eq!(key.key_type(), KeyType::LINK, "set_raw leaves the type alone");
        assert_eq!(key.value(), Some(&b"raw"[..]));
    }

    #[test]
    fn test_empty_string_clears_value() {
        let mut key = Key::new_in(&env());
        key.set_string("x").unwrap();
        assert_eq!(key.set_string("").unwrap(), 0);
        assert!(key.value().is_none());
        assert!(!key.flags().contains(KeyFlags::HAS_DATA));
        assert_eq!(key.key_type(), KeyType::STRING);
    }

    #[test]
    fn test_directory_type_clears_value_and_sets_mode() {
        let mut key = Key::new_in(&env());
        key.set_string("x").unwrap();
        key.set_type(KeyType::DIRECTORY);
        assert!(key.value().is_none());
        assert!(key.is_directory());
        assert_eq!(key.access(), mode::TYPE_DIRECTORY | 0o755);

        key.set_type(KeyType::STRING);
        assert!(!key.is_directory());
        assert_eq!(key.access(), 0o644);
    }

    #[test]
    fn test_non_directory_type_keeps_exec_bits() {
        let mut key = Key::new_in(&env());
        key.set_access(0o755);
        key.set_string("script").unwrap();
        assert_eq!(key.access(), 0o755);
    }

    #[test]
    fn test_duplicate_is_independent() {
        let mut a = Key::with_name(&env(), "user/a").unwrap();
        a.set_string("one").unwrap();
        a.set_comment("first").unwrap();
        a.set_user_flag();

        let mut b = a.duplicate().unwrap();
        assert_eq!(b.flags(), a.flags());
        assert!(a.compare(&b).is_empty());

        b.set_string("two").unwrap();
        b.set_comment("second").unwrap();
        b.set_name("user/b").unwrap();
        assert_eq!(a.value_str(), Some("one"));
        assert_eq!(a.comment(), Some("first"));
        assert_eq!(a.name(), Some("user/a"));

        a.set_string("three").unwrap();
        assert_eq!(b.value_str(), Some("two"));
    }

    #[test]
    fn test_copy_from_resets_destination() {
        let source = Key::with_name(&env(), "system/src").unwrap();
        let mut dest = Key::with_name(&env(), "system/dest").unwrap();
        dest.set_comment("stale").unwrap();
        dest.copy_from(&source).unwrap();
        assert_eq!(dest.name(), Some("system/src"));
        assert!(dest.comment().is_none());
    }

    #[test]
    fn test_stamp_times_does_not_dirty() {
        let mut key = Key::with_name(&env(), "system/a").unwrap();
        key.mark_synced();
        let now = Utc::now();
        key.stamp_times(now, now, now);
        assert_eq!(key.mtime(), Some(now));
        assert_eq!(key.atime(), Some(now));
        assert_eq!(key.ctime(), Some(now));
        assert!(!key.needs_sync());
    }

    #[test]
    fn test_user_flag() {
        let mut key = Key::new_in(&env());
        assert!(!key.user_flag());
        key.set_user_flag();
        assert!(key.user_flag());
        key.clear_user_flag();
        assert!(!key.user_flag());
    }
}
