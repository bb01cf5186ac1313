//! Key environment
//!
//! Identity and permission defaults a key picks up when it is initialized.
//! Layers, lowest precedence first:
//! 1. Captured process state (uid, gid, umask, `$USER`)
//! 2. Host overrides (TOML, every field optional)
//!
//! Tests build a fixed environment with [`KeyEnv::new`] instead of reading
//! process state.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{KeyError, Result};

/// Base permission bits before the umask is applied.
pub const BASE_MODE: u32 = 0o666;

/// Execute bits granted to directory keys before the umask is applied.
pub const BASE_DIR_EXEC: u32 = 0o111;

/// Umask assumed where the platform has none.
pub const FALLBACK_UMASK: u32 = 0o022;

/// Identity and permission context for key creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEnv {
    /// Owner uid given to new keys
    pub uid: u32,

    /// Owner gid given to new keys
    pub gid: u32,

    /// Umask applied to [`BASE_MODE`] and [`BASE_DIR_EXEC`]
    pub umask: u32,

    /// Default user domain for `user/...` names without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Host-supplied overrides; unset fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvOverrides {
    #[serde(default)]
    pub uid: Option<u32>,
    #[serde(default)]
    pub gid: Option<u32>,
    #[serde(default)]
    pub umask: Option<u32>,
    #[serde(default)]
    pub user: Option<String>,
}

impl KeyEnv {
    /// Build a fixed environment.
    pub fn new(uid: u32, gid: u32, umask: u32, user: Option<&str>) -> Self {
        Self {
            uid,
            gid,
            umask: umask & 0o777,
            user: user.filter(|u| !u.is_empty()).map(str::to_string),
        }
    }

    /// The process's identity, umask and `$USER`.
    ///
    /// Captured once on first use and shared afterwards. Reading the umask
    /// briefly changes it, so it is never read again once cached; later
    /// `umask(2)` calls by the host are not seen.
    pub fn from_process() -> Self {
        static PROCESS_ENV: OnceLock<KeyEnv> = OnceLock::new();
        PROCESS_ENV.get_or_init(Self::capture_process).clone()
    }

    fn capture_process() -> Self {
        let user = std::env::var("USER").ok();
        let (uid, gid, umask) = process_identity();
        Self::new(uid, gid, umask, user.as_deref())
    }

    /// Lay `overrides` over this environment.
    pub fn apply(mut self, overrides: EnvOverrides) -> Self {
        if let Some(uid) = overrides.uid {
            self.uid = uid;
        }
        if let Some(gid) = overrides.gid {
            self.gid = gid;
        }
        if let Some(umask) = overrides.umask {
            self.umask = umask & 0o777;
        }
        if let Some(user) = overrides.user {
            self.user = if user.is_empty() { None } else { Some(user) };
        }
        self
    }

    /// Parse TOML overrides and apply them to `base`.
    pub fn from_toml_overrides(base: KeyEnv, text: &str) -> Result<Self> {
        let overrides: EnvOverrides =
            toml::from_str(text).map_err(|e| KeyError::InvalidConfig(e.to_string()))?;
        if let Some(umask) = overrides.umask.filter(|m| *m > 0o777) {
            return Err(KeyError::InvalidConfig(format!(
                "umask {:o} has bits outside 0777",
                umask
            )));
        }
        Ok(base.apply(overrides))
    }

    /// Permission bits for a freshly initialized key.
    pub fn default_mode(&self) -> u32 {
        BASE_MODE & !self.umask
    }

    /// Execute bits a key gains when it becomes a directory.
    pub fn directory_exec_bits(&self) -> u32 {
        BASE_DIR_EXEC & !self.umask
    }
}

impl Default for KeyEnv {
    fn default() -> Self {
        Self::from_process()
    }
}

#[cfg(unix)]
fn process_identity() -> (u32, u32, u32) {
    // SAFETY: getuid/getgid cannot fail; umask is set and immediately
    // restored, the only way to read it.
    unsafe {
        let uid = libc::getuid();
        let gid = libc::getgid();
        let mask = libc::umask(0);
        libc::umask(mask);
        (uid as u32, gid as u32, mask as u32)
    }
}

#[cfg(not(unix))]
fn process_identity() -> (u32, u32, u32) {
    (0, 0, FALLBACK_UMASK)
}
