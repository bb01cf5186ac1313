//! keyreg - hierarchical configuration registry core
//!
//! This crate holds the in-memory model of a key/value configuration
//! registry: keys with `/`-delimited names under a `system` or `user`
//! namespace, ordered key sets, and the reconciliation that commits a
//! working set against a reference set. Storage backends, serializers and
//! format parsers sit outside and talk to it through this API.
//!
//! Nothing here does I/O. Diagnostics go through `tracing` at `debug` and
//! `trace` level and stay silent unless the host installs a subscriber.

pub mod env;
pub mod error;
pub mod key;
pub mod keyset;
pub mod reconcile;

pub use env::{EnvOverrides, KeyEnv};
pub use error::{Field, KeyError, Result};
pub use key::{Key, KeyDiff, KeyFlags, KeyType};
pub use keyreg_name::{NameError, Namespace};
pub use keyset::KeySet;
pub use reconcile::{reconcile, ReconcileReport};
