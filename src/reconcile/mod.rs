//! Three-way reconciliation of a working key set against a second set
//!
//! Every key of `current` is matched by full name (path plus owner domain)
//! against `incoming`:
//! - match, structurally equal: the incoming copy is dropped
//! - match, different: the current copy is closed and the incoming copy
//!   takes its position
//! - no match: the current key moves to the tail of `removed`
//!
//! Incoming keys left unmatched are appended to `current` in their order.
//! `incoming` is always empty afterwards. Duplicate names pair up in list
//! order, the first current key with the first incoming key.

use serde::Serialize;
use std::collections::{HashMap, LinkedList, VecDeque};
use std::fmt;

use crate::key::Key;
use crate::keyset::KeySet;

/// Counts of how each key was routed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Current keys kept as they were
    pub unchanged: usize,
    /// Current keys replaced in place by their incoming version
    pub replaced: usize,
    /// Current keys moved to the removed set
    pub removed: usize,
    /// Incoming keys appended to current
    pub added: usize,
}

impl ReconcileReport {
    /// True when reconciliation changed nothing in `current`.
    pub fn is_noop(&self) -> bool {
        self.replaced == 0 && self.removed == 0 && self.added == 0
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} unchanged, {} replaced, {} removed, {} added",
            self.unchanged, self.replaced, self.removed, self.added
        )
    }
}

type Identity = (Option<String>, Option<String>);

fn identity(key: &Key) -> Identity {
    (
        key.name().map(str::to_string),
        key.owner_domain().map(str::to_string),
    )
}

/// Reconcile `current` against `incoming`, moving unmatched current keys
/// into `removed`.
///
/// `current` and `incoming` are rewound on return; `removed` keeps its
/// cursor.
pub fn reconcile(
    current: &mut KeySet,
    incoming: &mut KeySet,
    removed: &mut KeySet,
) -> ReconcileReport {
    let mut pending: Vec<Option<Key>> = incoming.drain_keys().into_iter().map(Some).collect();

    let mut by_name: HashMap<Identity, VecDeque<usize>> = HashMap::with_capacity(pending.len());
    for (pos, key) in pending.iter().enumerate() {
        if let Some(key) = key {
            by_name.entry(identity(key)).or_default().push_back(pos);
        }
    }

    let mut report = ReconcileReport::default();
    let mut survivors = LinkedList::new();

    for mut ours in current.drain_keys() {
        let theirs = by_name
            .get_mut(&identity(&ours))
            .and_then(VecDeque::pop_front)
            .and_then(|pos| pending[pos].take());

        match theirs {
            Some(theirs) if ours.compare(&theirs).is_empty() => {
                report.unchanged += 1;
                survivors.push_back(ours);
            }
            Some(theirs) => {
                tracing::trace!(
                    name = ?theirs.full_name(),
                    diff = ?ours.compare(&theirs),
                    "replacing key"
                );
                ours.close();
                report.replaced += 1;
                survivors.push_back(theirs);
            }
            None => {
                report.removed += 1;
                removed.append(ours);
            }
        }
    }

    for key in pending.into_iter().flatten() {
        report.added += 1;
        survivors.push_back(key);
    }

    current.restore_keys(survivors);
    tracing::debug!(
        unchanged = report.unchanged,
        replaced = report.replaced,
        removed = report.removed,
        added = report.added,
        "reconciled key sets"
    );
    report
}
