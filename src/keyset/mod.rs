//! KeySet: an ordered collection of keys with a navigation cursor
//!
//! - `insert` puts a key at the head, `append` at the tail
//! - `insert_all` / `append_all` move every key out of another set,
//!   leaving it empty
//! - `next` walks the set round-robin: after the last key it yields `None`
//!   once, then starts again from the first
//!
//! The set owns its keys. Moving a key into another set moves ownership;
//! nothing is copied unless the caller duplicates it first.
//!
//! Keys live in two linked lists split at the cursor: `visited` ends with
//! the key `next` last returned, `ahead` holds the rest. Every splice,
//! cursor step and rewind is a constant number of list relinks.

use std::collections::{linked_list, LinkedList};
use std::iter::Chain;

use crate::key::Key;

/// Ordered, owning collection of keys.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    /// Keys up to and including the cursor; empty means "before the first".
    visited: LinkedList<Key>,
    ahead: LinkedList<Key>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.visited.len() + self.ahead.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty() && self.ahead.is_empty()
    }

    /// The list holding the first key.
    fn front_list(&mut self) -> &mut LinkedList<Key> {
        if self.visited.is_empty() {
            &mut self.ahead
        } else {
            &mut self.visited
        }
    }

    /// Put `key` at the head. The cursor stays on the key it pointed at.
    /// Returns the new size.
    pub fn insert(&mut self, key: Key) -> usize {
        self.front_list().push_front(key);
        self.len()
    }

    /// Put `key` at the tail. Returns the new size.
    pub fn append(&mut self, key: Key) -> usize {
        self.ahead.push_back(key);
        self.len()
    }

    /// Move every key of `other` to the head, keeping their order.
    /// `other` is left empty and rewound.
    pub fn insert_all(&mut self, other: &mut KeySet) -> usize {
        let mut spliced = other.drain_keys();
        let moved = spliced.len();
        let front = self.front_list();
        spliced.append(front);
        *front = spliced;
        tracing::trace!(moved, size = self.len(), "spliced key set at head");
        self.len()
    }

    /// Move every key of `other` to the tail, keeping their order.
    /// `other` is left empty and rewound.
    pub fn append_all(&mut self, other: &mut KeySet) -> usize {
        let mut spliced = other.drain_keys();
        let moved = spliced.len();
        self.ahead.append(&mut spliced);
        tracing::trace!(moved, size = self.len(), "spliced key set at tail");
        self.len()
    }

    /// Advance the cursor and return the key it lands on.
    ///
    /// Returns `None` after the last key and rewinds, so the following
    /// call yields the first key again. Always `None` on an empty set.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&Key> {
        match self.ahead.pop_front() {
            Some(key) => {
                self.visited.push_back(key);
                self.visited.back()
            }
            None => {
                self.rewind();
                None
            }
        }
    }

    /// Reset the cursor to before the first key.
    pub fn rewind(&mut self) {
        self.visited.append(&mut self.ahead);
        std::mem::swap(&mut self.visited, &mut self.ahead);
    }

    /// Key the cursor currently points at.
    pub fn current(&self) -> Option<&Key> {
        self.visited.back()
    }

    pub fn current_mut(&mut self) -> Option<&mut Key> {
        self.visited.back_mut()
    }

    /// Close every key and empty the set.
    pub fn close(&mut self) {
        for key in self.iter_mut() {
            key.close();
        }
        self.visited.clear();
        self.ahead.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Key> + '_ {
        self.visited.iter().chain(self.ahead.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Key> + '_ {
        self.visited.iter_mut().chain(self.ahead.iter_mut())
    }

    /// First key whose full name equals `full_name` once canonicalized.
    ///
    /// `user/...` without a domain only matches keys that have none.
    pub fn lookup(&self, full_name: &str) -> Option<&Key> {
        let parsed = keyreg_name::parse(full_name).ok()?;
        self.iter().find(|key| {
            key.name() == Some(parsed.name.as_str())
                && key.owner_domain() == parsed.domain.as_deref()
        })
    }

    /// Take all keys out in order, leaving the set empty and rewound.
    pub(crate) fn drain_keys(&mut self) -> LinkedList<Key> {
        self.rewind();
        std::mem::take(&mut self.ahead)
    }

    /// Replace the contents with `keys` and rewind.
    pub(crate) fn restore_keys(&mut self, keys: LinkedList<Key>) {
        self.visited.clear();
        self.ahead = keys;
    }
}

impl FromIterator<Key> for KeySet {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        KeySet {
            visited: LinkedList::new(),
            ahead: iter.into_iter().collect(),
        }
    }
}

impl Extend<Key> for KeySet {
    fn extend<I: IntoIterator<Item = Key>>(&mut self, iter: I) {
        self.ahead.extend(iter);
    }
}

impl IntoIterator for KeySet {
    type Item = Key;
    type IntoIter = linked_list::IntoIter<Key>;

    fn into_iter(mut self) -> Self::IntoIter {
        self.drain_keys().into_iter()
    }
}

impl<'a> IntoIterator for &'a KeySet {
    type Item = &'a Key;
    type IntoIter = Chain<linked_list::Iter<'a, Key>, linked_list::Iter<'a, Key>>;

    fn into_iter(self) -> Self::IntoIter {
        self.visited.iter().chain(self.ahead.iter())
    }
}
