//! Per-mode waiting list
//!
//! Entries live in a slab and are threaded into a doubly-linked FIFO list:
//!
//! ```text
//! head (waiting longest) <-> entry <-> entry <-> tail (newest)
//! ```
//!
//! An identity index maps each username key to its slab key, so any entry can
//! be unlinked in O(1) once a scan has picked it. Unlinking never touches the
//! relative order of the remaining entries.

use crate::types::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slab::Slab;
use std::collections::HashMap;

/// A player's entry in a waiting list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedPlayer {
    pub player_id: PlayerId,
    pub username: String,
    /// Case-folded username, the identity used by the index
    pub key: String,
    pub skill_rating: i32,
    pub ticket: u64,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct QueueNode {
    entry: QueuedPlayer,
    prev: Option<usize>,
    next: Option<usize>,
}

/// FIFO waiting list with O(1) removal by identity
#[derive(Debug, Default)]
pub struct ModeQueue {
    nodes: Slab<QueueNode>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl ModeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn front(&self) -> Option<&QueuedPlayer> {
        self.head.map(|slot| &self.nodes[slot].entry)
    }

    /// Append at the tail. Returns the entry back if its key is already present.
    pub fn push_back(&mut self, entry: QueuedPlayer) -> Result<(), QueuedPlayer> {
        if self.index.contains_key(&entry.key) {
            return Err(entry);
        }

        let key = entry.key.clone();
        let slot = self.nodes.insert(QueueNode {
            entry,
            prev: self.tail,
            next: None,
        });

        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.index.insert(key, slot);
        Ok(())
    }

    /// Unlink the entry for `key`, leaving every other entry in place
    pub fn remove(&mut self, key: &str) -> Option<QueuedPlayer> {
        let slot = self.index.remove(key)?;
        let node = self.nodes.remove(slot);

        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes[next].prev = node.prev,
            None => self.tail = node.prev,
        }

        Some(node.entry)
    }

    /// Remove exactly two distinct entries.
    ///
    /// Nothing is removed unless both keys are present.
    pub fn remove_pair(
        &mut self,
        first: &str,
        second: &str,
    ) -> Option<(QueuedPlayer, QueuedPlayer)> {
        if first == second || !self.contains(first) || !self.contains(second) {
            return None;
        }
        let a = self.remove(first)?;
        let b = self.remove(second)?;
        Some((a, b))
    }

    /// Front-to-back iteration
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            queue: self,
            cursor: self.head,
        }
    }
}

/// Iterator over a [`ModeQueue`] in queue order
pub struct Iter<'a> {
    queue: &'a ModeQueue,
    cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a QueuedPlayer;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = &self.queue.nodes[slot];
        self.cursor = node.next;
        Some(&node.entry)
    }
}

impl<'a> IntoIterator for &'a ModeQueue {
    type Item = &'a QueuedPlayer;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
