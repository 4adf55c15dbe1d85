//! Key-linked recency list.
//!
//! Every key is its own node: the index maps a key to the keys on either side
//! of it, so bumping or unlinking a key is a couple of hash lookups and no
//! node handles leave the list.
//!
//! ```text
//!   links: FxHashMap<K, Links<K>>
//!   ┌───────┬─────────────────────────────┐
//!   │ "a"   │ newer: None,  older: "c"    │      newest                oldest
//!   │ "c"   │ newer: "a",   older: "b"    │  ──►  "a"  ◄──►  "c"  ◄──►  "b"
//!   │ "b"   │ newer: "c",   older: None   │
//!   └───────┴─────────────────────────────┘
//! ```
//!
//! The newest key is the most recently refreshed; eviction scans from the
//! oldest. Each key appears at most once.

use std::hash::Hash;
use std::iter::FusedIterator;

use rustc_hash::FxHashMap;

use crate::error::InvariantError;

#[derive(Debug)]
struct Links<K> {
    newer: Option<K>,
    older: Option<K>,
}

#[derive(Debug)]
pub struct EvictionList<K> {
    links: FxHashMap<K, Links<K>>,
    newest: Option<K>,
    oldest: Option<K>,
}

impl<K> EvictionList<K>
where
    K: Clone + Eq + Hash,
{
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            links: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            newest: None,
            oldest: None,
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Links `key` as the newest. Returns `false` and leaves the list untouched
    /// if the key is already linked.
    pub fn push_front(&mut self, key: K) -> bool {
        if self.links.contains_key(&key) {
            return false;
        }
        self.link_newest(key);
        true
    }

    /// Moves a linked key to the newest position. An unlinked key stays
    /// unlinked.
    pub fn touch(&mut self, key: &K) -> bool {
        if !self.links.contains_key(key) {
            return false;
        }
        if self.newest.as_ref() != Some(key) {
            self.unlink(key);
            self.link_newest(key.clone());
        }
        true
    }

    pub fn remove(&mut self, key: &K) -> bool {
        self.unlink(key)
    }

    pub fn oldest(&self) -> Option<&K> {
        self.oldest.as_ref()
    }

    /// Iterates keys from newest to oldest; `.rev()` walks the eviction order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            list: self,
            front: self.newest.as_ref(),
            back: self.oldest.as_ref(),
            remaining: self.links.len(),
        }
    }

    pub fn clear(&mut self) {
        self.links.clear();
        self.newest = None;
        self.oldest = None;
    }

    /// Walks the chain from the newest key and checks both directions agree
    /// with the index.
    pub fn validate(&self) -> Result<(), InvariantError> {
        let mut previous: Option<&K> = None;
        let mut cursor = self.newest.as_ref();
        let mut walked = 0usize;

        while let Some(key) = cursor {
            let links = self
                .links
                .get(key)
                .ok_or_else(|| InvariantError::new("chained key missing from the index"))?;
            if links.newer.as_ref() != previous {
                return Err(InvariantError::new("newer link disagrees with walk order"));
            }
            walked += 1;
            if walked > self.links.len() {
                return Err(InvariantError::new("recency chain loops back on itself"));
            }
            previous = Some(key);
            cursor = links.older.as_ref();
        }

        if previous != self.oldest.as_ref() {
            return Err(InvariantError::new("oldest key is not the end of the chain"));
        }
        if walked != self.links.len() {
            return Err(InvariantError::new(format!(
                "chain reaches {} keys but index holds {}",
                walked,
                self.links.len()
            )));
        }
        Ok(())
    }

    fn link_newest(&mut self, key: K) {
        let older = self.newest.replace(key.clone());
        match &older {
            Some(previous) => {
                if let Some(links) = self.links.get_mut(previous) {
                    links.newer = Some(key.clone());
                }
            },
            None => self.oldest = Some(key.clone()),
        }
        self.links.insert(key, Links { newer: None, older });
    }

    fn unlink(&mut self, key: &K) -> bool {
        let Some(Links { newer, older }) = self.links.remove(key) else {
            return false;
        };

        match &newer {
            Some(n) => {
                if let Some(links) = self.links.get_mut(n) {
                    links.older = older.clone();
                }
            },
            None => self.newest = older.clone(),
        }
        match &older {
            Some(o) => {
                if let Some(links) = self.links.get_mut(o) {
                    links.newer = newer;
                }
            },
            None => self.oldest = newer,
        }
        true
    }
}

/// Iterator over an [`EvictionList`], newest first.
pub struct Iter<'a, K> {
    list: &'a EvictionList<K>,
    front: Option<&'a K>,
    back: Option<&'a K>,
    remaining: usize,
}

impl<'a, K> Iterator for Iter<'a, K>
where
    K: Eq + Hash,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.front?;
        self.front = self.list.links.get(key).and_then(|l| l.older.as_ref());
        self.remaining -= 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K> DoubleEndedIterator for Iter<'a, K>
where
    K: Eq + Hash,
{
    fn next_back(&mut self) -> Option<&'a K> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.back?;
        self.back = self.list.links.get(key).and_then(|l| l.newer.as_ref());
        self.remaining -= 1;
        Some(key)
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> where K: Eq + Hash {}

impl<K> FusedIterator for Iter<'_, K> where K: Eq + Hash {}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(list: &EvictionList<&'static str>) -> Vec<&'static str> {
        list.iter().copied().collect()
    }

    fn list_of(keys: &[&'static str]) -> EvictionList<&'static str> {
        let mut list = EvictionList::with_capacity(keys.len());
        for key in keys {
            list.push_front(*key);
        }
        list
    }

    #[test]
    fn push_front_ignores_duplicates() {
        let mut list = list_of(&["a", "b"]);
        assert!(!list.push_front("a"));
        assert_eq!(order(&list), vec!["b", "a"]);
        assert_eq!(list.len(), 2);
        list.validate().unwrap();
    }

    #[test]
    fn touch_moves_key_to_front() {
        let mut list = list_of(&["a", "b", "c"]);

        assert!(list.touch(&"a"));
        assert_eq!(order(&list), vec!["a", "c", "b"]);
        assert_eq!(list.oldest(), Some(&"b"));

        assert!(list.touch(&"c"));
        assert_eq!(order(&list), vec!["c", "a", "b"]);
        assert!(list.touch(&"c"));
        assert_eq!(order(&list), vec!["c", "a", "b"]);
        list.validate().unwrap();
    }

    #[test]
    fn touch_does_not_resurrect_removed_keys() {
        let mut list = list_of(&["a"]);
        assert!(list.remove(&"a"));
        assert!(!list.touch(&"a"));
        assert!(list.is_empty());
        assert_eq!(list.oldest(), None);
        list.validate().unwrap();
    }

    #[test]
    fn remove_relinks_neighbours() {
        let mut list = list_of(&["a", "b", "c", "d"]);
        assert!(list.remove(&"b"));
        assert!(!list.remove(&"b"));
        assert_eq!(order(&list), vec!["d", "c", "a"]);

        assert!(list.remove(&"d"));
        assert!(list.remove(&"a"));
        assert_eq!(order(&list), vec!["c"]);
        assert_eq!(list.oldest(), Some(&"c"));
        list.validate().unwrap();
    }

    #[test]
    fn reverse_iteration_walks_eviction_order() {
        let list = list_of(&["a", "b", "c"]);
        let oldest_first: Vec<_> = list.iter().rev().copied().collect();
        assert_eq!(oldest_first, vec!["a", "b", "c"]);

        let mut iter = list.iter();
        assert_eq!(iter.next(), Some(&"c"));
        assert_eq!(iter.next_back(), Some(&"a"));
        assert_eq!(iter.len(), 1);
        assert_eq!(iter.next(), Some(&"b"));
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn removed_key_can_be_linked_again() {
        let mut list = list_of(&["a", "b"]);
        list.remove(&"a");
        assert!(list.push_front("a"));
        assert_eq!(order(&list), vec!["a", "b"]);
        list.validate().unwrap();
    }

    #[test]
    fn clear_empties_chain_and_index() {
        let mut list = list_of(&["a", "b"]);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
        assert!(list.push_front("a"));
        list.validate().unwrap();
    }

    #[test]
    fn validate_detects_a_broken_link() {
        let mut list = list_of(&["a", "b", "c"]);
        if let Some(links) = list.links.get_mut(&"b") {
            links.newer = Some("a");
        }
        assert!(list.validate().is_err());
    }
}
