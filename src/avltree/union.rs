use super::{AVLTree, Link, Node};
use std::{cmp::Ordering, sync::Arc};

impl<K: Ord + Clone> AVLTree<K> {
    /// Union of two trees in O(m + n).
    ///
    /// Both in-order sequences are merged and the result is rebuilt as a tree whose
    /// subtree sizes differ by at most one at every node. If a key is in both trees,
    /// the key stored in `other` is kept. The trees may overlap arbitrarily.
    pub fn union(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }

        let mut merged = Vec::with_capacity(self.len + other.len);
        let mut left = self.iter().peekable();
        let mut right = other.iter().peekable();

        while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
            match l.cmp(r) {
                Ordering::Less => {
                    merged.push((*l).clone());
                    left.next();
                }
                Ordering::Greater => {
                    merged.push((*r).clone());
                    right.next();
                }
                Ordering::Equal => {
                    merged.push((*r).clone());
                    left.next();
                    right.next();
                }
            }
        }
        merged.extend(left.cloned());
        merged.extend(right.cloned());

        Self::from_sorted(merged)
    }

    /// Build a tree from keys in strictly increasing order in O(n).
    ///
    /// The caller guarantees the order. Duplicates or unsorted input produce a tree
    /// that fails `is_ordered`. The iterator must yield exactly `len()` keys.
    pub fn from_sorted<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        I::IntoIter: ExactSizeIterator,
    {
        let mut keys = keys.into_iter();
        let len = keys.len();
        let root = build_sorted(len, &mut keys);
        let tree = AVLTree { root, len };

        debug_assert!(keys.next().is_none(), "iterator yielded more than {} keys", len);
        debug_assert_eq!(tree.force(), len, "iterator yielded fewer keys than its len");

        tree
    }
}

/// build the subtree holding the next `len` keys of the iterator
fn build_sorted<K, I: Iterator<Item = K>>(len: usize, keys: &mut I) -> Link<K> {
    if len == 0 {
        return None;
    }

    let left_len = len / 2;
    let left = build_sorted(left_len, keys);
    let key = keys.next()?;
    let right = build_sorted(len - left_len - 1, keys);

    Some(Arc::new(Node::new(key, left, right)))
}
