pub trait PersistentSet<K: Ord + Clone>: Clone + Sized {
    fn empty() -> Self;

    /// Insert the key into a new version of the set.
    ///
    /// If an equal key already exists, the new key replaces it in the new version.
    /// `self` is left untouched.
    fn insert(&self, key: K) -> Self;

    fn contains(&self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Union of both sets. If a key exists in both, the key from `other` is kept.
    fn union(&self, other: &Self) -> Self;

    /// Visit every element once and return how many were visited.
    ///
    /// Timed code calls this before stopping the clock so the whole structure is
    /// known to be materialized.
    fn force(&self) -> usize;
}
