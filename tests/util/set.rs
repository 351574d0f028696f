use pavl::{set::PersistentSet, util::random::Random};
use rand::{prelude::SliceRandom, rngs::StdRng, Rng, SeedableRng};
use std::{collections::BTreeSet, fmt::Debug};

/// Sequential reference: a `BTreeSet` copied on every update.
#[derive(Clone, Debug, PartialEq)]
pub struct Reference<K: Ord>(BTreeSet<K>);

impl<K: Ord> Reference<K> {
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.0.iter()
    }
}

impl<K: Ord + Clone> PersistentSet<K> for Reference<K> {
    fn empty() -> Self {
        Reference(BTreeSet::new())
    }

    fn insert(&self, key: K) -> Self {
        let mut set = self.0.clone();
        set.replace(key);
        Reference(set)
    }

    fn contains(&self, key: &K) -> bool {
        self.0.contains(key)
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn union(&self, other: &Self) -> Self {
        let mut set = self.0.clone();
        for key in &other.0 {
            set.replace(key.clone());
        }
        Reference(set)
    }

    fn force(&self) -> usize {
        self.0.iter().count()
    }
}

/// Insert random keys into `S` and check every version against the reference.
///
/// Old versions are kept and re-checked at the end, so an insert that mutates a
/// shared node shows up as a broken old version.
pub fn stress_sequential<K, S>(iter: u64, seed: u64)
where
    K: Ord + Clone + Random + Debug,
    S: PersistentSet<K>,
{
    let mut rng = StdRng::seed_from_u64(seed);

    let mut set = S::empty();
    let mut ref_set: BTreeSet<K> = BTreeSet::new();
    let mut versions: Vec<(S, BTreeSet<K>)> = Vec::new();

    for i in 1..=iter {
        let existing = ref_set.iter().collect::<Vec<_>>().choose(&mut rng).cloned().cloned();

        let key = match existing {
            Some(key) if rng.gen_bool(0.3) => key,
            _ => K::gen(&mut rng),
        };

        let was_there = ref_set.contains(&key);
        assert_eq!(set.contains(&key), was_there, "[{:0>10}] lookup {:?}", i, key);

        set = set.insert(key.clone());
        ref_set.insert(key.clone());

        assert!(set.contains(&key), "[{:0>10}] inserted {:?}", i, key);
        assert_eq!(set.len(), ref_set.len());

        if i % 64 == 0 {
            versions.push((set.clone(), ref_set.clone()));
        }
    }

    for (old, old_ref) in versions {
        assert_eq!(old.len(), old_ref.len());
        for key in &old_ref {
            assert!(old.contains(key), "old version lost {:?}", key);
        }
    }
}
