use crate::key::Key;
use rand::{distributions::Alphanumeric, rngs::StdRng, Rng, SeedableRng};

pub trait Random {
    fn gen<R: Rng>(rng: &mut R) -> Self;
}

const RANDOM_STRING_MIN: usize = 0;
const RANDOM_STRING_MAX: usize = 10;

impl Random for String {
    // get random string whose length is in [RANDOM_STRING_MIN, RANDOM_STRING_MAX)
    fn gen<R: Rng>(rng: &mut R) -> Self {
        let length: usize = rng.gen_range(RANDOM_STRING_MIN..RANDOM_STRING_MAX);

        rng.sample_iter(&Alphanumeric)
            .map(char::from)
            .take(length)
            .collect()
    }
}

impl Random for Key {
    fn gen<R: Rng>(rng: &mut R) -> Self {
        Key::from(String::gen(rng))
    }
}

impl Random for u64 {
    fn gen<R: Rng>(rng: &mut R) -> Self {
        rng.gen()
    }
}

/// `count` random values, the same ones for the same seed.
pub fn random_keys<T: Random>(count: usize, seed: u64) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..count).map(|_| T::gen(&mut rng)).collect()
}
