//! `rand` / `srand` generator.

pub const RAND_MAX: i32 = i32::MAX;

/// xorshift64* generator.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// A generator seeded as by `srand(seed)`.
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self {
            state: Self::mix(seed),
        }
    }

    pub fn seed(&mut self, seed: u32) {
        self.state = Self::mix(seed);
    }

    // Zero is a fixed point of xorshift.
    const fn mix(seed: u32) -> u64 {
        ((seed as u64) << 1 | 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Next value in `0..=RAND_MAX`.
    pub fn next_rand(&mut self) -> i32 {
        (self.next_u64() >> 33) as i32
    }
}

impl Default for Rng {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Rng::new(7);
        let mut b = Rng::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_rand(), b.next_rand());
        }
    }

    #[test]
    fn reseed_restarts() {
        let mut a = Rng::new(3);
        let first: Vec<i32> = (0..5).map(|_| a.next_rand()).collect();
        a.seed(3);
        let again: Vec<i32> = (0..5).map(|_| a.next_rand()).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn values_in_range() {
        let mut r = Rng::new(0);
        for _ in 0..1000 {
            let v = r.next_rand();
            assert!((0..=RAND_MAX).contains(&v));
        }
        assert_ne!(Rng::new(1).next_u64(), Rng::new(2).next_u64());
    }
}
