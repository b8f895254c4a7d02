/*!
A simple pseudorandom number generator.

Specifically, the *really* minimal C PCG32 implementation from <https://www.pcg-random.org/>
hosted on the [rand_core] traits.

PCG32 was chosen as the default source of (pseudo)random numbers as it is simple, fast, and has
some nice supporting documentation.
Each solver owns its generator, seeded from [Config::seed](crate::config::Config::seed), so a
single-worker solve is deterministic for a fixed formula and seed, while portfolio presets seed
their workers apart to diversify the search.
*/

use rand_core::{impls, RngCore, SeedableRng};

/// State and increment of a PCG32 generator.
#[derive(Default)]
pub struct MinimalPcg32 {
    state: u64,
    inc: u64,
}

impl RngCore for MinimalPcg32 {
    fn next_u32(&mut self) -> u32 {
        let old_state = self.state;

        self.state = old_state
            .wrapping_mul(6364136223846793005_u64)
            .wrapping_add(self.inc);

        let xorshifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }
}

impl SeedableRng for MinimalPcg32 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        /// Entirely unmotivated.
        const INCREMENT: u64 = 1442695040888963407;
        Self {
            state: u64::from_le_bytes(seed).wrapping_add(INCREMENT),
            inc: INCREMENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinism_for_a_fixed_seed() {
        let mut a = MinimalPcg32::seed_from_u64(2);
        let mut b = MinimalPcg32::seed_from_u64(2);
        for _ in 0..32 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn seeds_diverge() {
        let mut a = MinimalPcg32::seed_from_u64(2);
        let mut b = MinimalPcg32::seed_from_u64(73);
        let divergence = (0..32).any(|_| a.next_u32() != b.next_u32());
        assert!(divergence);
    }
}
