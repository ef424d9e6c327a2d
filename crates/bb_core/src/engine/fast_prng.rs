//! SplitMix64 generator for the per-game streams of the batch runner.
//!
//! The batch runner keeps one generator per game in a flat column, so the
//! state has to be small: SplitMix64 is a single u64 (vs 136+ bytes for
//! ChaCha8) and runs in a couple of cycles. It implements [`RngCore`] so the
//! shared rule functions can draw from it like any other `Rng`.

use rand::{Error, RngCore, SeedableRng};

const GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// SplitMix64 PRNG with a single u64 of state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    #[inline(always)]
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Independent generator for game `stream` of a run seeded with `seed`.
    ///
    /// The starting state is itself a SplitMix64 output, so neighbouring
    /// streams do not walk overlapping stretches of the sequence.
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        let mut base = Self::new(seed ^ stream.wrapping_mul(0xd1b5_4a32_d192_ed03));
        Self::new(base.next_u64())
    }

    #[inline(always)]
    fn mix(&mut self) -> u64 {
        self.state = self.state.wrapping_add(GAMMA);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }
}

impl RngCore for SplitMix64 {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        (self.mix() >> 32) as u32
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.mix()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.mix().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for SplitMix64 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_splitmix64_deterministic() {
        let mut rng1 = SplitMix64::new(42);
        let mut rng2 = SplitMix64::new(42);
        for _ in 0..100 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_streams_differ() {
        let mut a = SplitMix64::for_stream(7, 0);
        let mut b = SplitMix64::for_stream(7, 1);
        let same = (0..64).filter(|_| a.next_u64() == b.next_u64()).count();
        assert_eq!(same, 0);
    }

    #[test]
    fn test_fill_bytes_partial_chunk() {
        let mut rng = SplitMix64::new(3);
        let mut buf = [0u8; 13];
        rng.fill_bytes(&mut buf);
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_uniform_f64_mean() {
        let mut rng = SplitMix64::for_stream(42, 9);
        let n = 100_000;
        let mean = (0..n).map(|_| rng.gen::<f64>()).sum::<f64>() / n as f64;
        assert!((mean - 0.5).abs() < 0.01, "mean {mean}");
    }

    #[test]
    fn test_uniform_bucket_distribution() {
        let mut rng = SplitMix64::new(2024);
        let mut counts = [0u32; 10];
        let n = 100_000;
        for _ in 0..n {
            counts[(rng.gen::<f64>() * 10.0) as usize] += 1;
        }
        for (bucket, &count) in counts.iter().enumerate() {
            let ratio = count as f64 / (n as f64 / 10.0);
            assert!(
                ratio > 0.95 && ratio < 1.05,
                "Bucket {} has count {} (ratio {:.3})",
                bucket,
                count,
                ratio
            );
        }
    }
}
