//! Entropy source for random image selection

/// Source of uniformly distributed 32-bit values
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;

    /// Uniform value in `[0, bound)`
    ///
    /// Uses rejection sampling so small bounds are not biased. Returns 0
    /// when `bound` is 0.
    fn below(&mut self, bound: u32) -> u32 {
        if bound <= 1 {
            return 0;
        }
        let zone = u32::MAX - (u32::MAX % bound);
        loop {
            let value = self.next_u32();
            if value < zone {
                return value % bound;
            }
        }
    }
}

/// Xorshift32 generator
///
/// Good enough to shuffle a photo directory; seed it from a hardware RNG
/// or the uptime at the first touch.
#[derive(Debug, Clone)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Fallback seed for a zero seed (xorshift never leaves state 0)
    const DEFAULT_SEED: u32 = 0x2545_F491;

    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { Self::DEFAULT_SEED } else { seed },
        }
    }
}

impl RandomSource for XorShift32 {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_seed_is_replaced() {
        let mut rng = XorShift32::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn test_below_stays_in_range() {
        let mut rng = XorShift32::new(7);
        for bound in 1..50 {
            for _ in 0..20 {
                assert!(rng.below(bound) < bound);
            }
        }
        assert_eq!(rng.below(0), 0);
    }
}
