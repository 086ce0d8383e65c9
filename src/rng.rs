use std::f64::consts::PI;

/// Deterministic pseudo-random source driving the loss and jitter models.
///
/// An xorshift*-family generator: three shifts followed by a multiplication
/// by an odd 64-bit constant. Every state is nonzero and every output is
/// nonzero, so the raw stream lives in `[1, 2^64 - 1]`. The integer stream
/// is the reproducibility contract; floating-point derivatives are only as
/// portable as the platform's `ln`/`cos`.
#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

impl Prng {
    /// Create a generator from a nonzero seed.
    ///
    /// Zero is an absorbing state for xorshift, so a zero seed is a caller
    /// bug and fails fast.
    pub fn new(seed: u64) -> Self {
        assert!(seed != 0, "xorshift seed must be nonzero");
        Self { state: seed }
    }

    fn next_output(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(2685821657736338717)
    }

    /// Uniformly distributed integer in `[0, t]`.
    ///
    /// Truncating the output to 32 bits is almost uniform (the zero bucket
    /// is one part in 2^32 light); scaling by `t + 1` and keeping the high
    /// word is then uniform on `[0, t]` up to the same bias.
    pub fn rand_u32(&mut self, t: u32) -> u32 {
        let x = self.next_output() as u32;
        ((x as u64 * (t as u64 + 1)) >> 32) as u32
    }

    /// Uniformly distributed integer in `[low, high]`.
    pub fn rand_u32_range(&mut self, low: u32, high: u32) -> u32 {
        assert!(low <= high);
        self.rand_u32(high - low) + low
    }

    /// Uniformly distributed integer in `[low, high]`.
    ///
    /// Widened to i64 internally; `high - low` may exceed `i32::MAX`.
    pub fn rand_i32_range(&mut self, low: i32, high: i32) -> i32 {
        assert!(low <= high);
        let span = (high as i64) - (low as i64);
        (self.rand_u32(span as u32) as i64 + low as i64) as i32
    }

    pub fn rand_bool(&mut self) -> bool {
        self.rand_u32(1) == 1
    }

    /// Uniformly distributed float in `[0, 1)`.
    pub fn rand_f64(&mut self) -> f64 {
        (self.next_output() - 1) as f64 / u64::MAX as f64
    }

    /// Normally distributed float with the given mean and standard deviation.
    ///
    /// Box-Muller transform over two independent uniforms in `(0, 1]`; the
    /// raw outputs are nonzero so `ln(u1)` is always defined.
    pub fn gaussian(&mut self, mean: f64, standard_deviation: f64) -> f64 {
        let u1 = self.next_output() as f64 / u64::MAX as f64;
        let u2 = self.next_output() as f64 / u64::MAX as f64;
        mean + standard_deviation * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Exponentially distributed float with rate `lambda`.
    ///
    /// `rand_f64` returns exactly zero once in 2^64 draws; such draws are
    /// retried rather than fed to `ln`.
    pub fn exponential(&mut self, lambda: f64) -> f64 {
        let uniform = loop {
            let u = self.rand_f64();
            if u > 0.0 {
                break u;
            }
        };
        -uniform.ln() / lambda
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "nonzero")]
    fn zero_seed_rejected() {
        Prng::new(0);
    }

    #[test]
    fn identical_seeds_identical_streams() {
        let mut a = Prng::new(0xfeed_beef);
        let mut b = Prng::new(0xfeed_beef);
        for _ in 0..1_000 {
            assert_eq!(a.next_output(), b.next_output());
        }
    }

    #[test]
    fn outputs_are_nonzero() {
        let mut rng = Prng::new(1);
        for _ in 0..10_000 {
            assert_ne!(rng.next_output(), 0);
        }
    }

    #[test]
    fn rand_u32_stays_in_bounds() {
        let mut rng = Prng::new(7);
        for _ in 0..10_000 {
            assert!(rng.rand_u32(9) <= 9);
            let v = rng.rand_u32_range(100, 200);
            assert!((100..=200).contains(&v));
        }
    }

    #[test]
    fn rand_i32_range_spans_full_width() {
        // high - low here is larger than i32::MAX
        let mut rng = Prng::new(7);
        for _ in 0..10_000 {
            let v = rng.rand_i32_range(-2_000_000_000, 2_000_000_000);
            assert!((-2_000_000_000..=2_000_000_000).contains(&v));
        }
    }

    #[test]
    fn rand_f64_is_half_open() {
        let mut rng = Prng::new(99);
        for _ in 0..10_000 {
            let v = rng.rand_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn rand_bool_is_balanced() {
        let mut rng = Prng::new(3);
        let heads = (0..10_000).filter(|_| rng.rand_bool()).count();
        assert!((4_500..=5_500).contains(&heads));
    }

    #[test]
    fn gaussian_matches_moments() {
        let mut rng = Prng::new(42);
        let n = 50_000;
        let samples: Vec<f64> = (0..n).map(|_| rng.gaussian(10.0, 2.0)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n as f64;
        assert!((mean - 10.0).abs() < 0.05, "mean {mean}");
        assert!((var.sqrt() - 2.0).abs() < 0.05, "std dev {}", var.sqrt());
    }

    #[test]
    fn exponential_matches_mean() {
        let mut rng = Prng::new(42);
        let n = 50_000;
        let mean = (0..n).map(|_| rng.exponential(4.0)).sum::<f64>() / n as f64;
        assert!((mean - 0.25).abs() < 0.01, "mean {mean}");
    }
}
