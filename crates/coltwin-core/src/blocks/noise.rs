//! Measurement noise source.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Gaussian measurement noise shared by all plant signals.
///
/// One generator serves every signal so that a single seed reproduces the
/// whole run. Samples are drawn from a unit normal and scaled per signal.
///
/// # Example
///
/// ```ignore
/// let mut noise = MeasurementNoise::new(Some(42));
/// let dl = noise.sample(0.2); // level noise, sigma 0.2
/// ```
#[derive(Debug, Clone)]
pub struct MeasurementNoise {
    rng: StdRng,
    unit: Normal<f64>,
}

impl MeasurementNoise {
    /// Create a generator. `None` seeds from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        // A unit normal is always constructible.
        let unit = Normal::new(0.0, 1.0).unwrap();
        Self { rng, unit }
    }

    /// Draw one sample with the given standard deviation.
    pub fn sample(&mut self, sigma: f64) -> f64 {
        self.unit.sample(&mut self.rng) * sigma
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = MeasurementNoise::new(Some(7));
        let mut b = MeasurementNoise::new(Some(7));
        for _ in 0..32 {
            assert_eq!(a.sample(0.25), b.sample(0.25));
        }
    }

    #[test]
    fn sigma_scales_the_spread() {
        let mut noise = MeasurementNoise::new(Some(1234));
        let n = 20_000;
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for _ in 0..n {
            let x = noise.sample(0.5);
            sum += x;
            sum_sq += x * x;
        }
        let mean = sum / n as f64;
        let variance = sum_sq / n as f64 - mean * mean;
        assert!(mean.abs() < 0.02, "mean = {mean}, expected ~0");
        assert!(
            (variance - 0.25).abs() < 0.02,
            "variance = {variance}, expected ~0.25"
        );
    }
}
