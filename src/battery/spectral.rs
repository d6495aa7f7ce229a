//! Discrete Fourier transform (spectral) test

use super::{StatisticalTest, TestResult};
use rustfft::{num_complex::Complex, FftPlanner};
use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;

/// Test 6: peaks in the DFT of the ±1 sequence
pub struct Dft;

impl StatisticalTest for Dft {
    fn name(&self) -> &'static str {
        "dft"
    }

    fn is_eligible(&self, bits: &[u8]) -> bool {
        bits.len() >= 1000
    }

    fn execute(&self, bits: &[u8]) -> TestResult {
        let n = bits.len();
        let mut buffer: Vec<Complex<f64>> = bits
            .iter()
            .map(|&b| Complex::new(if b == 1 { 1.0 } else { -1.0 }, 0.0))
            .collect();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n);
        fft.process(&mut buffer);

        let half = n / 2;
        let nf = n as f64;
        // 95% of the peaks should fall below this height
        let threshold = ((1.0f64 / 0.05).ln() * nf).sqrt();
        let n0 = 0.95 * nf / 2.0;
        let n1 = buffer[..half]
            .iter()
            .filter(|c| c.norm() < threshold)
            .count() as f64;
        let d = (n1 - n0) / (nf * 0.95 * 0.05 / 4.0).sqrt();
        let p = erfc(d.abs() / SQRT_2);
        TestResult::from_p_value(
            self.name(),
            p,
            format!("d={d:.4}, N_1={n1}, N_0={n0:.1}"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::test_support::*;

    #[test]
    fn test_periodic_sequence_fails() {
        let bits: Vec<u8> = (0..4096).map(|i| ((i / 4) % 2) as u8).collect();
        assert!(!Dft.execute(&bits).passed);
    }

    #[test]
    fn test_random_passes() {
        let result = Dft.execute(&pseudo_random_bits(65_536, 3));
        assert!(result.passed, "{}", result.details);
    }

    #[test]
    fn test_eligibility() {
        assert!(!Dft.is_eligible(&[0; 999]));
        assert!(Dft.is_eligible(&[0; 1000]));
    }
}
