//! Frequency tests: monobit and frequency within a block

use super::{chi2_sf, count_ones, step, StatisticalTest, TestResult};
use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;

/// Minimum sequence length for both frequency tests
const MIN_BITS: usize = 100;

/// Smallest block size allowed for the block frequency test
const MIN_BLOCK_SIZE: usize = 20;

/// Test 1: proportion of ones across the whole sequence
pub struct Monobit;

impl StatisticalTest for Monobit {
    fn name(&self) -> &'static str {
        "monobit"
    }

    fn is_eligible(&self, bits: &[u8]) -> bool {
        bits.len() >= MIN_BITS
    }

    fn execute(&self, bits: &[u8]) -> TestResult {
        let n = bits.len();
        let s: i64 = bits.iter().map(|&b| step(b)).sum();
        let s_obs = s.unsigned_abs() as f64 / (n as f64).sqrt();
        let p = erfc(s_obs / SQRT_2);
        TestResult::from_p_value(self.name(), p, format!("S_n={s}, n={n}"))
    }
}

/// Test 2: proportion of ones within M-bit blocks
pub struct FrequencyWithinBlock;

impl FrequencyWithinBlock {
    /// Block size satisfying M >= 20, M > 0.01 n and N < 100
    pub fn block_size_for(n: usize) -> usize {
        (n / 99 + 1).max(MIN_BLOCK_SIZE)
    }
}

impl StatisticalTest for FrequencyWithinBlock {
    fn name(&self) -> &'static str {
        "frequency_within_block"
    }

    fn is_eligible(&self, bits: &[u8]) -> bool {
        bits.len() >= MIN_BITS
    }

    fn execute(&self, bits: &[u8]) -> TestResult {
        block_frequency(bits, Self::block_size_for(bits.len()))
    }
}

/// Block frequency with an explicit block size; trailing bits are discarded
pub fn block_frequency(bits: &[u8], block_size: usize) -> TestResult {
    let name = "frequency_within_block";
    if block_size == 0 || bits.len() < block_size {
        return TestResult::from_p_values(
            name,
            Vec::new(),
            format!("M={block_size} does not fit a {}-bit sequence", bits.len()),
        );
    }
    let num_blocks = bits.len() / block_size;
    let chi2: f64 = bits
        .chunks_exact(block_size)
        .map(|block| {
            let pi = count_ones(block) as f64 / block_size as f64;
            (pi - 0.5) * (pi - 0.5)
        })
        .sum::<f64>()
        * 4.0
        * block_size as f64;
    let p = chi2_sf(num_blocks as f64, chi2);
    TestResult::from_p_value(
        name,
        p,
        format!("chi2={chi2:.4}, N={num_blocks}, M={block_size}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::test_support::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_monobit_worked_example() {
        let bits = bits_from_str("1011010101");
        let result = Monobit.execute(&bits);
        assert_abs_diff_eq!(result.score, 0.527089, epsilon = 1e-6);
        assert!(result.passed);
    }

    #[test]
    fn test_monobit_all_ones_fails() {
        let result = Monobit.execute(&vec![1u8; 1000]);
        assert!(!result.passed);
    }

    #[test]
    fn test_block_frequency_worked_example() {
        let bits = bits_from_str("0110011010");
        let result = block_frequency(&bits, 3);
        assert_abs_diff_eq!(result.score, 0.801252, epsilon = 1e-6);
    }

    #[test]
    fn test_block_frequency_rejects_unusable_block_size() {
        let bits = bits_from_str("0110011010");
        for block_size in [0, 11] {
            let result = block_frequency(&bits, block_size);
            assert!(!result.passed);
            assert!(result.p_values.is_empty());
        }
    }

    #[test]
    fn test_block_size_constraints() {
        for n in [100usize, 1_000, 12_345, 1_000_000] {
            let m = FrequencyWithinBlock::block_size_for(n);
            assert!(m >= 20);
            assert!(m as f64 > 0.01 * n as f64);
            assert!(n / m < 100);
        }
    }

    #[test]
    fn test_eligibility() {
        assert!(!Monobit.is_eligible(&[0; 99]));
        assert!(Monobit.is_eligible(&[0; 100]));
        assert!(FrequencyWithinBlock.is_eligible(&[0; 100]));
    }

    #[test]
    fn test_random_passes() {
        let bits = pseudo_random_bits(100_000, 7);
        assert!(Monobit.execute(&bits).passed);
        assert!(FrequencyWithinBlock.execute(&bits).passed);
    }
}
