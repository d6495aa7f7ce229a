//! Maurer's "universal statistical" test

use super::{StatisticalTest, TestResult};
use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;

/// Block length L with its minimum sequence length, expected value and variance
struct UniversalParams {
    block_len: usize,
    min_bits: usize,
    expected: f64,
    variance: f64,
}

const fn params(block_len: usize, min_bits: usize, expected: f64, variance: f64) -> UniversalParams {
    UniversalParams {
        block_len,
        min_bits,
        expected,
        variance,
    }
}

/// Ordered by increasing block length
const PARAMS: [UniversalParams; 11] = [
    params(6, 387_840, 5.217_705_2, 2.954),
    params(7, 904_960, 6.196_250_7, 3.125),
    params(8, 2_068_480, 7.183_665_6, 3.238),
    params(9, 4_654_080, 8.176_424_8, 3.311),
    params(10, 10_342_400, 9.172_324_3, 3.356),
    params(11, 22_753_280, 10.170_032, 3.384),
    params(12, 49_643_520, 11.168_765, 3.401),
    params(13, 107_560_960, 12.168_070, 3.410),
    params(14, 231_669_760, 13.167_693, 3.416),
    params(15, 496_435_200, 14.167_488, 3.419),
    params(16, 1_059_061_760, 15.167_379, 3.421),
];

/// Largest block length the sequence supports
fn params_for(n: usize) -> Option<&'static UniversalParams> {
    PARAMS.iter().rev().find(|p| n >= p.min_bits)
}

/// Integer value of the `index`-th (0-based) L-bit block
fn block_value(bits: &[u8], index: usize, block_len: usize) -> usize {
    bits[index * block_len..(index + 1) * block_len]
        .iter()
        .fold(0usize, |acc, &b| (acc << 1) | b as usize)
}

/// Test 9: compressibility via distances between repeated L-bit patterns
pub struct MaurersUniversal;

impl StatisticalTest for MaurersUniversal {
    fn name(&self) -> &'static str {
        "maurers_universal"
    }

    fn is_eligible(&self, bits: &[u8]) -> bool {
        params_for(bits.len()).is_some()
    }

    fn execute(&self, bits: &[u8]) -> TestResult {
        let Some(params) = params_for(bits.len()) else {
            return TestResult::from_p_value(
                self.name(),
                f64::NAN,
                format!("sequence too short: n={}", bits.len()),
            );
        };
        let l = params.block_len;
        let q = 10 * (1usize << l);
        let k = bits.len() / l - q;

        // Last 1-based position each pattern was seen at
        let mut table = vec![0usize; 1 << l];
        for i in 1..=q {
            table[block_value(bits, i - 1, l)] = i;
        }

        let mut sum = 0.0;
        for i in q + 1..=q + k {
            let value = block_value(bits, i - 1, l);
            sum += ((i - table[value]) as f64).log2();
            table[value] = i;
        }

        let fn_stat = sum / k as f64;
        let lf = l as f64;
        let kf = k as f64;
        let c = 0.7 - 0.8 / lf + (4.0 + 32.0 / lf) * kf.powf(-3.0 / lf) / 15.0;
        let sigma = c * (params.variance / kf).sqrt();
        let p = erfc((fn_stat - params.expected).abs() / (SQRT_2 * sigma));
        TestResult::from_p_value(
            self.name(),
            p,
            format!(
                "fn={fn_stat:.6}, expected={:.6}, L={l}, Q={q}, K={k}",
                params.expected
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::test_support::*;

    #[test]
    fn test_params_selection() {
        assert!(params_for(387_839).is_none());
        assert_eq!(params_for(387_840).unwrap().block_len, 6);
        assert_eq!(params_for(1_000_000).unwrap().block_len, 7);
        assert_eq!(params_for(2_068_480).unwrap().block_len, 8);
    }

    #[test]
    fn test_block_value() {
        let bits = bits_from_str("011010");
        assert_eq!(block_value(&bits, 0, 3), 0b011);
        assert_eq!(block_value(&bits, 1, 3), 0b010);
    }

    #[test]
    fn test_ineligible_sequence_reports_failure() {
        let result = MaurersUniversal.execute(&[0, 1, 0, 1]);
        assert!(!result.passed);
        assert!(!MaurersUniversal.is_eligible(&[0, 1, 0, 1]));
    }

    #[test]
    fn test_constant_sequence_fails() {
        assert!(!MaurersUniversal.execute(&vec![0u8; 387_840]).passed);
    }

    #[test]
    fn test_random_passes() {
        let result = MaurersUniversal.execute(&pseudo_random_bits(400_000, 8));
        assert!(result.passed, "{}", result.details);
    }
}
