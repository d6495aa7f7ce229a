//! Template matching tests: non-overlapping and overlapping

use super::{chi2_sf, pearson_chi2, StatisticalTest, TestResult};

/// Template length for both tests
const TEMPLATE_LEN: usize = 9;

/// Aperiodic template searched by the non-overlapping test
const APERIODIC_TEMPLATE: [u8; TEMPLATE_LEN] = [0, 0, 0, 0, 0, 0, 0, 0, 1];

/// Number of blocks in the non-overlapping test
const NON_OVERLAPPING_BLOCKS: usize = 8;

/// Smallest block length that keeps the expected count usable
const NON_OVERLAPPING_MIN_BLOCK: usize = 4096;

/// Block length for the overlapping test
const OVERLAPPING_BLOCK: usize = 1032;

/// Minimum number of blocks for the overlapping test
const OVERLAPPING_MIN_BLOCKS: usize = 100;

/// Class probabilities for 0..=4 and >=5 matches of the all-ones template
/// with M = 1032, m = 9
const OVERLAPPING_PROBABILITIES: [f64; 6] = [
    0.364091, 0.185659, 0.139381, 0.100571, 0.070432, 0.139865,
];

/// Test 7: non-overlapping occurrences of an aperiodic template
pub struct NonOverlappingTemplate;

/// Count matches, skipping past each match
fn count_non_overlapping(block: &[u8], template: &[u8]) -> u64 {
    let m = template.len();
    let mut count = 0;
    let mut i = 0;
    while i + m <= block.len() {
        if block[i..i + m] == *template {
            count += 1;
            i += m;
        } else {
            i += 1;
        }
    }
    count
}

/// Count matches at every position
fn count_overlapping(block: &[u8], template: &[u8]) -> u64 {
    block.windows(template.len()).filter(|w| *w == template).count() as u64
}

impl StatisticalTest for NonOverlappingTemplate {
    fn name(&self) -> &'static str {
        "non_overlapping_template_matching"
    }

    fn is_eligible(&self, bits: &[u8]) -> bool {
        bits.len() >= NON_OVERLAPPING_BLOCKS * NON_OVERLAPPING_MIN_BLOCK
    }

    fn execute(&self, bits: &[u8]) -> TestResult {
        let block_len = bits.len() / NON_OVERLAPPING_BLOCKS;
        let m = TEMPLATE_LEN as f64;
        let mf = block_len as f64;
        let two_m = 2f64.powi(TEMPLATE_LEN as i32);

        let mu = (mf - m + 1.0) / two_m;
        let sigma2 = mf * (1.0 / two_m - (2.0 * m - 1.0) / (two_m * two_m));

        let counts: Vec<u64> = bits
            .chunks_exact(block_len.max(1))
            .take(NON_OVERLAPPING_BLOCKS)
            .map(|block| count_non_overlapping(block, &APERIODIC_TEMPLATE))
            .collect();
        let chi2: f64 = counts
            .iter()
            .map(|&w| (w as f64 - mu).powi(2) / sigma2)
            .sum();
        let p = chi2_sf(NON_OVERLAPPING_BLOCKS as f64, chi2);
        TestResult::from_p_value(
            self.name(),
            p,
            format!("chi2={chi2:.4}, mu={mu:.3}, W={counts:?}"),
        )
    }
}

/// Test 8: overlapping occurrences of the all-ones template
pub struct OverlappingTemplate;

impl StatisticalTest for OverlappingTemplate {
    fn name(&self) -> &'static str {
        "overlapping_template_matching"
    }

    fn is_eligible(&self, bits: &[u8]) -> bool {
        bits.len() >= OVERLAPPING_MIN_BLOCKS * OVERLAPPING_BLOCK
    }

    fn execute(&self, bits: &[u8]) -> TestResult {
        let template = [1u8; TEMPLATE_LEN];
        let classes = OVERLAPPING_PROBABILITIES.len();
        let mut observed = vec![0u64; classes];
        let mut num_blocks = 0usize;

        for block in bits.chunks_exact(OVERLAPPING_BLOCK) {
            let matches = count_overlapping(block, &template) as usize;
            observed[matches.min(classes - 1)] += 1;
            num_blocks += 1;
        }

        let chi2 = pearson_chi2(&observed, &OVERLAPPING_PROBABILITIES, num_blocks as f64);
        let p = chi2_sf((classes - 1) as f64, chi2);
        TestResult::from_p_value(
            self.name(),
            p,
            format!("chi2={chi2:.4}, N={num_blocks}, counts={observed:?}"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::test_support::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_count_non_overlapping_skips_match() {
        let template = [0, 0, 1];
        let block = bits_from_str("10100100101110010110");
        // NIST SP800-22 §2.7.4 example: W_1 = 2
        assert_eq!(count_non_overlapping(&block[..10], &template), 2);
        assert_eq!(count_non_overlapping(&bits_from_str("001001"), &template), 2);
    }

    #[test]
    fn test_count_overlapping_counts_every_position() {
        let template = [1, 1];
        assert_eq!(count_overlapping(&bits_from_str("10111011110110"), &template), 6);
        assert_eq!(count_non_overlapping(&bits_from_str("10111011110110"), &template), 4);
    }

    #[test]
    fn test_overlapping_probabilities_sum_to_one() {
        let total: f64 = OVERLAPPING_PROBABILITIES.iter().sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_eligibility() {
        assert!(!NonOverlappingTemplate.is_eligible(&vec![0; 32_767]));
        assert!(NonOverlappingTemplate.is_eligible(&vec![0; 32_768]));
        assert!(!OverlappingTemplate.is_eligible(&vec![0; 103_199]));
        assert!(OverlappingTemplate.is_eligible(&vec![0; 103_200]));
    }

    #[test]
    fn test_all_ones_fails_overlapping() {
        assert!(!OverlappingTemplate.execute(&vec![1u8; 103_200]).passed);
    }

    #[test]
    fn test_all_zeros_fails_non_overlapping() {
        assert!(!NonOverlappingTemplate.execute(&vec![0u8; 32_768]).passed);
    }

    #[test]
    fn test_random_passes() {
        let bits = pseudo_random_bits(120_000, 21);
        let result = NonOverlappingTemplate.execute(&bits);
        assert!(result.passed, "{}", result.details);
        let result = OverlappingTemplate.execute(&bits);
        assert!(result.passed, "{}", result.details);
    }
}
