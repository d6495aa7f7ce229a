//! Runs tests: total runs and longest run of ones in a block

use super::{chi2_sf, count_ones, pearson_chi2, StatisticalTest, TestResult};
use statrs::function::erf::erfc;

/// Test 3: number of uninterrupted runs of identical bits
pub struct Runs;

impl StatisticalTest for Runs {
    fn name(&self) -> &'static str {
        "runs"
    }

    fn is_eligible(&self, bits: &[u8]) -> bool {
        bits.len() >= 100
    }

    fn execute(&self, bits: &[u8]) -> TestResult {
        let n = bits.len() as f64;
        let pi = count_ones(bits) as f64 / n;

        // Frequency prerequisite: the runs statistic is meaningless when the
        // sequence is already biased.
        let tau = 2.0 / n.sqrt();
        if (pi - 0.5).abs() >= tau {
            return TestResult::from_p_value(
                self.name(),
                0.0,
                format!("frequency pre-test failed: pi={pi:.4}, tau={tau:.4}"),
            );
        }

        let runs = 1 + bits.windows(2).filter(|w| w[0] != w[1]).count();
        let expected = 2.0 * n * pi * (1.0 - pi);
        let p = erfc((runs as f64 - expected).abs() / (2.0 * (2.0 * n).sqrt() * pi * (1.0 - pi)));
        TestResult::from_p_value(self.name(), p, format!("V_n={runs}, pi={pi:.4}"))
    }
}

/// Block layout for the longest-run test, chosen by sequence length
struct LongestRunParams {
    block_size: usize,
    /// Runs at or below this length share the first bin
    min_run: usize,
    /// Runs at or above this length share the last bin
    max_run: usize,
    probabilities: &'static [f64],
}

const SHORT: LongestRunParams = LongestRunParams {
    block_size: 8,
    min_run: 1,
    max_run: 4,
    probabilities: &[0.2148, 0.3672, 0.2305, 0.1875],
};

const MEDIUM: LongestRunParams = LongestRunParams {
    block_size: 128,
    min_run: 4,
    max_run: 9,
    probabilities: &[0.1174, 0.2430, 0.2493, 0.1752, 0.1027, 0.1124],
};

const LONG: LongestRunParams = LongestRunParams {
    block_size: 10_000,
    min_run: 10,
    max_run: 16,
    probabilities: &[0.0882, 0.2092, 0.2483, 0.1933, 0.1208, 0.0675, 0.0727],
};

fn longest_run_params(n: usize) -> &'static LongestRunParams {
    if n < 6_272 {
        &SHORT
    } else if n < 750_000 {
        &MEDIUM
    } else {
        &LONG
    }
}

fn longest_run(block: &[u8]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for &bit in block {
        if bit == 1 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Test 4: longest run of ones within M-bit blocks
pub struct LongestRunOfOnes;

impl StatisticalTest for LongestRunOfOnes {
    fn name(&self) -> &'static str {
        "longest_run_ones_in_a_block"
    }

    fn is_eligible(&self, bits: &[u8]) -> bool {
        bits.len() >= 128
    }

    fn execute(&self, bits: &[u8]) -> TestResult {
        let params = longest_run_params(bits.len());
        let bins = params.probabilities.len();
        let mut observed = vec![0u64; bins];

        let mut num_blocks = 0usize;
        for block in bits.chunks_exact(params.block_size) {
            let run = longest_run(block).clamp(params.min_run, params.max_run);
            observed[run - params.min_run] += 1;
            num_blocks += 1;
        }

        let chi2 = pearson_chi2(&observed, params.probabilities, num_blocks as f64);
        let p = chi2_sf((bins - 1) as f64, chi2);
        TestResult::from_p_value(
            self.name(),
            p,
            format!(
                "chi2={chi2:.4}, N={num_blocks}, M={}, counts={observed:?}",
                params.block_size
            ),
        )
    }
}
