//! NIST SP800-22r1a statistical test battery
//!
//! Every test consumes a bit sequence (`&[u8]` of 0/1 values), declares
//! whether the sequence is long enough for it, and produces one or more
//! p-values. A test passes when all of its p-values reach the significance
//! level (0.01).
//!
//! The pipeline only uses three entry points:
//! - [`sp800_22r1a_battery`]: the fixed, ordered registry
//! - [`check_eligibility_all_battery`]: filter the registry for a sequence
//! - [`run_all_battery`]: run the eligible tests and time each one

pub mod complexity;
pub mod excursions;
pub mod frequency;
pub mod matrix;
pub mod runs;
pub mod serial;
pub mod spectral;
pub mod template;
pub mod universal;

use crate::constants::battery::SIGNIFICANCE;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use std::time::Instant;
use tracing::{debug, info};

/// A single statistical test
pub trait StatisticalTest: Send + Sync {
    /// Registry name, e.g. "monobit"
    fn name(&self) -> &'static str;

    /// Whether `bits` satisfies this test's structural preconditions
    fn is_eligible(&self, bits: &[u8]) -> bool;

    /// Run the test
    ///
    /// Callers are expected to check eligibility first; running on an
    /// ineligible sequence yields a meaningless (usually failing) result.
    fn execute(&self, bits: &[u8]) -> TestResult;
}

/// Outcome of one test run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    /// Smallest p-value produced by the test
    pub score: f64,
    pub p_values: Vec<f64>,
    pub details: String,
}

impl TestResult {
    /// Build a result from every p-value a test produced
    ///
    /// The score is the smallest p-value. The test passes only if there is at
    /// least one p-value and none is below the significance level (NaN fails).
    pub fn from_p_values(name: &str, p_values: Vec<f64>, details: String) -> Self {
        let score = p_values.iter().copied().fold(f64::NAN, f64::min);
        let passed = !p_values.is_empty() && p_values.iter().all(|&p| p >= SIGNIFICANCE);
        Self {
            name: name.to_string(),
            passed,
            score,
            p_values,
            details,
        }
    }

    /// Build a result from a single p-value
    pub fn from_p_value(name: &str, p: f64, details: String) -> Self {
        Self::from_p_values(name, vec![p], details)
    }
}

/// A test result with its wall-clock run time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedResult {
    #[serde(flatten)]
    pub result: TestResult,
    pub elapsed_ms: u64,
}

/// The SP800-22r1a registry, in reporting order
pub fn sp800_22r1a_battery() -> Vec<Box<dyn StatisticalTest>> {
    vec![
        Box::new(frequency::Monobit),
        Box::new(frequency::FrequencyWithinBlock),
        Box::new(runs::Runs),
        Box::new(runs::LongestRunOfOnes),
        Box::new(matrix::BinaryMatrixRank),
        Box::new(spectral::Dft),
        Box::new(template::NonOverlappingTemplate),
        Box::new(template::OverlappingTemplate),
        Box::new(universal::MaurersUniversal),
        Box::new(complexity::LinearComplexity),
        Box::new(serial::Serial),
        Box::new(serial::ApproximateEntropy),
        Box::new(excursions::CumulativeSums),
        Box::new(excursions::RandomExcursion),
        Box::new(excursions::RandomExcursionVariant),
    ]
}

/// Tests from `battery` that can run on `bits`, in registry order
pub fn check_eligibility_all_battery<'a>(
    bits: &[u8],
    battery: &'a [Box<dyn StatisticalTest>],
) -> Vec<&'a dyn StatisticalTest> {
    battery
        .iter()
        .map(|test| test.as_ref())
        .filter(|test| {
            let eligible = test.is_eligible(bits);
            debug!(test = test.name(), eligible, n = bits.len(), "eligibility");
            eligible
        })
        .collect()
}

/// Run every test in `eligible` once, in order
///
/// Failures are results, never errors. With `verbose`, each result is also
/// logged as it completes.
pub fn run_all_battery(
    bits: &[u8],
    eligible: &[&dyn StatisticalTest],
    verbose: bool,
) -> Vec<TimedResult> {
    eligible
        .iter()
        .map(|test| {
            let start = Instant::now();
            let result = test.execute(bits);
            let elapsed_ms = start.elapsed().as_millis() as u64;
            if verbose {
                info!(
                    test = %result.name,
                    passed = result.passed,
                    score = result.score,
                    elapsed_ms,
                    "{}",
                    result.details
                );
            }
            TimedResult { result, elapsed_ms }
        })
        .collect()
}

// Shared helpers

/// Survival function of the chi-squared distribution
///
/// Equivalent to `igamc(df / 2, x / 2)`.
pub(crate) fn chi2_sf(df: f64, x: f64) -> f64 {
    ChiSquared::new(df).map(|d| d.sf(x)).unwrap_or(f64::NAN)
}

/// Number of ones in a bit sequence
pub(crate) fn count_ones(bits: &[u8]) -> usize {
    bits.iter().filter(|&&b| b == 1).count()
}

/// Map a bit to the ±1 step used by the random-walk tests
pub(crate) fn step(bit: u8) -> i64 {
    if bit == 1 {
        1
    } else {
        -1
    }
}

/// Pearson chi-squared statistic of observed counts against probabilities
pub(crate) fn pearson_chi2(observed: &[u64], probabilities: &[f64], total: f64) -> f64 {
    observed
        .iter()
        .zip(probabilities)
        .map(|(&obs, &p)| {
            let expected = total * p;
            let diff = obs as f64 - expected;
            diff * diff / expected
        })
        .sum()
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_registry_order_and_names() {
        let battery = sp800_22r1a_battery();
        let names: Vec<&str> = battery.iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec![
                "monobit",
                "frequency_within_block",
                "runs",
                "longest_run_ones_in_a_block",
                "binary_matrix_rank",
                "dft",
                "non_overlapping_template_matching",
                "overlapping_template_matching",
                "maurers_universal",
                "linear_complexity",
                "serial",
                "approximate_entropy",
                "cumulative_sums",
                "random_excursion",
                "random_excursion_variant",
            ]
        );
    }

    #[test]
    fn test_too_short_sequence_is_ineligible_everywhere() {
        let battery = sp800_22r1a_battery();
        let bits = bits_from_str("0110101101001011");
        let eligible = check_eligibility_all_battery(&bits, &battery);
        assert!(eligible.is_empty());
        assert!(run_all_battery(&bits, &eligible, false).is_empty());
    }

    #[test]
    fn test_empty_sequence_is_ineligible_everywhere() {
        let battery = sp800_22r1a_battery();
        assert!(check_eligibility_all_battery(&[], &battery).is_empty());
    }

    #[test]
    fn test_eligibility_preserves_registry_order() {
        let battery = sp800_22r1a_battery();
        let bits = pseudo_random_bits(1000, 1);
        let eligible: Vec<&str> = check_eligibility_all_battery(&bits, &battery)
            .iter()
            .map(|t| t.name())
            .collect();
        assert_eq!(
            eligible,
            vec![
                "monobit",
                "frequency_within_block",
                "runs",
                "longest_run_ones_in_a_block",
                "dft",
                "serial",
                "approximate_entropy",
                "cumulative_sums",
            ]
        );
    }

    #[test]
    fn test_all_zero_sequence_fails_monobit() {
        let battery = sp800_22r1a_battery();
        let bits = vec![0u8; 10_000];
        let eligible = check_eligibility_all_battery(&bits, &battery);
        let results = run_all_battery(&bits, &eligible, false);

        let monobit = results
            .iter()
            .find(|r| r.result.name == "monobit")
            .expect("monobit should be eligible");
        assert!(!monobit.result.passed);
        assert!(monobit.result.score < 1e-10);
    }

    #[test]
    fn test_pseudo_random_sequence_mostly_passes() {
        let battery = sp800_22r1a_battery();
        let bits = pseudo_random_bits(200_000, 42);
        let eligible = check_eligibility_all_battery(&bits, &battery);
        let results = run_all_battery(&bits, &eligible, true);

        assert_eq!(results.len(), eligible.len());
        let passed = results.iter().filter(|r| r.result.passed).count();
        assert!(
            passed + 1 >= results.len(),
            "only {passed}/{} tests passed",
            results.len()
        );
    }

    #[test]
    fn test_result_score_is_min_p_value() {
        let result = TestResult::from_p_values("t", vec![0.5, 0.02, 0.9], String::new());
        assert_eq!(result.score, 0.02);
        assert!(result.passed);

        let result = TestResult::from_p_values("t", vec![0.5, 0.001], String::new());
        assert!(!result.passed);
    }

    #[test]
    fn test_result_nan_fails() {
        let result = TestResult::from_p_value("t", f64::NAN, String::new());
        assert!(!result.passed);
        assert!(result.score.is_nan());

        let result = TestResult::from_p_values("t", vec![], String::new());
        assert!(!result.passed);
    }

    #[test]
    fn test_chi2_sf_matches_igamc() {
        // igamc(1, x/2) = exp(-x/2) for df = 2
        approx::assert_abs_diff_eq!(chi2_sf(2.0, 3.0), (-1.5f64).exp(), epsilon = 1e-12);
        assert!(chi2_sf(0.0, 1.0).is_nan());
    }
}
