//! Random-walk tests: cumulative sums, random excursions and the variant
//!
//! All three view the sequence as a ±1 walk S_k = X_1 + ... + X_k.

use super::{chi2_sf, pearson_chi2, step, StatisticalTest, TestResult};
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::function::erf::erfc;

/// Minimum sequence length for the excursion tests
const EXCURSION_MIN_BITS: usize = 1_000_000;

/// Minimum number of zero-crossing cycles for the excursion tests
const EXCURSION_MIN_CYCLES: usize = 500;

/// Number of states examined by the random excursions test
const NUM_STATES: usize = 8;

/// States examined by the random excursions test
const EXCURSION_STATES: [i64; NUM_STATES] = [-4, -3, -2, -1, 1, 2, 3, 4];

/// Visits per cycle are binned as 0, 1, 2, 3, 4 and >= 5
const VISIT_CLASSES: usize = 6;

/// Maximum state examined by the variant test (both signs)
const VARIANT_MAX_STATE: i64 = 9;

/// Partial sums S_1..S_n
fn partial_sums<I: Iterator<Item = u8>>(bits: I) -> impl Iterator<Item = i64> {
    bits.scan(0i64, |s, b| {
        *s += step(b);
        Some(*s)
    })
}

/// Number of cycles J: returns to zero of the walk padded with a final 0
pub fn cycle_count(bits: &[u8]) -> usize {
    if bits.is_empty() {
        return 0;
    }
    let returns = partial_sums(bits.iter().copied()).filter(|&s| s == 0).count();
    // The padding zero closes the last cycle unless the walk already ended on 0
    match partial_sums(bits.iter().copied()).last() {
        Some(0) => returns,
        _ => returns + 1,
    }
}

fn excursion_eligible(bits: &[u8]) -> bool {
    bits.len() >= EXCURSION_MIN_BITS && cycle_count(bits) >= EXCURSION_MIN_CYCLES
}

/// P-value of the cumulative sums statistic `z` over `n` steps
fn cusum_p_value(n: usize, z: f64) -> f64 {
    let norm = Normal::standard();
    let nf = n as f64;
    let sqrt_n = nf.sqrt();

    let end = ((nf / z - 1.0) / 4.0).trunc() as i64;
    let first_start = ((-nf / z + 1.0) / 4.0).trunc() as i64;
    let second_start = ((-nf / z - 3.0) / 4.0).trunc() as i64;

    let first: f64 = (first_start..=end)
        .map(|k| {
            let k = k as f64;
            norm.cdf((4.0 * k + 1.0) * z / sqrt_n) - norm.cdf((4.0 * k - 1.0) * z / sqrt_n)
        })
        .sum();
    let second: f64 = (second_start..=end)
        .map(|k| {
            let k = k as f64;
            norm.cdf((4.0 * k + 3.0) * z / sqrt_n) - norm.cdf((4.0 * k + 1.0) * z / sqrt_n)
        })
        .sum();

    (1.0 - first + second).clamp(0.0, 1.0)
}

/// Maximum |S_k| over the walk
fn max_excursion<I: Iterator<Item = u8>>(bits: I) -> f64 {
    partial_sums(bits)
        .map(i64::unsigned_abs)
        .max()
        .unwrap_or(0) as f64
}

/// Test 13: maximal excursion of the walk, forward and backward
pub struct CumulativeSums;

impl StatisticalTest for CumulativeSums {
    fn name(&self) -> &'static str {
        "cumulative_sums"
    }

    fn is_eligible(&self, bits: &[u8]) -> bool {
        bits.len() >= 100
    }

    fn execute(&self, bits: &[u8]) -> TestResult {
        let n = bits.len();
        let z_forward = max_excursion(bits.iter().copied());
        let z_backward = max_excursion(bits.iter().rev().copied());
        let p_forward = cusum_p_value(n, z_forward);
        let p_backward = cusum_p_value(n, z_backward);
        TestResult::from_p_values(
            self.name(),
            vec![p_forward, p_backward],
            format!("z_forward={z_forward}, z_backward={z_backward}"),
        )
    }
}

/// Per-state visit counts within every cycle
fn cycle_visit_table(bits: &[u8]) -> ([[u64; VISIT_CLASSES]; NUM_STATES], usize) {
    let mut table = [[0u64; VISIT_CLASSES]; NUM_STATES];
    let mut visits = [0usize; NUM_STATES];
    let mut cycles = 0usize;

    let mut close_cycle = |visits: &mut [usize; NUM_STATES]| {
        for (row, count) in table.iter_mut().zip(visits.iter_mut()) {
            row[(*count).min(VISIT_CLASSES - 1)] += 1;
            *count = 0;
        }
        cycles += 1;
    };

    let mut last = 0i64;
    for s in partial_sums(bits.iter().copied()) {
        if s == 0 {
            close_cycle(&mut visits);
        } else if let Some(idx) = EXCURSION_STATES.iter().position(|&x| x == s) {
            visits[idx] += 1;
        }
        last = s;
    }
    if last != 0 && !bits.is_empty() {
        close_cycle(&mut visits);
    }
    (table, cycles)
}

/// Probability of exactly `k` visits to state `x` in one cycle (k = 5 means >= 5)
fn visit_probability(x: i64, k: usize) -> f64 {
    let ax = x.unsigned_abs() as f64;
    let stay = 1.0 - 1.0 / (2.0 * ax);
    match k {
        0 => stay,
        5 => stay.powi(4) / (2.0 * ax),
        _ => stay.powi(k as i32 - 1) / (4.0 * ax * ax),
    }
}

/// Test 14: visits to states ±1..±4 per cycle
pub struct RandomExcursion;

impl StatisticalTest for RandomExcursion {
    fn name(&self) -> &'static str {
        "random_excursion"
    }

    fn is_eligible(&self, bits: &[u8]) -> bool {
        excursion_eligible(bits)
    }

    fn execute(&self, bits: &[u8]) -> TestResult {
        let (table, cycles) = cycle_visit_table(bits);
        let j = cycles as f64;

        let p_values: Vec<f64> = EXCURSION_STATES
            .iter()
            .zip(table.iter())
            .map(|(&x, observed)| {
                let probabilities: Vec<f64> =
                    (0..VISIT_CLASSES).map(|k| visit_probability(x, k)).collect();
                let chi2 = pearson_chi2(observed, &probabilities, j);
                chi2_sf((VISIT_CLASSES - 1) as f64, chi2)
            })
            .collect();

        TestResult::from_p_values(self.name(), p_values, format!("J={cycles}"))
    }
}

/// Test 15: total visits to states ±1..±9 against the cycle count
pub struct RandomExcursionVariant;

/// Total visits to every state in -9..=9 (index = state + 9)
fn state_visits(bits: &[u8]) -> [u64; 2 * VARIANT_MAX_STATE as usize + 1] {
    let mut visits = [0u64; 2 * VARIANT_MAX_STATE as usize + 1];
    for s in partial_sums(bits.iter().copied()) {
        if s.abs() <= VARIANT_MAX_STATE {
            visits[(s + VARIANT_MAX_STATE) as usize] += 1;
        }
    }
    visits
}

/// One p-value per state in -9..=-1, 1..=9
fn variant_p_values(bits: &[u8]) -> Vec<f64> {
    let j = cycle_count(bits) as f64;
    let visits = state_visits(bits);
    (-VARIANT_MAX_STATE..=VARIANT_MAX_STATE)
        .filter(|&x| x != 0)
        .map(|x| {
            let xi = visits[(x + VARIANT_MAX_STATE) as usize] as f64;
            let denom = (2.0 * j * (4.0 * x.unsigned_abs() as f64 - 2.0)).sqrt();
            erfc((xi - j).abs() / denom)
        })
        .collect()
}

impl StatisticalTest for RandomExcursionVariant {
    fn name(&self) -> &'static str {
        "random_excursion_variant"
    }

    fn is_eligible(&self, bits: &[u8]) -> bool {
        excursion_eligible(bits)
    }

    fn execute(&self, bits: &[u8]) -> TestResult {
        let p_values = variant_p_values(bits);
        TestResult::from_p_values(
            self.name(),
            p_values,
            format!("J={}", cycle_count(bits)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::test_support::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cusum_worked_example() {
        let bits = bits_from_str("1011010111");
        assert_eq!(max_excursion(bits.iter().copied()), 4.0);
        assert_abs_diff_eq!(cusum_p_value(10, 4.0), 0.4116588, epsilon = 1e-6);
    }

    #[test]
    fn test_cusum_forward_and_backward() {
        // NIST SP800-22 §2.13.8: z = 16 forward, z = 19 backward
        let bits = bits_from_str(
            "1100100100001111110110101010001000100001011010001100001000110100110001001100011001100010100010111000",
        );
        let result = CumulativeSums.execute(&bits);
        assert_eq!(result.p_values.len(), 2);
        assert_abs_diff_eq!(result.p_values[0], 0.219194, epsilon = 1e-6);
        assert_abs_diff_eq!(result.p_values[1], 0.114866, epsilon = 1e-6);
        assert!(result.passed);
        assert_abs_diff_eq!(result.score, 0.114866, epsilon = 1e-6);
    }

    #[test]
    fn test_cusum_biased_sequence_fails() {
        let mut bits = vec![1u8; 600];
        bits.extend(vec![0u8; 400]);
        assert!(!CumulativeSums.execute(&bits).passed);
    }

    #[test]
    fn test_cycle_count_worked_example() {
        // NIST SP800-22 §2.14.4: 0110110101 has J = 3
        let bits = bits_from_str("0110110101");
        assert_eq!(cycle_count(&bits), 3);
        let (table, cycles) = cycle_visit_table(&bits);
        assert_eq!(cycles, 3);
        // State +1 is visited 0, 1 and 3 times in the three cycles
        let plus_one = EXCURSION_STATES.iter().position(|&x| x == 1).unwrap();
        assert_eq!(table[plus_one], [1, 1, 0, 1, 0, 0]);
    }

    #[test]
    fn test_cycle_count_walk_ending_on_zero() {
        // 0101: S = -1, 0, -1, 0 -> two cycles, no padding cycle
        assert_eq!(cycle_count(&bits_from_str("0101")), 2);
        assert_eq!(cycle_visit_table(&bits_from_str("0101")).1, 2);
        assert_eq!(cycle_count(&[]), 0);
    }

    #[test]
    fn test_visit_probabilities_sum_to_one() {
        for &x in &EXCURSION_STATES {
            let total: f64 = (0..VISIT_CLASSES).map(|k| visit_probability(x, k)).sum();
            assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_variant_worked_example() {
        // NIST SP800-22 §2.15.4: state +1 is visited 4 times, p = 0.683091
        let bits = bits_from_str("0110110101");
        let visits = state_visits(&bits);
        assert_eq!(visits[(1 + VARIANT_MAX_STATE) as usize], 4);
        let p_values = variant_p_values(&bits);
        assert_eq!(p_values.len(), 18);
        // Index 9 is state +1 (after -9..=-1)
        assert_abs_diff_eq!(p_values[9], 0.683091, epsilon = 1e-6);
    }

    #[test]
    fn test_excursion_eligibility() {
        let short = pseudo_random_bits(10_000, 2);
        assert!(!RandomExcursion.is_eligible(&short));
        assert!(!RandomExcursionVariant.is_eligible(&short));
        // Long but with too few cycles: the walk never returns to zero
        let drifting = vec![1u8; EXCURSION_MIN_BITS];
        assert!(!RandomExcursion.is_eligible(&drifting));
    }

    #[test]
    fn test_excursions_on_random_megabit() {
        let bits = pseudo_random_bits(EXCURSION_MIN_BITS, 2);
        assert!(cycle_count(&bits) >= EXCURSION_MIN_CYCLES);
        assert!(RandomExcursion.is_eligible(&bits));
        assert!(RandomExcursionVariant.is_eligible(&bits));

        let excursion = RandomExcursion.execute(&bits);
        assert_eq!(excursion.p_values.len(), NUM_STATES);
        assert!(excursion.passed, "{:?}", excursion.p_values);

        let variant = RandomExcursionVariant.execute(&bits);
        assert_eq!(variant.p_values.len(), 18);
        assert!(variant.passed, "{:?}", variant.p_values);
    }
}
