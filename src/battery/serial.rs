//! Serial and approximate entropy tests
//!
//! Both count overlapping m-bit patterns on the sequence extended cyclically
//! by its first m-1 bits.

use super::{chi2_sf, StatisticalTest, TestResult};
use std::f64::consts::LN_2;

/// Largest pattern length used by the serial test
const SERIAL_MAX_M: usize = 16;

/// Largest pattern length used by the approximate entropy test
const APEN_MAX_M: usize = 14;

/// Occurrence counts of every overlapping `m`-bit pattern, with wraparound
fn pattern_counts(bits: &[u8], m: usize) -> Vec<u64> {
    let n = bits.len();
    let mut counts = vec![0u64; 1 << m];
    if m == 0 || n == 0 {
        counts[0] = n as u64;
        return counts;
    }
    let mask = (1usize << m) - 1;
    let mut value = 0usize;
    for j in 0..m - 1 {
        value = (value << 1) | bits[j % n] as usize;
    }
    for i in 0..n {
        value = ((value << 1) | bits[(i + m - 1) % n] as usize) & mask;
        counts[value] += 1;
    }
    counts
}

/// ψ²_m statistic; zero for m = 0
fn psi_sq(bits: &[u8], m: usize) -> f64 {
    if m == 0 {
        return 0.0;
    }
    let n = bits.len() as f64;
    let sum_sq: f64 = pattern_counts(bits, m)
        .iter()
        .map(|&c| (c as f64) * (c as f64))
        .sum();
    sum_sq * 2f64.powi(m as i32) / n - n
}

/// floor(log2(n)) for n >= 1
fn log2_floor(n: usize) -> usize {
    (usize::BITS - 1 - n.max(1).leading_zeros()) as usize
}

/// Test 11: uniformity of overlapping m-bit patterns
pub struct Serial;

impl Serial {
    /// Pattern length satisfying m < floor(log2 n) - 2
    pub fn pattern_len_for(n: usize) -> usize {
        log2_floor(n).saturating_sub(3).clamp(2, SERIAL_MAX_M)
    }
}

impl StatisticalTest for Serial {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn is_eligible(&self, bits: &[u8]) -> bool {
        bits.len() >= 64
    }

    fn execute(&self, bits: &[u8]) -> TestResult {
        serial_test(bits, Self::pattern_len_for(bits.len()))
    }
}

/// Serial test with an explicit pattern length (m >= 2)
///
/// `m` below 2 or an empty sequence yields a failing result with no p-values.
pub fn serial_test(bits: &[u8], m: usize) -> TestResult {
    if m < 2 || bits.is_empty() {
        return TestResult::from_p_values(
            "serial",
            Vec::new(),
            format!("m={m} needs m >= 2 and a non-empty sequence"),
        );
    }
    let psi_m = psi_sq(bits, m);
    let psi_m1 = psi_sq(bits, m - 1);
    let psi_m2 = psi_sq(bits, m.saturating_sub(2));

    let delta1 = psi_m - psi_m1;
    let delta2 = psi_m - 2.0 * psi_m1 + psi_m2;
    let p1 = chi2_sf(2f64.powi(m as i32 - 1), delta1);
    let p2 = chi2_sf(2f64.powi(m as i32 - 2), delta2);
    TestResult::from_p_values(
        "serial",
        vec![p1, p2],
        format!("m={m}, del_psi2={delta1:.4}, del2_psi2={delta2:.4}"),
    )
}

/// Test 12: approximate entropy of m- and (m+1)-bit patterns
pub struct ApproximateEntropy;

impl ApproximateEntropy {
    /// Pattern length satisfying m < floor(log2 n) - 5
    pub fn pattern_len_for(n: usize) -> usize {
        log2_floor(n).saturating_sub(6).clamp(2, APEN_MAX_M)
    }
}

impl StatisticalTest for ApproximateEntropy {
    fn name(&self) -> &'static str {
        "approximate_entropy"
    }

    fn is_eligible(&self, bits: &[u8]) -> bool {
        bits.len() >= 256
    }

    fn execute(&self, bits: &[u8]) -> TestResult {
        approximate_entropy(bits, Self::pattern_len_for(bits.len()))
    }
}

/// Approximate entropy with an explicit pattern length
pub fn approximate_entropy(bits: &[u8], m: usize) -> TestResult {
    if bits.is_empty() {
        return TestResult::from_p_values(
            "approximate_entropy",
            Vec::new(),
            "empty sequence".to_string(),
        );
    }
    let n = bits.len() as f64;
    let phi = |len: usize| -> f64 {
        pattern_counts(bits, len)
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f64 / n;
                p * p.ln()
            })
            .sum()
    };

    let apen = phi(m) - phi(m + 1);
    let chi2 = 2.0 * n * (LN_2 - apen);
    let p = chi2_sf(2f64.powi(m as i32), chi2);
    TestResult::from_p_value(
        "approximate_entropy",
        p,
        format!("m={m}, ApEn={apen:.6}, chi2={chi2:.4}"),
    )
}
