//! Linear complexity test

use super::{chi2_sf, pearson_chi2, StatisticalTest, TestResult};

/// Block length M
const BLOCK_LEN: usize = 500;

/// Minimum number of blocks N
const MIN_BLOCKS: usize = 200;

/// Class probabilities for T <= -2.5, (-2.5, -1.5], ..., (1.5, 2.5], T > 2.5
const PROBABILITIES: [f64; 7] = [0.010417, 0.03125, 0.125, 0.5, 0.25, 0.0625, 0.020833];

/// Length of the shortest LFSR generating `seq` (Berlekamp-Massey over GF(2))
pub fn berlekamp_massey(seq: &[u8]) -> usize {
    let n = seq.len();
    let mut c = vec![0u8; n + 1];
    let mut b = vec![0u8; n + 1];
    c[0] = 1;
    b[0] = 1;
    let mut l = 0usize;
    let mut m: isize = -1;

    for i in 0..n {
        let mut d = seq[i];
        for j in 1..=l {
            d ^= c[j] & seq[i - j];
        }
        if d == 1 {
            let previous = c.clone();
            let shift = (i as isize - m) as usize;
            for j in shift..=n {
                c[j] ^= b[j - shift];
            }
            if l <= i / 2 {
                l = i + 1 - l;
                m = i as isize;
                b = previous;
            }
        }
    }
    l
}

/// Theoretical mean linear complexity of a random M-bit block
fn expected_complexity(m: usize) -> f64 {
    let mf = m as f64;
    let parity = if m % 2 == 0 { -1.0 } else { 1.0 }; // (-1)^(M+1)
    mf / 2.0 + (9.0 + parity) / 36.0 - (mf / 3.0 + 2.0 / 9.0) / 2f64.powi(m as i32)
}

fn class_of(t: f64) -> usize {
    const EDGES: [f64; 6] = [-2.5, -1.5, -0.5, 0.5, 1.5, 2.5];
    EDGES.iter().position(|&edge| t <= edge).unwrap_or(EDGES.len())
}

/// Test 10: distribution of LFSR lengths over M-bit blocks
pub struct LinearComplexity;

impl StatisticalTest for LinearComplexity {
    fn name(&self) -> &'static str {
        "linear_complexity"
    }

    fn is_eligible(&self, bits: &[u8]) -> bool {
        bits.len() >= MIN_BLOCKS * BLOCK_LEN
    }

    fn execute(&self, bits: &[u8]) -> TestResult {
        let mu = expected_complexity(BLOCK_LEN);
        let sign = if BLOCK_LEN % 2 == 0 { 1.0 } else { -1.0 }; // (-1)^M

        let mut observed = [0u64; 7];
        let mut num_blocks = 0usize;
        for block in bits.chunks_exact(BLOCK_LEN) {
            let complexity = berlekamp_massey(block) as f64;
            let t = sign * (complexity - mu) + 2.0 / 9.0;
            observed[class_of(t)] += 1;
            num_blocks += 1;
        }

        let chi2 = pearson_chi2(&observed, &PROBABILITIES, num_blocks as f64);
        let p = chi2_sf((PROBABILITIES.len() - 1) as f64, chi2);
        TestResult::from_p_value(
            self.name(),
            p,
            format!("chi2={chi2:.4}, N={num_blocks}, M={BLOCK_LEN}, counts={observed:?}"),
        )
    }
}
