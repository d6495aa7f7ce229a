//! Binary matrix rank test

use super::{chi2_sf, pearson_chi2, StatisticalTest, TestResult};

/// Matrix rows and columns
const DIM: usize = 32;

/// Minimum number of matrices
const MIN_MATRICES: usize = 38;

/// Rank of a square GF(2) matrix whose rows are packed into `u32`s
fn gf2_rank(rows: &mut [u32; DIM]) -> usize {
    let mut rank = 0;
    for col in (0..DIM).rev() {
        let mask = 1u32 << col;
        let Some(pivot) = (rank..DIM).find(|&r| rows[r] & mask != 0) else {
            continue;
        };
        rows.swap(rank, pivot);
        let pivot_row = rows[rank];
        for (r, row) in rows.iter_mut().enumerate() {
            if r != rank && *row & mask != 0 {
                *row ^= pivot_row;
            }
        }
        rank += 1;
    }
    rank
}

/// Probability that a random M x Q binary matrix has rank `r`
fn rank_probability(r: usize, m: usize, q: usize) -> f64 {
    let exponent = (r * (q + m - r)) as f64 - (m * q) as f64;
    let product: f64 = (0..r)
        .map(|i| {
            let i = i as f64;
            (1.0 - 2f64.powf(i - q as f64)) * (1.0 - 2f64.powf(i - m as f64))
                / (1.0 - 2f64.powf(i - r as f64))
        })
        .product();
    2f64.powf(exponent) * product
}

/// Test 5: rank distribution of disjoint 32x32 matrices
pub struct BinaryMatrixRank;

impl StatisticalTest for BinaryMatrixRank {
    fn name(&self) -> &'static str {
        "binary_matrix_rank"
    }

    fn is_eligible(&self, bits: &[u8]) -> bool {
        bits.len() >= MIN_MATRICES * DIM * DIM
    }

    fn execute(&self, bits: &[u8]) -> TestResult {
        // full rank, full rank - 1, everything else
        let mut observed = [0u64; 3];
        let mut num_matrices = 0usize;

        for matrix in bits.chunks_exact(DIM * DIM) {
            let mut rows = [0u32; DIM];
            for (row, chunk) in rows.iter_mut().zip(matrix.chunks_exact(DIM)) {
                *row = chunk.iter().fold(0u32, |acc, &b| (acc << 1) | u32::from(b));
            }
            match gf2_rank(&mut rows) {
                DIM => observed[0] += 1,
                r if r == DIM - 1 => observed[1] += 1,
                _ => observed[2] += 1,
            }
            num_matrices += 1;
        }

        let p_full = rank_probability(DIM, DIM, DIM);
        let p_minus_one = rank_probability(DIM - 1, DIM, DIM);
        let probabilities = [p_full, p_minus_one, 1.0 - p_full - p_minus_one];

        let chi2 = pearson_chi2(&observed, &probabilities, num_matrices as f64);
        let p = chi2_sf(2.0, chi2);
        TestResult::from_p_value(
            self.name(),
            p,
            format!(
                "chi2={chi2:.4}, N={num_matrices}, F_M={}, F_M-1={}",
                observed[0], observed[1]
            ),
        )
    }
}
