//! Code matrix construction: the `np_max x nd_max` parity generator matrix
//! under the Cauchy or Vandermonde code family.

use log::trace;

use crate::raid::error::{RaidError, Result};
use crate::raid::galois::{galois_table, GENERATOR};

/// Maximum number of parity blocks supported by any mode.
pub const PARITY_MAX: usize = 6;
/// Maximum number of data blocks supported by any mode.
pub const DATA_MAX: usize = 251;
/// Maximum parity blocks Vandermonde mode can produce invertible submatrices for.
pub const VANDERMONDE_PARITY_MAX: usize = 3;

/// The two code families this engine can construct rows for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Cauchy,
    Vandermonde,
}

impl Mode {
    /// Maximum parity blocks this mode can be used with.
    pub fn parity_max(self) -> usize {
        match self {
            Mode::Cauchy => PARITY_MAX,
            Mode::Vandermonde => VANDERMONDE_PARITY_MAX,
        }
    }
}

/// The `PARITY_MAX x DATA_MAX` code matrix for a given mode, built once and never mutated.
pub struct CodeMatrix {
    mode: Mode,
    rows: [[u8; DATA_MAX]; PARITY_MAX],
}

impl CodeMatrix {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Entry `M[p][d]`.
    #[inline]
    pub fn entry(&self, p: usize, d: usize) -> u8 {
        self.rows[p][d]
    }

    /// Full row `p`, sliced to `nd` columns.
    #[inline]
    pub fn row(&self, p: usize, nd: usize) -> &[u8] {
        &self.rows[p][..nd]
    }

    pub fn build(mode: Mode) -> Self {
        trace!("building code matrix for mode {mode:?}");
        let mut rows = [[0u8; DATA_MAX]; PARITY_MAX];

        // Row 0 ("P"): plain XOR parity, identical in both modes.
        for d in 0..DATA_MAX {
            rows[0][d] = 1;
        }

        match mode {
            Mode::Cauchy => Self::fill_cauchy(&mut rows),
            Mode::Vandermonde => Self::fill_vandermonde(&mut rows),
        }

        CodeMatrix { mode, rows }
    }

    /// The five finite Cauchy poles for rows 1..6, disjoint from the data-column
    /// domain `{1, ..., DATA_MAX}`. `DATA_MAX + POLES.len() == 256`: together
    /// the column domain and the poles account for every element of the field,
    /// which is exactly why five finite poles is the most this construction can
    /// support alongside `DATA_MAX = 251` data columns.
    const POLES: [u8; PARITY_MAX - 1] = [0x00, 0xFC, 0xFD, 0xFE, 0xFF];

    /// Rows 1..6: a single Cauchy matrix spanning every field element, with row 0
    /// sitting at the point at infinity and rows 1..5 at the five finite `POLES`.
    ///
    /// A Cauchy matrix `C[i][j] = 1/(x_i + y_j)` has every square submatrix
    /// invertible whenever the `x_i` are pairwise distinct, the `y_j` are
    /// pairwise distinct, and the two sets are disjoint. Column-normalizing a
    /// finite-pole row by its own first entry is just a row scaling, which
    /// cannot turn a nonsingular submatrix singular, so it preserves that
    /// property while forcing column 0 to read 1 everywhere. The row at the
    /// point at infinity is the limit of that same normalized row as its pole
    /// grows without bound: `(x+y0)/(x+yd) -> 1` as `x -> infinity`, landing
    /// exactly on the plain-XOR row already written above. Together this makes
    /// every submatrix invertible, including ones that mix the all-ones row
    /// with one or more finite-pole rows, not just submatrices drawn from the
    /// finite poles alone.
    fn fill_cauchy(rows: &mut [[u8; DATA_MAX]; PARITY_MAX]) {
        let gf = galois_table();
        for (i, &x) in Self::POLES.iter().enumerate() {
            let mut raw = [0u8; DATA_MAX];
            for d in 0..DATA_MAX {
                let y = (d as u8).wrapping_add(1);
                raw[d] = gf.inv(gf.add(x, y)).expect("pole and column domain are disjoint, x+y != 0");
            }
            let normalizer = gf.inv(raw[0]).expect("Cauchy entries are never zero");
            for d in 0..DATA_MAX {
                rows[1 + i][d] = gf.mul(raw[d], normalizer);
            }
        }
    }

    /// Row 1: classical Reed-Solomon row `M[1][d] = g^d`. Rows 2..5 (only 2..3
    /// are ever used, since Vandermonde is capped at `np=3`): `M[p][d] = g^(p*d)`.
    fn fill_vandermonde(rows: &mut [[u8; DATA_MAX]; PARITY_MAX]) {
        let gf = galois_table();
        for p in 1..PARITY_MAX {
            for d in 0..DATA_MAX {
                rows[p][d] = gf.pow(GENERATOR, (p * d) as u32);
            }
        }
    }
}

/// Validates `np` against the parity limit of `mode`.
pub fn check_parity_limit(mode: Mode, np: usize) -> Result<()> {
    let max = mode.parity_max();
    if np > max {
        return Err(RaidError::VandermondeParityLimit { mode, np, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raid::invert::invert;

    #[test]
    fn row_zero_is_all_ones() {
        let m = CodeMatrix::build(Mode::Cauchy);
        for d in 0..DATA_MAX {
            assert_eq!(m.entry(0, d), 1);
        }
    }

    #[test]
    fn row_one_is_generator_powers_in_vandermonde_mode() {
        let gf = galois_table();
        let m = CodeMatrix::build(Mode::Vandermonde);
        let mut expect = 1u8;
        for d in 0..8 {
            assert_eq!(m.entry(1, d), expect);
            expect = gf.mul(expect, GENERATOR);
        }
    }

    #[test]
    fn cauchy_column_zero_is_all_ones() {
        let m = CodeMatrix::build(Mode::Cauchy);
        for p in 0..PARITY_MAX {
            assert_eq!(m.entry(p, 0), 1);
        }
    }

    /// Subsets of `0..n` of size `k`, as bitmasks.
    fn subsets(n: usize, k: usize) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        for mask in 0u32..(1 << n) {
            if mask.count_ones() as usize == k {
                out.push((0..n).filter(|&i| mask & (1 << i) != 0).collect());
            }
        }
        out
    }

    /// Every square submatrix of the full `PARITY_MAX x nd` Cauchy-family
    /// matrix is invertible, including ones that mix the all-ones row and/or
    /// the generator-power-adjacent finite poles -- this is what
    /// `raid_rec`/`raid_rec_dataonly` actually select from at recovery time,
    /// not just combinations drawn from a single row family.
    #[test]
    fn every_square_submatrix_of_cauchy_matrix_is_invertible() {
        let m = CodeMatrix::build(Mode::Cauchy);
        let nd = 8;
        for k in 1..=PARITY_MAX {
            for rows in subsets(PARITY_MAX, k) {
                for cols in subsets(nd, k) {
                    let sub: Vec<Vec<u8>> =
                        rows.iter().map(|&p| cols.iter().map(|&d| m.entry(p, d)).collect()).collect();
                    assert!(invert(&sub).is_ok(), "rows={rows:?} cols={cols:?} k={k} submatrix should invert");
                }
            }
        }
    }

    #[test]
    fn vandermonde_parity_limit_enforced() {
        assert!(check_parity_limit(Mode::Vandermonde, 3).is_ok());
        assert!(check_parity_limit(Mode::Vandermonde, 4).is_err());
        assert!(check_parity_limit(Mode::Cauchy, 6).is_ok());
        assert!(check_parity_limit(Mode::Cauchy, 7).is_err());
    }
}
