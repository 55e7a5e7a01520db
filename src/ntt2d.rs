//! Two-dimensional NTT by separable row/column transforms
//!
//! Forward: transform every row, transpose, transform every row again (the
//! original columns), transpose back.
//! Inverse: transpose, inverse-transform every row (undoing the column pass),
//! transpose back, inverse-transform every row (undoing the row pass).
//!
//! Each 1D inverse applies its own n^{-1} scaling, so the n^{-2} factor of the
//! 2D inverse emerges from the two passes.

use std::time::Instant;

use tracing::debug;

use crate::config::NttConfig;
use crate::error::Result;
use crate::matrix::Matrix;
use crate::modular_arithmetic::ModularArithmetic;
use crate::ntt::{self, NttEngine};

/// Row pass, then column pass via transposition
pub(crate) fn separable_forward<F>(matrix: &Matrix, config: &NttConfig, transform: F) -> Result<Matrix>
where
    F: Fn(&[u64]) -> Result<Vec<u64>> + Sync,
{
    let rows_done = matrix.map_rows(config, &transform)?;
    let columns_done = rows_done.transpose().map_rows(config, &transform)?;
    Ok(columns_done.transpose())
}

/// Column pass via transposition, then row pass
pub(crate) fn separable_inverse<F>(matrix: &Matrix, config: &NttConfig, transform: F) -> Result<Matrix>
where
    F: Fn(&[u64]) -> Result<Vec<u64>> + Sync,
{
    let columns_done = matrix.transpose().map_rows(config, &transform)?.transpose();
    columns_done.map_rows(config, &transform)
}

/// Forward 2D NTT of an n × n matrix with the default configuration
///
/// # Errors
/// * `NotPowerOfTwo` if n is zero or not a power of two
/// * `InvalidModulus` if p < 2
pub fn ntt_2d(matrix: &Matrix, modulus: u64, root: u64) -> Result<Matrix> {
    ntt_2d_with(matrix, modulus, root, &NttConfig::default())
}

/// Inverse 2D NTT of an n × n matrix with the default configuration
///
/// # Errors
/// As [`ntt_2d`], plus `NoInverse` if p divides n.
pub fn intt_2d(matrix: &Matrix, modulus: u64, root_inverse: u64) -> Result<Matrix> {
    intt_2d_with(matrix, modulus, root_inverse, &NttConfig::default())
}

pub fn ntt_2d_with(matrix: &Matrix, modulus: u64, root: u64, config: &NttConfig) -> Result<Matrix> {
    matrix.check_power_of_two()?;
    let arith = ModularArithmetic::new(modulus)?;
    let start = Instant::now();

    let result = separable_forward(matrix, config, |row| {
        Ok(ntt::forward_unchecked(row, &arith, root, config.strategy))
    })?;

    debug!(
        size = matrix.size(),
        modulus,
        strategy = ?config.strategy,
        elapsed = ?start.elapsed(),
        "2D forward NTT completed"
    );
    Ok(result)
}

pub fn intt_2d_with(matrix: &Matrix, modulus: u64, root_inverse: u64, config: &NttConfig) -> Result<Matrix> {
    matrix.check_power_of_two()?;
    let arith = ModularArithmetic::new(modulus)?;
    let start = Instant::now();

    let result = separable_inverse(matrix, config, |row| {
        ntt::inverse_unchecked(row, &arith, root_inverse, config.strategy)
    })?;

    debug!(
        size = matrix.size(),
        modulus,
        strategy = ?config.strategy,
        elapsed = ?start.elapsed(),
        "2D inverse NTT completed"
    );
    Ok(result)
}

impl NttEngine {
    /// Forward 2D NTT; the matrix size must equal the parameter dimension
    pub fn forward_2d(&self, matrix: &Matrix) -> Result<Matrix> {
        separable_forward(matrix, self.config(), |row| self.forward(row))
    }

    /// Inverse 2D NTT; the matrix size must equal the parameter dimension
    pub fn inverse_2d(&self, matrix: &Matrix) -> Result<Matrix> {
        separable_inverse(matrix, self.config(), |row| self.inverse(row))
    }
}
