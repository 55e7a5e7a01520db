//! Circular convolution of square matrices and cyclic polynomial products
//!
//! Two routes compute the same 2D circular convolution modulo p:
//! - [`convolve_spatial`]: the direct O(n⁴) double sum, kept as an oracle.
//! - [`convolve_frequency`]: NTT2D of both inputs, pointwise product, INTT2D.
//!
//! The frequency route equals the spatial one only when ω is a primitive n-th
//! root, so it validates its parameters through [`NttParams`].

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use crate::config::NttConfig;
use crate::error::{NttError, Result};
use crate::matrix::Matrix;
use crate::modular_arithmetic::ModularArithmetic;
use crate::ntt::{NttEngine, NttParams};

/// Direct 2D circular convolution modulo p
///
/// result[i][j] = Σ_{k,l} A[(i-k) mod n][(j-l) mod n] · B[k][l] mod p
///
/// The running sum is reduced after every term.
///
/// # Errors
/// * `InvalidDimension` if A and B differ in size
/// * `InvalidModulus` if p < 2
pub fn convolve_spatial(a: &Matrix, b: &Matrix, modulus: u64) -> Result<Matrix> {
    convolve_spatial_with(a, b, modulus, &NttConfig::default())
}

/// [`convolve_spatial`] with output rows spread over rayon when configured
pub fn convolve_spatial_with(a: &Matrix, b: &Matrix, modulus: u64, config: &NttConfig) -> Result<Matrix> {
    a.check_same_size(b)?;
    let arith = ModularArithmetic::new(modulus)?;
    let n = a.size();
    let start = Instant::now();

    let output_row = |i: usize| -> Vec<u64> {
        (0..n)
            .map(|j| {
                let mut sum = 0u64;
                for k in 0..n {
                    let a_row = a.row((i + n - k) % n);
                    for l in 0..n {
                        let term = arith.mul_mod(a_row[(j + n - l) % n], b[(k, l)]);
                        sum = arith.add_mod(sum, term);
                    }
                }
                sum
            })
            .collect()
    };

    let rows: Vec<Vec<u64>> = if config.use_parallel(n) {
        (0..n).into_par_iter().map(output_row).collect()
    } else {
        (0..n).map(output_row).collect()
    };

    debug!(size = n, modulus, elapsed = ?start.elapsed(), "spatial convolution completed");
    Matrix::new(rows)
}

/// 2D circular convolution through the frequency domain
///
/// Computes INTT2D(NTT2D(A) ∘ NTT2D(B)), where ∘ is the pointwise product.
///
/// # Errors
/// * `InvalidDimension` if A and B differ in size
/// * `NotPowerOfTwo`, `ModulusNotPrime`, `NotPrimitiveRoot` or
///   `RootInverseMismatch` if the parameters do not define an NTT of size n
pub fn convolve_frequency(
    a: &Matrix,
    b: &Matrix,
    modulus: u64,
    root: u64,
    root_inverse: u64,
) -> Result<Matrix> {
    a.check_same_size(b)?;
    let params = NttParams::with_inverse(a.size(), modulus, root, root_inverse)?;
    NttEngine::new(Arc::new(params), NttConfig::default()).convolve_2d(a, b)
}

/// Cyclic polynomial product f · g mod (x^n - 1, p) by schoolbook summation
///
/// # Errors
/// * `InvalidDimension` if f and g differ in length
/// * `InvalidModulus` if p < 2
pub fn multiply_cyclic_schoolbook(f: &[u64], g: &[u64], modulus: u64) -> Result<Vec<u64>> {
    if f.len() != g.len() {
        return Err(NttError::InvalidDimension {
            expected: f.len(),
            got: g.len(),
        });
    }
    let arith = ModularArithmetic::new(modulus)?;
    let n = f.len();

    let mut result = vec![0u64; n];
    for (i, &fi) in f.iter().enumerate() {
        for (j, &gj) in g.iter().enumerate() {
            let k = (i + j) % n;
            result[k] = arith.add_mod(result[k], arith.mul_mod(fi, gj));
        }
    }
    Ok(result)
}

impl NttEngine {
    /// 2D circular convolution of two n × n matrices through the frequency domain
    pub fn convolve_2d(&self, a: &Matrix, b: &Matrix) -> Result<Matrix> {
        a.check_same_size(b)?;
        let start = Instant::now();

        let fa = self.forward_2d(a)?;
        let fb = self.forward_2d(b)?;
        let product = fa.hadamard(&fb, self.params().modular_arithmetic(), self.config())?;
        let result = self.inverse_2d(&product)?;

        debug!(
            size = a.size(),
            modulus = self.params().modulus(),
            elapsed = ?start.elapsed(),
            "frequency convolution completed"
        );
        Ok(result)
    }

    /// Cyclic polynomial product f · g mod (x^n - 1, p) via NTT, pointwise product, INTT
    pub fn multiply_cyclic(&self, f: &[u64], g: &[u64]) -> Result<Vec<u64>> {
        let arith = self.params().modular_arithmetic();
        let f_hat = self.forward(f)?;
        let g_hat = self.forward(g)?;
        let product: Vec<u64> = f_hat
            .iter()
            .zip(g_hat.iter())
            .map(|(&x, &y)| arith.mul_mod(x, y))
            .collect();
        self.inverse(&product)
    }
}
