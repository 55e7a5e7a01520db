//! One-dimensional Number Theoretic Transform
//!
//! Forward transform: â[j] = Σ_{i=0}^{n-1} a[i] · ω^{ij} mod p
//! Inverse transform: a[i] = n^{-1} · Σ_{j=0}^{n-1} â[j] · ω^{-ij} mod p
//!
//! Two evaluation strategies are provided and produce identical output for
//! every input, including roots that are not primitive:
//! - Recursive radix-2: split into even/odd indices, transform each half with
//!   ω², combine with twiddles ω^0..ω^{n/2-1}.
//! - Iterative: bit-reversal permutation, then log₂(n) butterfly stages where
//!   the stage of block length m uses ω^{n/m}. This is the recursion unrolled
//!   bottom-up over a single buffer.
//!
//! [`ntt_1d`] and [`intt_1d`] check structure only (power-of-two length,
//! usable modulus). [`NttParams`] additionally checks primality and root
//! order once, and [`NttEngine`] runs transforms against those parameters.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::config::{NttConfig, TransformStrategy};
use crate::error::{NttError, Result};
use crate::modular_arithmetic::{self, ModularArithmetic};

/// Recursive radix-2 forward transform
///
/// The length of `values` must be a power of two. For n = 1 the input is
/// returned unchanged regardless of the root.
fn ntt_recursive(values: &[u64], arith: &ModularArithmetic, root: u64) -> Vec<u64> {
    let n = values.len();
    if n == 1 {
        return values.to_vec();
    }

    let half = n / 2;
    let root_squared = arith.mul_mod(root, root);

    let even_input: Vec<u64> = values.iter().step_by(2).copied().collect();
    let odd_input: Vec<u64> = values.iter().skip(1).step_by(2).copied().collect();
    let even = ntt_recursive(&even_input, arith, root_squared);
    let odd = ntt_recursive(&odd_input, arith, root_squared);

    // Twiddle t walks ω^0, ω^1, ..., ω^{n/2-1}
    let mut result = vec![0u64; n];
    let mut t = 1u64;
    for i in 0..half {
        let t_odd = arith.mul_mod(t, odd[i]);
        result[i] = arith.add_mod(even[i], t_odd);
        result[i + half] = arith.sub_mod(even[i], t_odd);
        t = arith.mul_mod(t, root);
    }

    result
}

/// Reverses the low `bits` bits of x
#[inline]
fn bit_reverse(x: usize, bits: u32) -> usize {
    if bits == 0 {
        0
    } else {
        x.reverse_bits() >> (usize::BITS - bits)
    }
}

fn bit_reversal_table(n: usize) -> Vec<usize> {
    let bits = n.trailing_zeros();
    (0..n).map(|i| bit_reverse(i, bits)).collect()
}

/// Computes the root used by each iterative stage: ω^{n/m} for m = 2, 4, ..., n
fn stage_roots(n: usize, arith: &ModularArithmetic, root: u64) -> Vec<u64> {
    let log_n = n.trailing_zeros();
    (1..=log_n)
        .map(|stage| arith.pow_mod(root, (n >> stage) as u64))
        .collect()
}

/// In-place iterative butterfly network over an owned buffer
///
/// `table` is the bit-reversal permutation for `values.len()` and `roots`
/// holds the per-stage roots from [`stage_roots`].
fn ntt_iterative_in_place(values: &mut [u64], arith: &ModularArithmetic, roots: &[u64], table: &[usize]) {
    let n = values.len();
    if n == 1 {
        return;
    }

    for (i, &j) in table.iter().enumerate() {
        if i < j {
            values.swap(i, j);
        }
    }

    let mut len = 2;
    for &stage_root in roots {
        let half = len / 2;
        for start in (0..n).step_by(len) {
            let mut t = 1u64;
            for i in start..start + half {
                let t_odd = arith.mul_mod(t, values[i + half]);
                let even = values[i];
                values[i] = arith.add_mod(even, t_odd);
                values[i + half] = arith.sub_mod(even, t_odd);
                t = arith.mul_mod(t, stage_root);
            }
        }
        len <<= 1;
    }
}

/// Runs the forward butterfly network with the chosen strategy, without checks
pub(crate) fn forward_unchecked(
    values: &[u64],
    arith: &ModularArithmetic,
    root: u64,
    strategy: TransformStrategy,
) -> Vec<u64> {
    match strategy {
        TransformStrategy::Recursive => ntt_recursive(values, arith, root),
        TransformStrategy::Iterative => {
            let n = values.len();
            let mut buffer = values.to_vec();
            ntt_iterative_in_place(
                &mut buffer,
                arith,
                &stage_roots(n, arith, root),
                &bit_reversal_table(n),
            );
            buffer
        }
    }
}

/// Runs the forward network with the inverse root, then scales once by n^{-1}
pub(crate) fn inverse_unchecked(
    values: &[u64],
    arith: &ModularArithmetic,
    root_inverse: u64,
    strategy: TransformStrategy,
) -> Result<Vec<u64>> {
    let n_inv = arith.inv_len(values.len())?;
    let mut result = forward_unchecked(values, arith, root_inverse, strategy);
    for x in result.iter_mut() {
        *x = arith.mul_mod(*x, n_inv);
    }
    Ok(result)
}

pub(crate) fn check_length(len: usize) -> Result<()> {
    if !len.is_power_of_two() {
        return Err(NttError::NotPowerOfTwo(len));
    }
    Ok(())
}

/// Forward NTT of a power-of-two length sequence
///
/// # Arguments
/// * `sequence` - Coefficients a[0..n), n = 2^k
/// * `modulus` - Prime modulus p
/// * `root` - Primitive n-th root of unity ω modulo p
///
/// # Errors
/// * `NotPowerOfTwo` if the length is zero or not a power of two
/// * `InvalidModulus` if p < 2
///
/// Primality of p and the order of ω are not checked; with a wrong root the
/// butterfly recursion still runs and returns its (non-DFT) output.
pub fn ntt_1d(sequence: &[u64], modulus: u64, root: u64) -> Result<Vec<u64>> {
    check_length(sequence.len())?;
    let arith = ModularArithmetic::new(modulus)?;
    Ok(forward_unchecked(sequence, &arith, root, TransformStrategy::Recursive))
}

/// Inverse NTT: the forward recursion with ω^{-1}, scaled by n^{-1} mod p
///
/// # Errors
/// * `NotPowerOfTwo` if the length is zero or not a power of two
/// * `InvalidModulus` if p < 2
/// * `NoInverse` if p divides n
pub fn intt_1d(sequence: &[u64], modulus: u64, root_inverse: u64) -> Result<Vec<u64>> {
    check_length(sequence.len())?;
    let arith = ModularArithmetic::new(modulus)?;
    inverse_unchecked(sequence, &arith, root_inverse, TransformStrategy::Recursive)
}

/// Validated NTT parameters for one transform length
///
/// Construction checks that the modulus is prime, that the root is a primitive
/// n-th root of unity and that the inverse root really is its inverse. Stage
/// roots for both directions and the bit-reversal table are precomputed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NttParams {
    /// Transform length n (power of two)
    dimension: usize,

    /// Prime modulus p with n | p - 1
    modulus: u64,

    /// Primitive n-th root of unity ω
    root: u64,

    /// ω^{-1} mod p
    root_inverse: u64,

    /// n^{-1} mod p, applied once after the inverse butterfly network
    dimension_inverse: u64,

    /// ω^{n/m} for each iterative stage m = 2, 4, ..., n
    forward_stage_roots: Vec<u64>,

    /// ω^{-n/m} for each iterative stage
    inverse_stage_roots: Vec<u64>,

    bit_reversal_table: Vec<usize>,

    arith: ModularArithmetic,
}

impl NttParams {
    /// Creates parameters, deriving ω^{-1} by Fermat inversion
    ///
    /// # Errors
    /// * `NotPowerOfTwo` if the dimension is not a power of two
    /// * `InvalidModulus` / `ModulusNotPrime` for an unusable modulus
    /// * `NotPrimitiveRoot` if ω does not have order exactly n
    pub fn new(dimension: usize, modulus: u64, root: u64) -> Result<Self> {
        check_length(dimension)?;
        let arith = ModularArithmetic::new(modulus)?;
        if !modular_arithmetic::is_prime(modulus) {
            return Err(NttError::ModulusNotPrime { modulus });
        }

        let root = arith.reduce(root);
        if !modular_arithmetic::is_primitive_root(root, dimension, modulus) {
            return Err(NttError::NotPrimitiveRoot {
                root,
                order: dimension,
                modulus,
            });
        }

        let root_inverse = arith.inv_mod(root)?;
        let dimension_inverse = arith.inv_len(dimension)?;

        let params = Self {
            dimension,
            modulus,
            root,
            root_inverse,
            dimension_inverse,
            forward_stage_roots: stage_roots(dimension, &arith, root),
            inverse_stage_roots: stage_roots(dimension, &arith, root_inverse),
            bit_reversal_table: bit_reversal_table(dimension),
            arith,
        };

        debug!(
            dimension,
            modulus,
            root,
            root_inverse,
            "NTT parameters validated"
        );

        Ok(params)
    }

    /// Creates parameters and checks a caller-supplied inverse root
    ///
    /// # Errors
    /// Everything [`NttParams::new`] reports, plus `RootInverseMismatch` if
    /// ω · root_inverse ≢ 1 (mod p).
    pub fn with_inverse(dimension: usize, modulus: u64, root: u64, root_inverse: u64) -> Result<Self> {
        let params = Self::new(dimension, modulus, root)?;
        if params.arith.mul_mod(params.root, root_inverse) != 1 {
            return Err(NttError::RootInverseMismatch {
                root: params.root,
                root_inverse,
                modulus,
            });
        }
        Ok(params)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    pub fn root(&self) -> u64 {
        self.root
    }

    pub fn root_inverse(&self) -> u64 {
        self.root_inverse
    }

    pub fn dimension_inverse(&self) -> u64 {
        self.dimension_inverse
    }

    pub fn forward_stage_roots(&self) -> &[u64] {
        &self.forward_stage_roots
    }

    pub fn inverse_stage_roots(&self) -> &[u64] {
        &self.inverse_stage_roots
    }

    pub fn bit_reversal_table(&self) -> &[usize] {
        &self.bit_reversal_table
    }

    pub fn modular_arithmetic(&self) -> &ModularArithmetic {
        &self.arith
    }
}

/// Transform engine bound to validated parameters and a configuration
///
/// All methods take `&self` and return freshly allocated output, so one
/// engine can be shared across threads.
#[derive(Clone, Debug)]
pub struct NttEngine {
    params: Arc<NttParams>,
    config: NttConfig,
}

impl NttEngine {
    pub fn new(params: Arc<NttParams>, config: NttConfig) -> Self {
        debug!(
            dimension = params.dimension(),
            modulus = params.modulus(),
            strategy = ?config.strategy,
            parallel = config.parallel,
            "NTT engine created"
        );
        Self { params, config }
    }

    /// Shorthand for validating parameters and wrapping them in an engine
    pub fn from_root(dimension: usize, modulus: u64, root: u64, config: NttConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(NttParams::new(dimension, modulus, root)?), config))
    }

    pub fn params(&self) -> &Arc<NttParams> {
        &self.params
    }

    pub fn config(&self) -> &NttConfig {
        &self.config
    }

    fn check_dimension(&self, len: usize) -> Result<()> {
        if len != self.params.dimension {
            return Err(NttError::InvalidDimension {
                expected: self.params.dimension,
                got: len,
            });
        }
        Ok(())
    }

    fn butterflies(&self, values: &[u64], root: u64, stage_roots: &[u64]) -> Vec<u64> {
        let arith = &self.params.arith;
        match self.config.strategy {
            TransformStrategy::Recursive => ntt_recursive(values, arith, root),
            TransformStrategy::Iterative => {
                let mut buffer = values.to_vec();
                ntt_iterative_in_place(&mut buffer, arith, stage_roots, &self.params.bit_reversal_table);
                buffer
            }
        }
    }

    /// Forward NTT of one sequence of length n
    ///
    /// # Errors
    /// `InvalidDimension` if the length differs from the parameter dimension.
    pub fn forward(&self, coefficients: &[u64]) -> Result<Vec<u64>> {
        self.check_dimension(coefficients.len())?;
        Ok(self.butterflies(coefficients, self.params.root, &self.params.forward_stage_roots))
    }

    /// Inverse NTT of one sequence of length n
    pub fn inverse(&self, evaluations: &[u64]) -> Result<Vec<u64>> {
        self.check_dimension(evaluations.len())?;
        let arith = &self.params.arith;
        let mut result = self.butterflies(
            evaluations,
            self.params.root_inverse,
            &self.params.inverse_stage_roots,
        );
        for x in result.iter_mut() {
            *x = arith.mul_mod(*x, self.params.dimension_inverse);
        }
        Ok(result)
    }

    /// Forward NTT of every sequence in the batch
    ///
    /// All sequences are checked before any is transformed.
    pub fn batch_forward(&self, batch: &[Vec<u64>]) -> Result<Vec<Vec<u64>>> {
        self.run_batch(batch, |row| self.forward(row))
    }

    /// Inverse NTT of every sequence in the batch
    pub fn batch_inverse(&self, batch: &[Vec<u64>]) -> Result<Vec<Vec<u64>>> {
        self.run_batch(batch, |row| self.inverse(row))
    }

    fn run_batch<F>(&self, batch: &[Vec<u64>], f: F) -> Result<Vec<Vec<u64>>>
    where
        F: Fn(&[u64]) -> Result<Vec<u64>> + Sync,
    {
        for row in batch {
            self.check_dimension(row.len())?;
        }
        if self.config.use_parallel(batch.len()) {
            batch.par_iter().map(|row| f(row.as_slice())).collect()
        } else {
            batch.iter().map(|row| f(row.as_slice())).collect()
        }
    }
}
