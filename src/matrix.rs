//! Square matrices of field elements
//!
//! A [`Matrix`] is the 2D analogue of a coefficient sequence: n rows of n
//! entries each. Every operation returns a fresh matrix; nothing mutates the
//! caller's storage.

use std::ops::Index;

use rayon::prelude::*;

use crate::config::NttConfig;
use crate::error::{NttError, Result};
use crate::modular_arithmetic::{self, ModularArithmetic};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    data: Vec<Vec<u64>>,
    size: usize,
}

impl Matrix {
    /// Builds a matrix from its rows, checking that it is square
    ///
    /// # Errors
    /// `NotSquare` naming the first row whose length differs from the row count.
    pub fn new(rows: Vec<Vec<u64>>) -> Result<Self> {
        let size = rows.len();
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(NttError::NotSquare {
                row,
                expected: size,
                got: r.len(),
            });
        }
        Ok(Self { data: rows, size })
    }

    pub fn zeros(size: usize) -> Self {
        Self {
            data: vec![vec![0u64; size]; size],
            size,
        }
    }

    /// Builds a size × size matrix whose (i, j) entry is `f(i, j)`
    pub fn from_fn<F>(size: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> u64,
    {
        let data = (0..size)
            .map(|i| (0..size).map(|j| f(i, j)).collect())
            .collect();
        Self { data, size }
    }

    /// Reduces a square matrix of raw signed integers into [0, p)
    pub fn from_signed(rows: &[Vec<i64>], modulus: u64) -> Result<Self> {
        let arith = ModularArithmetic::new(modulus)?;
        let reduced = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&x| modular_arithmetic::reduce_signed(x, arith.modulus()))
                    .collect()
            })
            .collect();
        Self::new(reduced)
    }

    /// Number of rows, which equals the number of columns
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn rows(&self) -> &[Vec<u64>] {
        &self.data
    }

    pub fn row(&self, i: usize) -> &[u64] {
        &self.data[i]
    }

    /// Returns the entry at (row, col), or `None` if out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<u64> {
        self.data.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn into_rows(self) -> Vec<Vec<u64>> {
        self.data
    }

    /// Swaps rows and columns
    pub fn transpose(&self) -> Self {
        Self::from_fn(self.size, |i, j| self.data[j][i])
    }

    /// Reduces every entry into [0, p)
    pub fn reduce(&self, modulus: u64) -> Result<Self> {
        let arith = ModularArithmetic::new(modulus)?;
        Ok(Self::from_fn(self.size, |i, j| arith.reduce(self.data[i][j])))
    }

    /// Pointwise (Hadamard) product modulo p
    ///
    /// # Errors
    /// `InvalidDimension` if the two matrices differ in size.
    pub fn hadamard(&self, other: &Self, arith: &ModularArithmetic, config: &NttConfig) -> Result<Self> {
        self.check_same_size(other)?;

        let multiply_rows = |(a, b): (&Vec<u64>, &Vec<u64>)| -> Vec<u64> {
            a.iter().zip(b.iter()).map(|(&x, &y)| arith.mul_mod(x, y)).collect()
        };

        let data = if config.use_parallel(self.size) {
            self.data.par_iter().zip(other.data.par_iter()).map(multiply_rows).collect()
        } else {
            self.data.iter().zip(other.data.iter()).map(multiply_rows).collect()
        };

        Ok(Self { data, size: self.size })
    }

    /// Applies a fallible row transform to every row, in parallel when configured
    pub(crate) fn map_rows<F>(&self, config: &NttConfig, f: F) -> Result<Self>
    where
        F: Fn(&[u64]) -> Result<Vec<u64>> + Sync,
    {
        let data = if config.use_parallel(self.size) {
            self.data.par_iter().map(|row| f(row.as_slice())).collect::<Result<Vec<_>>>()?
        } else {
            self.data.iter().map(|row| f(row.as_slice())).collect::<Result<Vec<_>>>()?
        };
        Self::new(data)
    }

    pub(crate) fn check_same_size(&self, other: &Self) -> Result<()> {
        if self.size != other.size {
            return Err(NttError::InvalidDimension {
                expected: self.size,
                got: other.size,
            });
        }
        Ok(())
    }

    pub(crate) fn check_power_of_two(&self) -> Result<()> {
        if !self.size.is_power_of_two() {
            return Err(NttError::NotPowerOfTwo(self.size));
        }
        Ok(())
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = u64;

    fn index(&self, (row, col): (usize, usize)) -> &u64 {
        &self.data[row][col]
    }
}

impl TryFrom<Vec<Vec<u64>>> for Matrix {
    type Error = NttError;

    fn try_from(rows: Vec<Vec<u64>>) -> Result<Self> {
        Self::new(rows)
    }
}

impl<const N: usize> From<[[u64; N]; N]> for Matrix {
    fn from(rows: [[u64; N]; N]) -> Self {
        Self {
            data: rows.iter().map(|r| r.to_vec()).collect(),
            size: N,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix {
        Matrix::from([[1, 2, 3, 4], [5, 6, 7, 8], [9, 10, 11, 12], [13, 14, 15, 16]])
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let err = Matrix::new(vec![vec![1, 2], vec![3]]).unwrap_err();
        assert_eq!(err, NttError::NotSquare { row: 1, expected: 2, got: 1 });

        let err = Matrix::new(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap_err();
        assert_eq!(err, NttError::NotSquare { row: 0, expected: 2, got: 3 });
    }

    #[test]
    fn test_accessors() {
        let m = sample();
        assert_eq!(m.size(), 4);
        assert_eq!(m.row(2), &[9, 10, 11, 12]);
        assert_eq!(m[(3, 1)], 14);
        assert_eq!(m.get(0, 3), Some(4));
        assert_eq!(m.get(4, 0), None);
        assert_eq!(m.rows().len(), 4);
    }

    #[test]
    fn test_transpose() {
        let m = sample();
        let t = m.transpose();
        assert_eq!(t.row(0), &[1, 5, 9, 13]);
        assert_eq!(t.transpose(), m);
        // Source is untouched
        assert_eq!(m.row(0), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_from_signed_and_reduce() {
        let m = Matrix::from_signed(&[vec![-1, 18], vec![0, -34]], 17).unwrap();
        assert_eq!(m.into_rows(), vec![vec![16, 1], vec![0, 0]]);

        let r = Matrix::from([[17, 35], [2, 100]]).reduce(17).unwrap();
        assert_eq!(r, Matrix::from([[0, 1], [2, 15]]));

        assert!(Matrix::from_signed(&[vec![1]], 1).is_err());
    }

    #[test]
    fn test_hadamard() {
        let arith = ModularArithmetic::new(17).unwrap();
        let a = Matrix::from([[1, 2], [3, 4]]);
        let b = Matrix::from([[5, 6], [7, 8]]);

        let sequential = a.hadamard(&b, &arith, &NttConfig::sequential()).unwrap();
        assert_eq!(sequential, Matrix::from([[5, 12], [4, 15]]));

        let parallel = NttConfig::default().with_parallel_threshold(1);
        assert_eq!(a.hadamard(&b, &arith, &parallel).unwrap(), sequential);

        let c = Matrix::zeros(4);
        assert_eq!(
            a.hadamard(&c, &arith, &NttConfig::default()).unwrap_err(),
            NttError::InvalidDimension { expected: 2, got: 4 }
        );
    }

    #[test]
    fn test_power_of_two_check() {
        assert!(sample().check_power_of_two().is_ok());
        assert_eq!(
            Matrix::zeros(3).check_power_of_two(),
            Err(NttError::NotPowerOfTwo(3))
        );
        assert_eq!(
            Matrix::zeros(0).check_power_of_two(),
            Err(NttError::NotPowerOfTwo(0))
        );
    }
}
