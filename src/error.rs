use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NttError {
    #[error("Invalid dimension: expected {expected}, got {got}")]
    InvalidDimension {
        expected: usize,
        got: usize,
    },

    #[error("Transform length {0} is not a power of two")]
    NotPowerOfTwo(usize),

    #[error("Invalid modulus: {modulus}")]
    InvalidModulus { modulus: u64 },

    #[error("Modulus {modulus} is not prime")]
    ModulusNotPrime { modulus: u64 },

    #[error("{root} is not a primitive {order}-th root of unity modulo {modulus}")]
    NotPrimitiveRoot {
        root: u64,
        order: usize,
        modulus: u64,
    },

    #[error("{root_inverse} is not the inverse of {root} modulo {modulus}")]
    RootInverseMismatch {
        root: u64,
        root_inverse: u64,
        modulus: u64,
    },

    #[error("{value} has no inverse modulo {modulus}")]
    NoInverse { value: u64, modulus: u64 },

    #[error("Matrix is not square: row {row} has {got} entries, expected {expected}")]
    NotSquare {
        row: usize,
        expected: usize,
        got: usize,
    },
}

pub type Result<T> = std::result::Result<T, NttError>;
