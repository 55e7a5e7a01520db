//! Number Theoretic Transform over prime fields in one and two dimensions,
//! with 2D circular convolution computed both directly and through the
//! frequency domain.

pub mod config;
pub mod convolution;
pub mod error;
pub mod matrix;
pub mod modular_arithmetic;
pub mod ntt;
pub mod ntt2d;

pub use config::{NttConfig, TransformStrategy};
pub use convolution::{
    convolve_frequency, convolve_spatial, convolve_spatial_with, multiply_cyclic_schoolbook,
};
pub use error::{NttError, Result};
pub use matrix::Matrix;
pub use modular_arithmetic::{FieldElement, ModularArithmetic};
pub use ntt::{intt_1d, ntt_1d, NttEngine, NttParams};
pub use ntt2d::{intt_2d, intt_2d_with, ntt_2d, ntt_2d_with};
