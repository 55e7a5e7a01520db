//! Runtime configuration for transforms and convolutions
//!
//! None of these settings change numeric results: both strategies produce the
//! same sequence for every input, and parallel execution only splits
//! independent rows across the rayon pool.

/// How the one-dimensional butterfly network is evaluated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransformStrategy {
    /// Even/odd divide-and-conquer, allocating fresh sub-sequences per level
    #[default]
    Recursive,
    /// Bit-reversal permutation followed by log₂(n) in-place butterfly stages
    /// over a single owned buffer
    Iterative,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NttConfig {
    /// Butterfly evaluation strategy for every 1D transform
    pub strategy: TransformStrategy,

    /// Whether row batches may be spread across the rayon thread pool
    pub parallel: bool,

    /// Minimum number of rows before parallel execution kicks in
    /// Small matrices are faster sequentially than the pool dispatch overhead
    pub parallel_threshold: usize,
}

impl Default for NttConfig {
    fn default() -> Self {
        Self {
            strategy: TransformStrategy::Recursive,
            parallel: true,
            parallel_threshold: 64,
        }
    }
}

impl NttConfig {
    /// Single-threaded configuration with the default strategy
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    pub fn with_strategy(mut self, strategy: TransformStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Returns true if a batch of `rows` independent rows should run on rayon
    #[inline]
    pub fn use_parallel(&self, rows: usize) -> bool {
        self.parallel && rows >= self.parallel_threshold
    }
}
