use crate::storage::Backend;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TensorError {
    #[error("tensor shape must have rank >= 1")]
    InvalidShape,
    #[error("shape {shape:?} (numel={expected}) does not match data length {got}")]
    ShapeDataMismatch {
        shape: Vec<usize>,
        expected: usize,
        got: usize,
    },
    #[error("rank mismatch: expected {expected}, got {got}")]
    RankMismatch { expected: usize, got: usize },
    #[error("index {index} out of range for dimension {axis} of size {dim}")]
    IndexOutOfRange {
        axis: usize,
        index: usize,
        dim: usize,
    },
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },
    #[error("matmul dimension mismatch: [{m}x{k}] @ [{k2}x{n}]")]
    MatmulMismatch {
        m: usize,
        k: usize,
        k2: usize,
        n: usize,
    },
    #[error("operation requires {expected} data but tensor is {got}-resident")]
    WrongBackend { expected: Backend, got: Backend },
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TensorError>;
