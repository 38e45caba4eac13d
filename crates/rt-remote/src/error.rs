use rt_tensor::{TensorError, TensorId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("unknown tensor id: {0}")]
    UnknownTensorId(TensorId),
    #[error("unknown operation: {0:?}")]
    UnknownOperation(String),
    #[error("tensor id {0} is already registered")]
    IdInUse(TensorId),
    #[error("{op} expects an operand at position {index}")]
    MissingParam { op: &'static str, index: usize },
    #[error("{op} operand {index} must be a {expected}")]
    ParamType {
        op: &'static str,
        index: usize,
        expected: &'static str,
    },
    #[error("tensor error: {0}")]
    Tensor(#[from] TensorError),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
