use std::fmt;
use std::str::FromStr;

use rt_tensor::TensorId;

use crate::error::DispatchError;

/// One operand in a command: either a tensor handle or a scalar.
///
/// The wire carries these untyped; which one an operation expects is part of
/// that operation's signature, and the dispatcher rejects wrong-typed
/// operands with a structured error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    TensorRef(TensorId),
    Scalar(f32),
}

impl Value {
    pub fn as_tensor_id(&self) -> Option<TensorId> {
        match self {
            Value::TensorRef(id) => Some(*id),
            Value::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Value::Scalar(s) => Some(*s),
            Value::TensorRef(_) => None,
        }
    }
}

/// A decoded remote command.
///
/// Produced by the external transport from raw bytes: the target tensor's ID,
/// the operation name, and the ordered operand values.
#[derive(Debug, Clone)]
pub struct Command {
    pub object_index: TensorId,
    pub function_call: String,
    pub tensor_index_params: Vec<Value>,
}

impl Command {
    pub fn new(
        object_index: TensorId,
        function_call: impl Into<String>,
        tensor_index_params: Vec<Value>,
    ) -> Self {
        Command {
            object_index,
            function_call: function_call.into(),
            tensor_index_params,
        }
    }
}

/// The closed set of remotely invokable operations.
///
/// Incoming names are converted to a tag up front, so the unknown-name
/// failure mode lives in [`Operation::from_str`] and the dispatch itself is a
/// total match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    InitAddMatrixMultiply,
    InlineElementwiseSubtract,
    MultiplyDerivative,
    AddMatrixMultiply,
    Print,
    Gpu,
    Cpu,
    Abs,
    Neg,
    Add,
    AddScalar,
    ScalarMultiply,
    Zero,
}

impl Operation {
    pub const ALL: [Operation; 13] = [
        Operation::InitAddMatrixMultiply,
        Operation::InlineElementwiseSubtract,
        Operation::MultiplyDerivative,
        Operation::AddMatrixMultiply,
        Operation::Print,
        Operation::Gpu,
        Operation::Cpu,
        Operation::Abs,
        Operation::Neg,
        Operation::Add,
        Operation::AddScalar,
        Operation::ScalarMultiply,
        Operation::Zero,
    ];

    /// The wire name of this operation.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::InitAddMatrixMultiply => "init_add_matrix_multiply",
            Operation::InlineElementwiseSubtract => "inline_elementwise_subtract",
            Operation::MultiplyDerivative => "multiply_derivative",
            Operation::AddMatrixMultiply => "add_matrix_multiply",
            Operation::Print => "print",
            Operation::Gpu => "gpu",
            Operation::Cpu => "cpu",
            Operation::Abs => "abs",
            Operation::Neg => "neg",
            Operation::Add => "add",
            Operation::AddScalar => "add_",
            Operation::ScalarMultiply => "scalar_multiply",
            Operation::Zero => "zero_",
        }
    }
}

impl FromStr for Operation {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init_add_matrix_multiply" => Ok(Operation::InitAddMatrixMultiply),
            "inline_elementwise_subtract" => Ok(Operation::InlineElementwiseSubtract),
            "multiply_derivative" => Ok(Operation::MultiplyDerivative),
            "add_matrix_multiply" => Ok(Operation::AddMatrixMultiply),
            "print" => Ok(Operation::Print),
            "gpu" => Ok(Operation::Gpu),
            "cpu" => Ok(Operation::Cpu),
            "abs" => Ok(Operation::Abs),
            "neg" => Ok(Operation::Neg),
            "add" => Ok(Operation::Add),
            "add_" => Ok(Operation::AddScalar),
            "scalar_multiply" => Ok(Operation::ScalarMultiply),
            "zero_" => Ok(Operation::Zero),
            other => Err(DispatchError::UnknownOperation(other.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_parse_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>().unwrap(), op);
        }
    }

    #[test]
    fn test_unknown_name() {
        let err = "transpose".parse::<Operation>().unwrap_err();
        assert!(matches!(err, DispatchError::UnknownOperation(ref s) if s == "transpose"));
    }

    #[test]
    fn test_value_accessors() {
        let v = Value::TensorRef(TensorId::from(3));
        assert_eq!(v.as_tensor_id(), Some(TensorId::from(3)));
        assert_eq!(v.as_scalar(), None);

        let s = Value::Scalar(2.5);
        assert_eq!(s.as_scalar(), Some(2.5));
        assert_eq!(s.as_tensor_id(), None);
    }
}
