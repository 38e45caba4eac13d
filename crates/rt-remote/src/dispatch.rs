use rt_tensor::{CpuKernels, DeviceContext, Kernels, Tensor, TensorId};

use crate::command::{Command, Operation};
use crate::error::{DispatchError, Result};
use crate::registry::{lock_tensor, SharedTensor, TensorRegistry};

/// How the dispatcher treats operations whose participants are
/// device-resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPolicy {
    /// Reject with `WrongBackend`; callers transfer explicitly.
    #[default]
    Strict,
    /// Move the target tensor to host before the call and read operands
    /// through a staging download, leaving operand residency untouched.
    AutoTransfer,
}

/// How the dispatcher reports an operation name outside the known set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownOpPolicy {
    /// Surface a typed `UnknownOperation` error.
    #[default]
    Error,
    /// Answer the fixed not-found sentinel, mutating nothing.
    Sentinel,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchConfig {
    pub backend_policy: BackendPolicy,
    pub unknown_op: UnknownOpPolicy,
}

/// Sentinel answered for unknown operation names under
/// [`UnknownOpPolicy::Sentinel`].
pub const NOT_FOUND_REPLY: &str = "dispatch: command not found";

/// Outcome of a successfully dispatched command.
///
/// The result shape is operation-dependent: in-place and transfer operations
/// acknowledge, `print` carries its rendering, and allocating operations
/// carry the new tensor's ID.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Fixed `"<operation>: OK"` acknowledgement.
    Ack(Operation),
    /// Serialized print output.
    Printed(String),
    /// ID of a tensor allocated and registered by the operation.
    Registered(TensorId),
    /// Unknown operation under the sentinel policy.
    NotFound,
}

impl Reply {
    /// Render the outcome for the transport.
    pub fn render(&self) -> String {
        match self {
            Reply::Ack(op) => format!("{}: OK", op.name()),
            Reply::Printed(text) => text.clone(),
            Reply::Registered(id) => id.to_string(),
            Reply::NotFound => NOT_FOUND_REPLY.to_string(),
        }
    }
}

/// Decodes operation-name + operand-ID commands into tensor engine calls.
///
/// Operand tensors are read as a snapshot at dispatch time (one lock held at
/// a time), so an operand that aliases the target never deadlocks and sees
/// the values from before the mutation. Serializing concurrent commands
/// against the same tensor ID remains the surrounding controller's job.
#[derive(Debug)]
pub struct Dispatcher {
    registry: TensorRegistry,
    kernels: Box<dyn Kernels>,
    device: DeviceContext,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_config(DispatchConfig::default())
    }

    pub fn with_config(config: DispatchConfig) -> Self {
        Dispatcher {
            registry: TensorRegistry::new(),
            kernels: Box::new(CpuKernels::new()),
            device: DeviceContext::new(),
            config,
        }
    }

    pub fn registry(&self) -> &TensorRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TensorRegistry {
        &mut self.registry
    }

    pub fn device(&self) -> &DeviceContext {
        &self.device
    }

    pub fn kernels(&self) -> &dyn Kernels {
        self.kernels.as_ref()
    }

    /// Execute a decoded command against the registry.
    ///
    /// Exactly one engine call per command. Unknown target IDs and all
    /// engine failures propagate as typed errors; unknown operation names
    /// follow the configured [`UnknownOpPolicy`].
    pub fn execute(&mut self, cmd: &Command) -> Result<Reply> {
        let op = match cmd.function_call.parse::<Operation>() {
            Ok(op) => op,
            Err(err) => {
                tracing::warn!(function_call = %cmd.function_call, "unknown operation");
                return match self.config.unknown_op {
                    UnknownOpPolicy::Error => Err(err),
                    UnknownOpPolicy::Sentinel => Ok(Reply::NotFound),
                };
            }
        };

        let target = self.registry.resolve(cmd.object_index)?;
        tracing::debug!(object = %cmd.object_index, op = op.name(), "dispatching command");

        match op {
            Operation::InitAddMatrixMultiply => {
                let id = self.tensor_param(cmd, op, 0)?;
                self.in_place_binary(&target, id, Tensor::elementwise_mul_)?;
                Ok(Reply::Ack(op))
            }
            Operation::InlineElementwiseSubtract => {
                let id = self.tensor_param(cmd, op, 0)?;
                self.in_place_binary(&target, id, Tensor::elementwise_sub_)?;
                Ok(Reply::Ack(op))
            }
            Operation::MultiplyDerivative => {
                let id = self.tensor_param(cmd, op, 0)?;
                self.in_place_binary(&target, id, Tensor::multiply_derivative_)?;
                Ok(Reply::Ack(op))
            }
            Operation::AddMatrixMultiply => {
                let a = self.snapshot_operand(self.tensor_param(cmd, op, 0)?)?;
                let b = self.snapshot_operand(self.tensor_param(cmd, op, 1)?)?;
                let mut guard = lock_tensor(&target);
                self.ensure_host(&mut guard)?;
                guard.add_matrix_multiply_(&a, &b, self.kernels.as_ref())?;
                Ok(Reply::Ack(op))
            }
            Operation::Print => {
                let guard = lock_tensor(&target);
                Ok(Reply::Printed(guard.format(&self.device)?))
            }
            Operation::Gpu => {
                lock_tensor(&target).to_device(&self.device)?;
                Ok(Reply::Ack(op))
            }
            Operation::Cpu => {
                lock_tensor(&target).to_host(&self.device)?;
                Ok(Reply::Ack(op))
            }
            Operation::Abs => {
                self.in_place_unary(&target, Tensor::abs_)?;
                Ok(Reply::Ack(op))
            }
            Operation::Neg => {
                self.in_place_unary(&target, Tensor::neg_)?;
                Ok(Reply::Ack(op))
            }
            Operation::Zero => {
                self.in_place_unary(&target, Tensor::zero_)?;
                Ok(Reply::Ack(op))
            }
            Operation::Add => {
                let operand = self.snapshot_operand(self.tensor_param(cmd, op, 0)?)?;
                let out = {
                    let mut guard = lock_tensor(&target);
                    self.ensure_host(&mut guard)?;
                    guard.add(&operand, self.kernels.as_ref(), self.registry.counter())?
                };
                Ok(Reply::Registered(self.registry.register(out)))
            }
            Operation::AddScalar => {
                let s = self.scalar_param(cmd, op, 0)?;
                self.in_place_scalar(&target, s, Tensor::add_scalar_)?;
                Ok(Reply::Ack(op))
            }
            Operation::ScalarMultiply => {
                let s = self.scalar_param(cmd, op, 0)?;
                self.in_place_scalar(&target, s, Tensor::scalar_mul_)?;
                Ok(Reply::Ack(op))
            }
        }
    }

    /// Execute and render the outcome for the transport.
    pub fn execute_to_string(&mut self, cmd: &Command) -> Result<String> {
        self.execute(cmd).map(|reply| reply.render())
    }

    /// Detached host copy of an operand tensor, taken under its own lock.
    ///
    /// Under `Strict` a device-resident operand is rejected; under
    /// `AutoTransfer` it is read through a staging download without moving.
    fn snapshot_operand(&self, id: TensorId) -> Result<Tensor> {
        let shared = self.registry.resolve(id)?;
        let guard = lock_tensor(&shared);
        let data = match self.config.backend_policy {
            BackendPolicy::Strict => guard.data()?.to_vec(),
            BackendPolicy::AutoTransfer => guard.snapshot_data(&self.device),
        };
        let shape = guard.shape().clone();
        drop(guard);
        Ok(Tensor::from_data(data, shape, self.registry.counter())?)
    }

    fn ensure_host(&self, tensor: &mut Tensor) -> Result<()> {
        if self.config.backend_policy == BackendPolicy::AutoTransfer {
            tensor.to_host(&self.device)?;
        }
        Ok(())
    }

    fn in_place_binary(
        &self,
        target: &SharedTensor,
        operand_id: TensorId,
        f: fn(&mut Tensor, &Tensor, &dyn Kernels) -> rt_tensor::Result<()>,
    ) -> Result<()> {
        let operand = self.snapshot_operand(operand_id)?;
        let mut guard = lock_tensor(target);
        self.ensure_host(&mut guard)?;
        f(&mut guard, &operand, self.kernels.as_ref())?;
        Ok(())
    }

    fn in_place_unary(
        &self,
        target: &SharedTensor,
        f: fn(&mut Tensor, &dyn Kernels) -> rt_tensor::Result<()>,
    ) -> Result<()> {
        let mut guard = lock_tensor(target);
        self.ensure_host(&mut guard)?;
        f(&mut guard, self.kernels.as_ref())?;
        Ok(())
    }

    fn in_place_scalar(
        &self,
        target: &SharedTensor,
        s: f32,
        f: fn(&mut Tensor, f32, &dyn Kernels) -> rt_tensor::Result<()>,
    ) -> Result<()> {
        let mut guard = lock_tensor(target);
        self.ensure_host(&mut guard)?;
        f(&mut guard, s, self.kernels.as_ref())?;
        Ok(())
    }

    fn tensor_param(&self, cmd: &Command, op: Operation, index: usize) -> Result<TensorId> {
        let value = cmd
            .tensor_index_params
            .get(index)
            .ok_or(DispatchError::MissingParam {
                op: op.name(),
                index,
            })?;
        value.as_tensor_id().ok_or(DispatchError::ParamType {
            op: op.name(),
            index,
            expected: "tensor id",
        })
    }

    fn scalar_param(&self, cmd: &Command, op: Operation, index: usize) -> Result<f32> {
        let value = cmd
            .tensor_index_params
            .get(index)
            .ok_or(DispatchError::MissingParam {
                op: op.name(),
                index,
            })?;
        value.as_scalar().ok_or(DispatchError::ParamType {
            op: op.name(),
            index,
            expected: "scalar",
        })
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
