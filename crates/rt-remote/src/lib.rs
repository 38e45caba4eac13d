//! `rt-remote` - Tensor registry and remote command dispatch for remote-tensor.
//!
//! This crate provides:
//! - A `TensorRegistry` mapping process-unique tensor IDs to live tensors
//! - A `Command` model mirroring the transport's decoded message
//! - A `Dispatcher` translating named operations into tensor engine calls
//!   and rendering string outcomes for the transport
//!
//! The transport itself (byte framing, sockets) is an external collaborator;
//! this crate starts at the decoded command and ends at the result string.

pub mod command;
pub mod dispatch;
pub mod error;
pub mod registry;

// Re-export primary types at the crate root for convenience.
pub use command::{Command, Operation, Value};
pub use dispatch::{
    BackendPolicy, DispatchConfig, Dispatcher, Reply, UnknownOpPolicy, NOT_FOUND_REPLY,
};
pub use error::{DispatchError, Result};
pub use registry::{SharedTensor, TensorRegistry};
