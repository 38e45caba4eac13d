use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rt_tensor::{IdCounter, Tensor, TensorId};

use crate::error::{DispatchError, Result};

/// A tensor handle shared between the registry and in-flight operations.
pub type SharedTensor = Arc<Mutex<Tensor>>;

/// Lock a shared tensor, absorbing poisoning from a panicked peer.
pub(crate) fn lock_tensor(shared: &SharedTensor) -> MutexGuard<'_, Tensor> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Index from tensor IDs to live tensor instances.
///
/// The registry is a lookup index plus the process's ID counter; it never
/// touches a tensor's shape or strides. Serializing concurrent access to a
/// single tensor ID is the surrounding controller's job, not this index's.
#[derive(Debug, Default)]
pub struct TensorRegistry {
    counter: IdCounter,
    tensors: HashMap<TensorId, SharedTensor>,
}

impl TensorRegistry {
    pub fn new() -> Self {
        TensorRegistry {
            counter: IdCounter::new(),
            tensors: HashMap::new(),
        }
    }

    /// The ID counter tensors constructed for this registry should mint from.
    pub fn counter(&self) -> &IdCounter {
        &self.counter
    }

    /// Index a tensor under its own ID and return that ID.
    pub fn register(&mut self, tensor: Tensor) -> TensorId {
        let id = tensor.id();
        tracing::trace!(%id, "registering tensor");
        self.tensors.insert(id, Arc::new(Mutex::new(tensor)));
        id
    }

    /// Look up a tensor handle by ID.
    ///
    /// # Errors
    /// Returns `UnknownTensorId` when no tensor is indexed under `id`.
    pub fn resolve(&self, id: TensorId) -> Result<SharedTensor> {
        self.tensors
            .get(&id)
            .cloned()
            .ok_or(DispatchError::UnknownTensorId(id))
    }

    /// Drop the index entry for `id`, returning the handle if present.
    pub fn remove(&mut self, id: TensorId) -> Option<SharedTensor> {
        self.tensors.remove(&id)
    }

    /// Administrative override: re-home a tensor under a new ID.
    ///
    /// Re-keys the index and rewrites the tensor's own ID in one step. This
    /// is the only ID write path; it exists for controllers that synchronize
    /// handles across peers.
    ///
    /// # Errors
    /// `UnknownTensorId` if `id` is not indexed, `IdInUse` if `new_id`
    /// already is.
    pub fn reassign(&mut self, id: TensorId, new_id: TensorId) -> Result<()> {
        if id == new_id {
            return Ok(());
        }
        if self.tensors.contains_key(&new_id) {
            return Err(DispatchError::IdInUse(new_id));
        }
        let shared = self
            .tensors
            .remove(&id)
            .ok_or(DispatchError::UnknownTensorId(id))?;
        lock_tensor(&shared).reassign_id(new_id);
        self.tensors.insert(new_id, shared);
        tracing::trace!(%id, %new_id, "reassigned tensor id");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }
}
