use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique handle for a tensor.
///
/// IDs are minted by an [`IdCounter`], strictly increasing, and never reused,
/// even after the tensor they named has been dropped. They are what crosses
/// the command protocol in place of raw references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TensorId(u64);

impl TensorId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TensorId {
    fn from(raw: u64) -> Self {
        TensorId(raw)
    }
}

impl fmt::Display for TensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic ID source for tensor construction.
///
/// An explicit counter instance rather than a process global, so tests and
/// embedders can run isolated counters. The atomic increment is the only
/// synchronization this crate performs; minting from multiple threads yields
/// unique, strictly increasing IDs with no lost updates.
#[derive(Debug, Default)]
pub struct IdCounter {
    next: AtomicU64,
}

impl IdCounter {
    pub fn new() -> Self {
        IdCounter {
            next: AtomicU64::new(0),
        }
    }

    /// Mint the next ID. The first minted ID is 1.
    pub fn mint(&self) -> TensorId {
        TensorId(self.next.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Number of IDs minted so far.
    pub fn created(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}
