use std::fmt;

use crate::device::DeviceBuffer;

/// Physical residency of a tensor's authoritative data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backend {
    /// General host memory.
    #[default]
    Host,
    /// Accelerator-resident buffer.
    Device,
}

impl Backend {
    pub fn is_host(&self) -> bool {
        matches!(self, Backend::Host)
    }

    pub fn is_device(&self) -> bool {
        matches!(self, Backend::Device)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Host => write!(f, "host"),
            Backend::Device => write!(f, "device"),
        }
    }
}

/// Device-resident tensor data: the element buffer plus a parallel buffer
/// carrying the shape as i32 dims, which is what device kernels index with.
#[derive(Debug)]
pub struct DeviceStorage {
    pub(crate) data: DeviceBuffer,
    pub(crate) shape: DeviceBuffer,
}

impl DeviceStorage {
    /// The opaque element buffer.
    pub fn data_buffer(&self) -> &DeviceBuffer {
        &self.data
    }

    /// The parallel buffer holding the shape dims.
    pub fn shape_buffer(&self) -> &DeviceBuffer {
        &self.shape
    }
}

/// Backing storage for tensor elements.
///
/// Exactly one variant is live at any time; a backend transfer consumes one
/// variant and produces the other, so a tensor with both a host array and a
/// live device buffer is unrepresentable.
#[derive(Debug)]
pub enum Storage {
    Host(Vec<f32>),
    Device(DeviceStorage),
}

impl Storage {
    pub fn backend(&self) -> Backend {
        match self {
            Storage::Host(_) => Backend::Host,
            Storage::Device(_) => Backend::Device,
        }
    }
}
