use std::sync::atomic::{AtomicU64, Ordering};

/// An opaque device-resident buffer.
///
/// The bytes are untyped device memory; the only way in or out is an explicit
/// upload/download call on a [`DeviceContext`]. Nothing outside this module
/// can view a device buffer as host floats.
#[derive(Debug)]
pub struct DeviceBuffer {
    bytes: Vec<u8>,
}

impl DeviceBuffer {
    /// Length of the buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

/// Reference in-process device runtime.
///
/// Stands in for an accelerator command queue: it allocates opaque buffers
/// and services explicit transfers. Buffers hold their payload in staging
/// memory, so transfers round-trip bit-identically, which is what the tests
/// exercise. A real accelerator runtime (see the `metal` module) plugs in at
/// the same call sites.
#[derive(Debug, Default)]
pub struct DeviceContext {
    allocated: AtomicU64,
}

impl DeviceContext {
    pub fn new() -> Self {
        DeviceContext {
            allocated: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        "staging"
    }

    /// Number of buffers this context has created.
    pub fn buffers_created(&self) -> u64 {
        self.allocated.load(Ordering::Relaxed)
    }

    fn make(&self, bytes: Vec<u8>) -> DeviceBuffer {
        self.allocated.fetch_add(1, Ordering::Relaxed);
        DeviceBuffer { bytes }
    }

    /// Allocate a zero-filled buffer for `len` f32 elements.
    pub fn alloc_f32(&self, len: usize) -> DeviceBuffer {
        self.make(vec![0u8; len * 4])
    }

    /// Copy host floats into a new device buffer.
    pub fn upload_f32(&self, data: &[f32]) -> DeviceBuffer {
        self.make(data.iter().flat_map(|v| v.to_ne_bytes()).collect())
    }

    /// Copy a device buffer back into host floats.
    pub fn download_f32(&self, buf: &DeviceBuffer) -> Vec<f32> {
        buf.bytes
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    /// Copy host i32 values (shape dims) into a new device buffer.
    pub fn upload_i32(&self, data: &[i32]) -> DeviceBuffer {
        self.make(data.iter().flat_map(|v| v.to_ne_bytes()).collect())
    }

    /// Copy a device buffer back into host i32 values.
    pub fn download_i32(&self, buf: &DeviceBuffer) -> Vec<i32> {
        buf.bytes
            .chunks_exact(4)
            .map(|c| i32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }
}
