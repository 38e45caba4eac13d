// Metal device runtime (macOS only).
//
// TODO: Implement a real accelerator runtime using objc2/objc2-metal bindings.
// This will include:
// - Metal device/command queue setup
// - MTLBuffer allocation for element and shape buffers
// - Blit-based upload/download servicing backend transfers

/// Placeholder Metal device runtime.
///
/// Will be implemented in a future phase so device storage can live in real
/// GPU memory on Apple Silicon.
#[cfg(feature = "metal")]
#[derive(Debug)]
pub struct MetalDevice {
    // TODO: Add Metal device and command queue fields
}

#[cfg(feature = "metal")]
impl MetalDevice {
    /// Create a new Metal device runtime.
    ///
    /// TODO: Initialize the Metal device and create a command queue.
    pub fn new() -> Option<Self> {
        // TODO: Attempt to create a Metal device and return None if unavailable
        None
    }
}
