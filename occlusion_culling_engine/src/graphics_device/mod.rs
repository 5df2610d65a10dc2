/// Graphics device module - the GPU seam and its recording mock

pub mod graphics_device;

// Recording device used by tests and headless runs (no GPU required)
pub mod mock_graphics_device;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

pub use mock_graphics_device::{MockCommand, MockGraphicsDevice, VisibilityOracle};
