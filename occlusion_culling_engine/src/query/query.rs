/// Query - a thin wrapper around one hardware occlusion query.
///
/// `begin`/`end` bracket the proxy draw whose samples the query counts.
/// `is_visible` reads the outcome and blocks until the device has it,
/// while `result_is_ready` only polls. The wrapper holds no state of its
/// own; the handle belongs to the `QueryPool` it came from.

use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, QueryHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Query {
    handle: QueryHandle,
}

impl Query {
    pub(crate) fn new(handle: QueryHandle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> QueryHandle {
        self.handle
    }

    /// Open the sample region
    pub fn begin(&self, device: &mut dyn GraphicsDevice) -> Result<()> {
        device.begin_query(self.handle)
    }

    /// Close the sample region
    pub fn end(&self, device: &mut dyn GraphicsDevice) -> Result<()> {
        device.end_query(self.handle)
    }

    /// Whether any sample of the bracketed draw passed the depth test.
    ///
    /// Blocks until the result is available.
    pub fn is_visible(&self, device: &mut dyn GraphicsDevice) -> Result<bool> {
        device.query_any_samples_passed(self.handle)
    }

    /// Non-blocking availability check
    pub fn result_is_ready(&self, device: &mut dyn GraphicsDevice) -> Result<bool> {
        device.query_result_available(self.handle)
    }
}
