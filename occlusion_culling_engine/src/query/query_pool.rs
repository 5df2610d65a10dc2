/// QueryPool - fixed set of occlusion queries reused every frame.
///
/// All handles are created up front by `new` and released when the pool
/// is dropped. Within a frame `get_query` hands them out in order, one per
/// call, so every in-flight test owns a distinct handle. `clear` rewinds
/// the cursor for the next frame without touching the device.

use std::sync::{Arc, Mutex};
use crate::error::{Error, Result};
use crate::graphics_device::{GraphicsDevice, QueryHandle};
use crate::{engine_debug, engine_err, engine_error, engine_warn};
use super::query::Query;

const SOURCE: &str = "occlusion::QueryPool";

pub struct QueryPool {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    handles: Vec<QueryHandle>,
    /// Next handle to hand out; equals `handles.len()` once exhausted
    cursor: usize,
}

impl QueryPool {
    /// Allocate `capacity` queries on `device`.
    ///
    /// # Errors
    ///
    /// Propagates the device error (`OutOfMemory` when it runs out of
    /// query objects). Fails with `BackendError` if the device lock is
    /// poisoned.
    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>, capacity: usize) -> Result<Self> {
        let handles = {
            let mut guard = device.lock()
                .map_err(|_| engine_err!(SOURCE, "Device lock poisoned while allocating {} queries", capacity))?;
            guard.create_queries(capacity)?
        };

        if handles.len() != capacity {
            let mut guard = device.lock()
                .map_err(|_| engine_err!(SOURCE, "Device lock poisoned while releasing queries"))?;
            guard.destroy_queries(&handles);
            return Err(Error::InitializationFailed(format!(
                "device returned {} queries, {} requested",
                handles.len(),
                capacity
            )));
        }

        engine_debug!(SOURCE, "Allocated {} occlusion queries", capacity);

        Ok(Self {
            device,
            handles,
            cursor: 0,
        })
    }

    /// Rewind to the first handle. Handles stay allocated.
    pub fn clear(&mut self) {
        self.cursor = 0;
    }

    /// Next unused query of this frame.
    ///
    /// # Errors
    ///
    /// `QueryPoolExhausted` once `capacity()` queries were handed out
    /// since the last `clear()`.
    pub fn get_query(&mut self) -> Result<Query> {
        match self.handles.get(self.cursor) {
            Some(&handle) => {
                self.cursor += 1;
                Ok(Query::new(handle))
            }
            None => {
                let capacity = self.handles.len();
                engine_error!(SOURCE, "All {} queries already issued this frame", capacity);
                Err(Error::QueryPoolExhausted { capacity })
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.handles.len()
    }

    /// Queries handed out since the last `clear()`
    pub fn issued(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.handles.len() - self.cursor
    }
}

impl Drop for QueryPool {
    fn drop(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        // Release even through a poisoned lock
        let mut guard = match self.device.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                engine_warn!(SOURCE, "Device lock poisoned, releasing queries anyway");
                poisoned.into_inner()
            }
        };
        guard.destroy_queries(&self.handles);
        engine_debug!(SOURCE, "Released {} occlusion queries", self.handles.len());
    }
}

impl std::fmt::Debug for QueryPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryPool")
            .field("capacity", &self.handles.len())
            .field("issued", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
#[path = "query_pool_tests.rs"]
mod tests;
