/*!
# Occlusion Culling Engine

Visibility determination for a scene made of many copies of one mesh.

Every frame, each instance's bounding box is placed in world space and
tested against the camera frustum. Depending on the selected technique the
survivors are drawn directly, drawn as bounding boxes only, or first tested
with a hardware occlusion query on their bounding-box proxy.

## Architecture

- **Camera**: first-person camera that owns its view frustum
- **AABB / Frustum**: conservative box-vs-frustum rejection test
- **GraphicsDevice**: trait the core draws and queries through
- **QueryPool**: fixed set of occlusion queries reused every frame
- **RenderTechnique**: Default, AabbOnly and OcclusionCulling loops
- **Scene**: ties mesh, instances, camera and pool together

The public API lives in the [`occlusion`] namespace module.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod camera;
pub mod graphics_device;
pub mod query;
pub mod render;
pub mod scene;

// Main occlusion namespace module
pub mod occlusion {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging hub
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, format_entry};
    }

    // Camera and frustum
    pub mod camera {
        pub use crate::camera::*;
    }

    // Device seam and the recording mock
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Occlusion queries
    pub mod query {
        pub use crate::query::*;
    }

    // Frame settings, statistics and techniques
    pub mod render {
        pub use crate::render::*;
    }

    // Bounding boxes, instances, meshes and the scene
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
