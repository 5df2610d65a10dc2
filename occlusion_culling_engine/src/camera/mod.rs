//! Camera module - first-person camera and its view frustum.
//!
//! The camera owns the frustum and refreshes it after every mutation.
//! Consumers only ever read it.

mod camera;
mod frustum;

pub use camera::{
    Camera, CameraConfig,
    MOVEMENT_DELTA, ROTATION_DELTA_HEADING, ROTATION_DELTA_PITCH,
};
pub use frustum::{
    Frustum, Plane,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
