/// Camera - first-person perspective camera with a derived frustum.
///
/// The camera stores its pose (position, heading, pitch) and projection
/// parameters, and recomputes the view matrix, the projection matrix and
/// the world-space frustum after every mutation. A `Camera` can only be
/// built through `Camera::new`, which performs the first computation, so
/// consumers never observe uninitialized frustum planes.

use glam::{Mat4, Vec3};
use crate::error::{Error, Result};
use super::frustum::Frustum;

/// Distance moved per navigation step
pub const MOVEMENT_DELTA: f32 = 0.035;
/// Heading change (degrees) per navigation step
pub const ROTATION_DELTA_HEADING: f32 = 0.5;
/// Pitch change (degrees) per navigation step
pub const ROTATION_DELTA_PITCH: f32 = 0.5;

/// Initial camera parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// World-space eye position
    pub position: Vec3,
    /// Heading around +Y in degrees. 180 looks down -Z
    pub yaw_degrees: f32,
    /// Pitch in degrees. Positive looks down
    pub pitch_degrees: f32,
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    /// Near clip distance
    pub z_near: f32,
    /// Far clip distance
    pub z_far: f32,
    /// Pitch is clamped to [-limit, +limit]
    pub pitch_limit_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.5, 17.0),
            yaw_degrees: 180.0,
            pitch_degrees: 0.0,
            fov_y_degrees: 60.0,
            z_near: 0.01,
            z_far: 100.0,
            pitch_limit_degrees: 45.0,
        }
    }
}

/// First-person camera.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    yaw_degrees: f32,
    pitch_degrees: f32,
    pitch_limit_degrees: f32,
    fov_y_degrees: f32,
    z_near: f32,
    z_far: f32,
    aspect_ratio: f32,

    // Derived state, refreshed by update()
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    view_matrix: Mat4,
    projection_matrix: Mat4,
    frustum: Frustum,
}

impl Camera {
    /// Create a camera for a viewport of `width` x `height` pixels.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the viewport is empty, `z_near <= 0`,
    /// `z_far <= z_near`, the fov is outside (0, 180) degrees or the
    /// pitch limit is outside [0, 90).
    pub fn new(config: CameraConfig, width: u32, height: u32) -> Result<Self> {
        let aspect_ratio = aspect_ratio(width, height)?;
        validate_fov(config.fov_y_degrees)?;
        validate_clip(config.z_near, config.z_far)?;
        if !(0.0..90.0).contains(&config.pitch_limit_degrees) {
            return Err(Error::InvalidArgument(format!(
                "pitch limit must be in [0, 90) degrees, got {}",
                config.pitch_limit_degrees
            )));
        }

        let placeholder = Frustum::from_view_projection(&Mat4::IDENTITY);
        let mut camera = Self {
            position: config.position,
            yaw_degrees: wrap_degrees(config.yaw_degrees),
            pitch_degrees: config.pitch_degrees
                .clamp(-config.pitch_limit_degrees, config.pitch_limit_degrees),
            pitch_limit_degrees: config.pitch_limit_degrees,
            fov_y_degrees: config.fov_y_degrees,
            z_near: config.z_near,
            z_far: config.z_far,
            aspect_ratio,
            forward: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            frustum: placeholder,
        };
        camera.update();
        Ok(camera)
    }

    // ===== GETTERS =====

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit look direction, including pitch.
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Unit right vector (always horizontal).
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Unit up vector, orthogonal to `forward` and `right`.
    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn yaw_degrees(&self) -> f32 {
        self.yaw_degrees
    }

    pub fn pitch_degrees(&self) -> f32 {
        self.pitch_degrees
    }

    pub fn fov_y_degrees(&self) -> f32 {
        self.fov_y_degrees
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn z_near(&self) -> f32 {
        self.z_near
    }

    pub fn z_far(&self) -> f32 {
        self.z_far
    }

    /// View matrix (world to camera space).
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// OpenGL-convention perspective projection.
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// World-space frustum matching the current pose and projection.
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    // ===== NAVIGATION =====

    /// Turn around +Y ("look around"). Heading wraps into [0, 360).
    pub fn rotate(&mut self, degrees: f32) {
        self.yaw_degrees = wrap_degrees(self.yaw_degrees + degrees);
        self.update();
    }

    /// Tilt up or down, clamped to the pitch limit.
    pub fn change_pitch(&mut self, degrees: f32) {
        self.pitch_degrees = (self.pitch_degrees + degrees)
            .clamp(-self.pitch_limit_degrees, self.pitch_limit_degrees);
        self.update();
    }

    /// Move along the horizontal look direction.
    pub fn move_forward(&mut self, distance: f32) {
        self.position += self.heading() * distance;
        self.update();
    }

    /// Move along world +Y.
    pub fn move_upward(&mut self, distance: f32) {
        self.position += Vec3::Y * distance;
        self.update();
    }

    /// Move sideways along the right vector.
    pub fn strafe(&mut self, distance: f32) {
        self.position += self.right * distance;
        self.update();
    }

    /// Place the camera at `position` without changing its orientation.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update();
    }

    // ===== PROJECTION =====

    /// Adapt the aspect ratio to a new viewport size.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if either dimension is zero. The camera is left
    /// unchanged in that case.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.aspect_ratio = aspect_ratio(width, height)?;
        self.update();
        Ok(())
    }

    /// Change the vertical field of view.
    pub fn set_fov_y(&mut self, degrees: f32) -> Result<()> {
        validate_fov(degrees)?;
        self.fov_y_degrees = degrees;
        self.update();
        Ok(())
    }

    /// Change the clip distances.
    pub fn set_clip_planes(&mut self, z_near: f32, z_far: f32) -> Result<()> {
        validate_clip(z_near, z_far)?;
        self.z_near = z_near;
        self.z_far = z_far;
        self.update();
        Ok(())
    }

    // ===== INTERNAL =====

    /// Horizontal unit direction for the current heading.
    fn heading(&self) -> Vec3 {
        let yaw = self.yaw_degrees.to_radians();
        Vec3::new(yaw.sin(), 0.0, yaw.cos())
    }

    /// Recompute every derived field. Called by all mutators.
    fn update(&mut self) {
        let yaw = self.yaw_degrees.to_radians();
        let pitch = self.pitch_degrees.to_radians();

        self.forward = Vec3::new(
            yaw.sin() * pitch.cos(),
            (-pitch).sin(),
            yaw.cos() * pitch.cos(),
        ).normalize();
        self.right = self.forward.cross(Vec3::Y).normalize();
        self.up = self.right.cross(self.forward);

        self.view_matrix = Mat4::look_to_rh(self.position, self.forward, Vec3::Y);
        self.projection_matrix = Mat4::perspective_rh_gl(
            self.fov_y_degrees.to_radians(),
            self.aspect_ratio,
            self.z_near,
            self.z_far,
        );
        self.frustum = Frustum::from_camera(
            self.position,
            self.forward,
            self.fov_y_degrees.to_radians(),
            self.aspect_ratio,
            self.z_near,
            self.z_far,
        );
    }
}

fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

fn aspect_ratio(width: u32, height: u32) -> Result<f32> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidArgument(format!(
            "viewport must be non-empty, got {}x{}",
            width, height
        )));
    }
    Ok(width as f32 / height as f32)
}

fn validate_fov(degrees: f32) -> Result<()> {
    if degrees > 0.0 && degrees < 180.0 {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "vertical fov must be in (0, 180) degrees, got {}",
            degrees
        )))
    }
}

fn validate_clip(z_near: f32, z_far: f32) -> Result<()> {
    if z_near > 0.0 && z_far > z_near {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "clip planes must satisfy 0 < near < far, got near={} far={}",
            z_near, z_far
        )))
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
