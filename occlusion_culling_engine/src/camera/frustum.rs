/// Frustum - six clipping planes for visibility culling.
///
/// Each plane is a unit `normal` pointing into the visible volume and a
/// scalar `offset`, so that a point P is inside the frustum if
/// `dot(P, normal) + offset >= 0` for all six planes.
///
/// `Camera` recomputes its frustum after every mutation with
/// `from_camera()`. `from_view_projection()` extracts the same planes
/// from a combined matrix and is kept as an independent cross-check.

use glam::{Mat3, Mat4, Vec3, Vec4};
use crate::scene::AABB;

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// An oriented plane `dot(p, normal) + offset = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal, pointing into the inside half-space
    pub normal: Vec3,
    /// Signed offset along the normal
    pub offset: f32,
}

impl Plane {
    /// Plane with the given normal passing through `point`.
    pub fn through_point(normal: Vec3, point: Vec3) -> Self {
        Self { normal, offset: -point.dot(normal) }
    }

    /// Signed distance of `point` (positive on the inside).
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        point.dot(self.normal) + self.offset
    }

    fn from_vec4(v: Vec4) -> Self {
        let normal = v.truncate();
        let len = normal.length();
        if len > 0.0 {
            Self { normal: normal / len, offset: v.w / len }
        } else {
            Self { normal, offset: v.w }
        }
    }
}

/// Six frustum planes in world space.
///
/// Order: left, right, bottom, top, near, far (see `PLANE_*`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Build the world-space frustum of a perspective camera.
    ///
    /// # Arguments
    ///
    /// * `position` - Camera position (apex of the side planes)
    /// * `forward` - Unit look direction
    /// * `fov_y` - Vertical field of view in radians
    /// * `aspect_ratio` - Viewport width / height
    /// * `z_near`, `z_far` - Clip distances along `forward`
    ///
    /// The side planes are built in camera space from the near-plane
    /// corners (camera looks down -Z), then rotated into world space
    /// with the `[right, up, -forward]` basis.
    pub fn from_camera(
        position: Vec3,
        forward: Vec3,
        fov_y: f32,
        aspect_ratio: f32,
        z_near: f32,
        z_far: f32,
    ) -> Self {
        let y_offset = z_near * (fov_y * 0.5).tan();
        let x_offset = y_offset * aspect_ratio;
        let z_offset = -z_near;

        let top_left = Vec3::new(-x_offset, y_offset, z_offset);
        let top_right = Vec3::new(x_offset, y_offset, z_offset);
        let bottom_left = Vec3::new(-x_offset, -y_offset, z_offset);
        let bottom_right = Vec3::new(x_offset, -y_offset, z_offset);

        // Winding chosen so every normal points into the volume
        let left = bottom_left.cross(top_left).normalize();
        let right = top_right.cross(bottom_right).normalize();
        let bottom = bottom_right.cross(bottom_left).normalize();
        let top = top_left.cross(top_right).normalize();

        let right_axis = forward.cross(Vec3::Y).normalize();
        let up_axis = (-forward).cross(right_axis);
        let to_world = Mat3::from_cols(right_axis, up_axis, -forward);

        let mut planes = [Plane { normal: Vec3::ZERO, offset: 0.0 }; 6];
        planes[PLANE_LEFT] = Plane::through_point(to_world * left, position);
        planes[PLANE_RIGHT] = Plane::through_point(to_world * right, position);
        planes[PLANE_BOTTOM] = Plane::through_point(to_world * bottom, position);
        planes[PLANE_TOP] = Plane::through_point(to_world * top, position);
        planes[PLANE_NEAR] = Plane::through_point(forward, position + forward * z_near);
        planes[PLANE_FAR] = Plane::through_point(-forward, position + forward * z_far);

        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Uses the Gribb & Hartmann method with OpenGL clip conventions
    /// (depth in [-1, 1], as produced by `Mat4::perspective_rh_gl`).
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d();
        let row = |r: usize| Vec4::new(m[0][r], m[1][r], m[2][r], m[3][r]);
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let mut planes = [Plane { normal: Vec3::ZERO, offset: 0.0 }; 6];
        planes[PLANE_LEFT] = Plane::from_vec4(r3 + r0);
        planes[PLANE_RIGHT] = Plane::from_vec4(r3 - r0);
        planes[PLANE_BOTTOM] = Plane::from_vec4(r3 + r1);
        planes[PLANE_TOP] = Plane::from_vec4(r3 - r1);
        planes[PLANE_NEAR] = Plane::from_vec4(r3 + r2);
        planes[PLANE_FAR] = Plane::from_vec4(r3 - r2);

        Self { planes }
    }

    /// Test if an AABB is (potentially) inside this frustum.
    ///
    /// For each plane, takes the corner furthest along the inward normal
    /// (the positive vertex). If that corner is behind any plane, the
    /// whole box is outside. Boxes straddling a plane are kept, so the
    /// test may report false positives near the frustum edges but never
    /// rejects a visible box.
    ///
    /// Degenerate boxes (min > max or NaN) are always reported outside.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        if aabb.is_degenerate() {
            return false;
        }

        for plane in &self.planes {
            let normal = plane.normal;

            let p_vertex = Vec3::new(
                if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );

            if plane.signed_distance(p_vertex) < 0.0 {
                return false;
            }
        }

        true
    }

    /// Whether `point` is on the inside of all six planes.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.signed_distance(point) >= 0.0)
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
